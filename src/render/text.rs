use std::fmt::Write as _;

use super::{format_number, Block, Card, ChartSpec, Panel, PENDING_MESSAGE};

const BAR_WIDTH: usize = 30;

/// Terminal rendering of a panel. Charts become proportional bars.
pub fn format_panel(panel: &Panel) -> String {
    match panel {
        Panel::Empty => String::new(),
        Panel::Pending => PENDING_MESSAGE.to_string(),
        Panel::Notice(message) => message.clone(),
        Panel::Error(message) => format!("❌ Error: {}", message),
        Panel::Result(card) => format_card(card),
    }
}

fn format_card(card: &Card) -> String {
    let mut out = String::new();

    if let Some(title) = &card.title {
        let _ = writeln!(out, "{}", title);
        let _ = writeln!(out, "{}", "─".repeat(title.chars().count().max(8)));
    }

    for block in &card.blocks {
        match block {
            Block::Field { label, value } => {
                let _ = writeln!(out, "{}: {}", label, value);
            }
            Block::List(items) => {
                for (label, value) in items {
                    let _ = writeln!(out, "  • {}: {}", label, value);
                }
            }
            Block::Meta(cells) => {
                for (label, value) in cells {
                    let _ = writeln!(out, "{}\n    {}", label, value);
                }
            }
            Block::Takeaway(text) => {
                let _ = writeln!(out, "\nQuick take: {}", text);
            }
            Block::Note(text) => {
                let _ = writeln!(out, "{}", text);
            }
            Block::Preformatted(text) => {
                for line in text.lines() {
                    let _ = writeln!(out, "    {}", line);
                }
            }
        }
    }

    if let Some((_, spec)) = &card.chart {
        out.push('\n');
        out.push_str(&bars(spec));
    }

    out.trim_end().to_string()
}

fn bars(spec: &ChartSpec) -> String {
    let width = spec.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let mut out = String::new();

    for ((label, value), fraction) in spec
        .labels
        .iter()
        .zip(spec.values.iter())
        .zip(spec.fractions())
    {
        let filled = (fraction * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "{:<width$} {}{} {:>5.1}% ({} g)",
            label,
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)),
            fraction * 100.0,
            format_number(*value),
            width = width
        );
    }
    out
}
