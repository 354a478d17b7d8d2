use std::fmt::Write as _;

use super::{Block, Card, ChartBackend, Panel, PENDING_MESSAGE};

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn format_panel(panel: &Panel, charts: &dyn ChartBackend) -> String {
    match panel {
        Panel::Empty => String::new(),
        Panel::Pending => format!(r#"<div class="card"><em>{}</em></div>"#, PENDING_MESSAGE),
        Panel::Notice(message) => format!(
            r#"<div class="card notice">{}</div>"#,
            escape_html(message)
        ),
        Panel::Error(message) => format!(
            r#"<div class="card error"><b>❌ Error:</b> {}</div>"#,
            escape_html(message)
        ),
        Panel::Result(card) => format_card(card, charts),
    }
}

fn format_card(card: &Card, charts: &dyn ChartBackend) -> String {
    let mut out = String::from(r#"<div class="card">"#);

    if let Some(title) = &card.title {
        let _ = write!(out, "<h3>{}</h3>", escape_html(title));
    }

    for block in &card.blocks {
        match block {
            Block::Field { label, value } => {
                let _ = write!(
                    out,
                    "<p><b>{}:</b> {}</p>",
                    escape_html(label),
                    escape_html(value)
                );
            }
            Block::List(items) => {
                out.push_str(r#"<ul class="macros">"#);
                for (label, value) in items {
                    let _ = write!(
                        out,
                        "<li><b>{}:</b> {}</li>",
                        escape_html(label),
                        escape_html(value)
                    );
                }
                out.push_str("</ul>");
            }
            Block::Meta(cells) => {
                out.push_str(r#"<div class="meta-row">"#);
                for (label, value) in cells {
                    let _ = write!(
                        out,
                        r#"<div class="meta-item"><b>{}</b><div>{}</div></div>"#,
                        escape_html(label),
                        escape_html(value)
                    );
                }
                out.push_str("</div>");
            }
            Block::Takeaway(text) => {
                let _ = write!(
                    out,
                    r#"<p class="takeaway"><em>Quick take:</em> {}</p>"#,
                    escape_html(text)
                );
            }
            Block::Note(text) => {
                let _ = write!(out, r#"<p class="note">{}</p>"#, escape_html(text));
            }
            Block::Preformatted(text) => {
                let _ = write!(out, "<pre>{}</pre>", escape_html(text));
            }
        }
    }

    if let Some((handle, _)) = &card.chart {
        if let Some(svg) = charts.markup(*handle) {
            out.push_str(&svg);
        }
    }

    out.push_str("</div>");
    out
}

/// Standalone page wrapping a rendered panel, for `--output report.html`.
pub fn page(body: &str, generated_at: chrono::DateTime<chrono::Utc>) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>EcoReveal report</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 720px; margin: 2rem auto; color: #222; }}
.card {{ border: 1px solid #ddd; border-radius: 10px; padding: 16px; }}
.meta-row {{ display: grid; grid-template-columns: repeat(2, 1fr); gap: 10px; }}
.chart-small {{ max-width: 260px; display: block; margin-top: 12px; }}
footer {{ color: #666; font-size: 12px; margin-top: 12px; }}
</style>
</head>
<body>
{body}
<footer>Generated {generated}</footer>
</body>
</html>
"#,
        body = body,
        generated = generated_at.format("%Y-%m-%d %H:%M UTC")
    )
}
