use std::collections::HashMap;
use std::fmt::Write as _;

use super::html::escape_html;

pub const MACRO_LABELS: [&str; 3] = ["Proteins", "Fats", "Carbohydrates"];
pub const MACRO_COLORS: [&str; 3] = ["#2e7d32", "#ff9800", "#1976d2"];

/// Labels, parallel values and colors for one proportional chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
}

impl ChartSpec {
    pub fn macros(proteins: f64, fats: f64, carbohydrates: f64) -> Self {
        Self {
            labels: MACRO_LABELS.iter().map(|s| s.to_string()).collect(),
            values: vec![proteins, fats, carbohydrates],
            colors: MACRO_COLORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn total(&self) -> f64 {
        self.values.iter().filter(|v| **v > 0.0).sum()
    }

    /// Share of the total per category, 0 when nothing is charted.
    pub fn fractions(&self) -> Vec<f64> {
        let total = self.total();
        self.values
            .iter()
            .map(|v| if total > 0.0 && *v > 0.0 { v / total } else { 0.0 })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle(u64);

/// Chart rendering collaborator. A handle must be disposed before its chart
/// is replaced.
pub trait ChartBackend: Send {
    fn create(&mut self, spec: &ChartSpec) -> ChartHandle;
    fn dispose(&mut self, handle: ChartHandle);
    fn markup(&self, handle: ChartHandle) -> Option<String>;
    fn live_charts(&self) -> usize;
}

/// Renders pie charts as inline SVG documents.
#[derive(Debug, Default)]
pub struct SvgChartBackend {
    next_id: u64,
    live: HashMap<ChartHandle, String>,
}

const SIZE: f64 = 220.0;
const RADIUS: f64 = 90.0;

impl SvgChartBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn render_svg(spec: &ChartSpec) -> String {
        let center = SIZE / 2.0;
        let legend_height = 22.0 * spec.labels.len() as f64;
        let mut svg = String::new();

        let _ = write!(
            svg,
            r#"<svg class="chart-small" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" role="img">"#,
            w = SIZE,
            h = SIZE + legend_height
        );

        let fractions = spec.fractions();
        if spec.total() <= 0.0 {
            let _ = write!(
                svg,
                r##"<circle cx="{c}" cy="{c}" r="{r}" fill="#e0e0e0"/><text x="{c}" y="{c}" text-anchor="middle" font-size="12">No data</text>"##,
                c = center,
                r = RADIUS
            );
        } else {
            // Slices start at 12 o'clock and run clockwise.
            let mut angle = -std::f64::consts::FRAC_PI_2;
            for (fraction, color) in fractions.iter().zip(spec.colors.iter()) {
                if *fraction <= 0.0 {
                    continue;
                }
                let color = escape_html(color);
                if *fraction >= 0.9999 {
                    let _ = write!(
                        svg,
                        r##"<circle cx="{c}" cy="{c}" r="{r}" fill="{color}" stroke="#ffffff" stroke-width="2"/>"##,
                        c = center,
                        r = RADIUS
                    );
                    break;
                }
                let sweep = fraction * std::f64::consts::TAU;
                let (x1, y1) = (center + RADIUS * angle.cos(), center + RADIUS * angle.sin());
                let end = angle + sweep;
                let (x2, y2) = (center + RADIUS * end.cos(), center + RADIUS * end.sin());
                let large_arc = if sweep > std::f64::consts::PI { 1 } else { 0 };
                let _ = write!(
                    svg,
                    r##"<path d="M {c:.2} {c:.2} L {x1:.2} {y1:.2} A {r:.2} {r:.2} 0 {large_arc} 1 {x2:.2} {y2:.2} Z" fill="{color}" stroke="#ffffff" stroke-width="2"/>"##,
                    c = center,
                    r = RADIUS,
                );
                angle = end;
            }
        }

        for (i, (label, color)) in spec.labels.iter().zip(spec.colors.iter()).enumerate() {
            let y = SIZE + 6.0 + 22.0 * i as f64;
            let pct = fractions.get(i).copied().unwrap_or(0.0) * 100.0;
            let _ = write!(
                svg,
                r#"<rect x="20" y="{y}" width="14" height="14" fill="{color}"/><text x="42" y="{ty}" font-size="13">{label} ({pct:.1}%)</text>"#,
                y = y,
                ty = y + 12.0,
                color = escape_html(color),
                label = escape_html(label),
            );
        }

        svg.push_str("</svg>");
        svg
    }
}

impl ChartBackend for SvgChartBackend {
    fn create(&mut self, spec: &ChartSpec) -> ChartHandle {
        self.next_id += 1;
        let handle = ChartHandle(self.next_id);
        self.live.insert(handle, Self::render_svg(spec));
        log::debug!("📊 Chart {:?} created ({} live)", handle, self.live.len());
        handle
    }

    fn dispose(&mut self, handle: ChartHandle) {
        if self.live.remove(&handle).is_some() {
            log::debug!("🗑️ Chart {:?} disposed", handle);
        }
    }

    fn markup(&self, handle: ChartHandle) -> Option<String> {
        self.live.get(&handle).cloned()
    }

    fn live_charts(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_spec_fractions() {
        let spec = ChartSpec::macros(10.0, 0.0, 30.0);
        assert_eq!(spec.total(), 40.0);
        assert_eq!(spec.fractions(), vec![0.25, 0.0, 0.75]);
        assert_eq!(spec.colors[2], "#1976d2");
    }

    #[test]
    fn test_svg_backend_create_and_dispose() {
        let mut backend = SvgChartBackend::new();
        let handle = backend.create(&ChartSpec::macros(1.0, 1.0, 2.0));
        assert_eq!(backend.live_charts(), 1);

        let svg = backend.markup(handle).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<path").count(), 3);
        assert!(svg.contains("Carbohydrates (50.0%)"));

        backend.dispose(handle);
        assert_eq!(backend.live_charts(), 0);
        assert!(backend.markup(handle).is_none());
    }

    #[test]
    fn test_svg_single_and_empty_slices() {
        let mut backend = SvgChartBackend::new();
        let full = backend.create(&ChartSpec::macros(0.0, 0.0, 25.0));
        let svg = backend.markup(full).unwrap();
        assert!(svg.contains(r##"fill="#1976d2" stroke"##));
        assert!(!svg.contains("<path"));

        let empty = backend.create(&ChartSpec::macros(0.0, 0.0, 0.0));
        assert!(backend.markup(empty).unwrap().contains("No data"));
    }
}
