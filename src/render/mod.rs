pub mod chart;
pub mod html;
pub mod text;

pub use chart::{ChartBackend, ChartHandle, ChartSpec, SvgChartBackend};

use crate::models::{EdibleInfo, NonEdibleInfo, ParsedResult, UnparsedReason};

/// Raw replies longer than this are cut before display.
pub const RAW_DISPLAY_LIMIT: usize = 2000;

pub const PENDING_MESSAGE: &str = "Analyzing…";

/// One piece of a result card.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// `label: value` on its own line
    Field { label: String, value: String },
    /// bulleted `label: value` pairs
    List(Vec<(String, String)>),
    /// side-by-side summary cells
    Meta(Vec<(String, String)>),
    Takeaway(String),
    Note(String),
    Preformatted(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: Option<String>,
    pub blocks: Vec<Block>,
    pub chart: Option<(ChartHandle, ChartSpec)>,
}

/// What the results area currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Empty,
    Pending,
    Notice(String),
    Error(String),
    Result(Card),
}

/// Owns the results area: the displayed panel, the current result and the
/// single live chart.
pub struct ResultRenderer {
    charts: Box<dyn ChartBackend>,
    live_chart: Option<ChartHandle>,
    current: Option<ParsedResult>,
    panel: Panel,
}

impl ResultRenderer {
    pub fn new(charts: Box<dyn ChartBackend>) -> Self {
        Self {
            charts,
            live_chart: None,
            current: None,
            panel: Panel::Empty,
        }
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn current_result(&self) -> Option<&ParsedResult> {
        self.current.as_ref()
    }

    pub fn live_charts(&self) -> usize {
        self.charts.live_charts()
    }

    pub fn render(&mut self, result: ParsedResult) {
        let card = match &result {
            ParsedResult::Edible(info) => self.nutrition_card(info),
            ParsedResult::NonEdible(info) => {
                self.replace_chart(None);
                sustainability_card(info)
            }
            ParsedResult::Unknown { message } => {
                self.replace_chart(None);
                Card {
                    title: None,
                    blocks: vec![Block::Field {
                        label: "Not sure".to_string(),
                        value: message.clone(),
                    }],
                    chart: None,
                }
            }
            ParsedResult::Unparsed { raw_text, reason } => {
                self.replace_chart(None);
                unparsed_card(raw_text, *reason)
            }
        };

        self.current = Some(result);
        self.panel = Panel::Result(card);
    }

    pub fn show_pending(&mut self) {
        self.reset();
        self.panel = Panel::Pending;
    }

    pub fn show_notice(&mut self, message: impl Into<String>) {
        self.reset();
        self.panel = Panel::Notice(message.into());
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.reset();
        self.panel = Panel::Error(message.into());
    }

    pub fn clear(&mut self) {
        self.reset();
        self.panel = Panel::Empty;
    }

    fn reset(&mut self) {
        self.replace_chart(None);
        self.current = None;
    }

    /// Dispose the live chart, then create the replacement (if any).
    fn replace_chart(&mut self, spec: Option<&ChartSpec>) -> Option<ChartHandle> {
        if let Some(old) = self.live_chart.take() {
            self.charts.dispose(old);
        }
        self.live_chart = spec.map(|s| self.charts.create(s));
        self.live_chart
    }

    fn nutrition_card(&mut self, info: &EdibleInfo) -> Card {
        let mut items = vec![
            ("Proteins".to_string(), grams(info.proteins)),
            ("Fats".to_string(), grams(info.fats)),
            ("Carbohydrates".to_string(), grams(info.carbohydrates)),
        ];
        if let Some(fiber) = info.fiber {
            items.push(("Fiber".to_string(), grams(fiber)));
        }
        if let Some(minerals) = &info.minerals {
            items.push(("Minerals".to_string(), minerals.join(", ")));
        }

        let spec = ChartSpec::macros(info.proteins, info.fats, info.carbohydrates);
        let chart = self.replace_chart(Some(&spec)).map(|handle| (handle, spec));

        Card {
            title: Some("🍽 Nutritional Information".to_string()),
            blocks: vec![
                Block::Field {
                    label: "Calories".to_string(),
                    value: format!("{} kcal", format_number(info.calories)),
                },
                Block::List(items),
            ],
            chart,
        }
    }

    pub fn to_html(&self) -> String {
        html::format_panel(&self.panel, self.charts.as_ref())
    }

    pub fn to_text(&self) -> String {
        text::format_panel(&self.panel)
    }
}

fn sustainability_card(info: &NonEdibleInfo) -> Card {
    let or = |v: &Option<String>, placeholder: &str| {
        v.clone().unwrap_or_else(|| placeholder.to_string())
    };
    let joined = |v: &Option<Vec<String>>, sep: &str, placeholder: &str| {
        v.as_ref()
            .map(|items| items.join(sep))
            .unwrap_or_else(|| placeholder.to_string())
    };

    Card {
        title: Some("♻ Sustainability Summary".to_string()),
        blocks: vec![
            Block::Meta(vec![
                ("🛠 Material".to_string(), or(&info.material, "Unknown")),
                ("♻ Recyclability".to_string(), or(&info.recyclability, "Unknown")),
                ("🌱 Alternatives".to_string(), joined(&info.alternatives, ", ", "—")),
                ("💡 Tip".to_string(), joined(&info.tips, " • ", "Reuse before recycling")),
            ]),
            Block::Takeaway(or(
                &info.summary,
                "Consider reuse, repair, or switching to a reusable alternative.",
            )),
        ],
        chart: None,
    }
}

fn unparsed_card(raw_text: &str, reason: UnparsedReason) -> Card {
    let shown: String = raw_text.chars().take(RAW_DISPLAY_LIMIT).collect();

    let blocks = match reason {
        UnparsedReason::NotJson => vec![
            Block::Note("Model reply (raw):".to_string()),
            Block::Preformatted(shown),
            Block::Note(
                "Tip: if this keeps happening, re-run or slightly rephrase the prompt. \
                 The app expects JSON from the model."
                    .to_string(),
            ),
        ],
        UnparsedReason::UnexpectedShape => vec![Block::Preformatted(shown)],
    };

    Card {
        title: Some(
            match reason {
                UnparsedReason::NotJson => "AI returned an unexpected format.",
                UnparsedReason::UnexpectedShape => "Unexpected JSON shape:",
            }
            .to_string(),
        ),
        blocks,
        chart: None,
    }
}

fn grams(value: f64) -> String {
    format!("{} g", format_number(value))
}

/// `25.0` prints as `25`, `0.5` stays `0.5`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::classify;
    use std::sync::{Arc, Mutex};

    fn renderer() -> ResultRenderer {
        ResultRenderer::new(Box::new(SvgChartBackend::new()))
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum ChartEvent {
        Create(ChartHandle),
        Dispose(ChartHandle),
    }

    #[derive(Default)]
    struct ChartLog {
        events: Vec<ChartEvent>,
        peak_live: usize,
    }

    /// Wraps the SVG backend and records every create/dispose call.
    struct RecordingCharts {
        inner: SvgChartBackend,
        log: Arc<Mutex<ChartLog>>,
    }

    impl ChartBackend for RecordingCharts {
        fn create(&mut self, spec: &ChartSpec) -> ChartHandle {
            let handle = self.inner.create(spec);
            let mut log = self.log.lock().unwrap();
            log.events.push(ChartEvent::Create(handle));
            log.peak_live = log.peak_live.max(self.inner.live_charts());
            handle
        }

        fn dispose(&mut self, handle: ChartHandle) {
            self.inner.dispose(handle);
            self.log.lock().unwrap().events.push(ChartEvent::Dispose(handle));
        }

        fn markup(&self, handle: ChartHandle) -> Option<String> {
            self.inner.markup(handle)
        }

        fn live_charts(&self) -> usize {
            self.inner.live_charts()
        }
    }

    fn apple() -> ParsedResult {
        classify(r#"{"type":"edible","Calories":95,"Proteins":0.5,"Fats":0.3,"Carbohydrates":25}"#)
    }

    #[test]
    fn test_two_edible_renders_leave_one_chart() {
        let mut r = renderer();
        r.render(apple());
        let first = match r.panel() {
            Panel::Result(card) => card.chart.as_ref().map(|(h, _)| *h).unwrap(),
            other => panic!("unexpected panel {:?}", other),
        };

        r.render(classify(r#"{"type":"edible","calories":200,"protein":10,"fat":5,"carbs":20}"#));
        assert_eq!(r.live_charts(), 1);

        let Panel::Result(card) = r.panel() else {
            panic!("expected result panel");
        };
        let (second, spec) = card.chart.as_ref().unwrap();
        assert_ne!(first, *second);
        assert_eq!(spec.values, vec![10.0, 5.0, 20.0]);
    }

    #[test]
    fn test_old_chart_disposed_before_new_one_created() {
        let log = Arc::new(Mutex::new(ChartLog::default()));
        let mut r = ResultRenderer::new(Box::new(RecordingCharts {
            inner: SvgChartBackend::new(),
            log: log.clone(),
        }));

        r.render(apple());
        r.render(apple());
        r.render(apple());

        let log = log.lock().unwrap();
        assert_eq!(log.peak_live, 1);
        let [
            ChartEvent::Create(first),
            ChartEvent::Dispose(disposed),
            ChartEvent::Create(second),
            ChartEvent::Dispose(disposed_again),
            ChartEvent::Create(_),
        ] = log.events[..]
        else {
            panic!("unexpected chart events {:?}", log.events);
        };
        assert_eq!(disposed, first);
        assert_eq!(disposed_again, second);
    }

    #[test]
    fn test_non_edible_render_disposes_chart() {
        let mut r = renderer();
        r.render(apple());
        assert_eq!(r.live_charts(), 1);

        r.render(classify(r#"{"type":"non-edible","material":"PET plastic"}"#));
        assert_eq!(r.live_charts(), 0);
        assert!(matches!(r.current_result(), Some(ParsedResult::NonEdible(_))));
    }

    #[test]
    fn test_nutrition_card_content() {
        let mut r = renderer();
        r.render(apple());
        let Panel::Result(card) = r.panel() else {
            panic!("expected result panel");
        };
        assert_eq!(card.title.as_deref(), Some("🍽 Nutritional Information"));
        assert_eq!(
            card.blocks[0],
            Block::Field { label: "Calories".to_string(), value: "95 kcal".to_string() }
        );
        let Block::List(items) = &card.blocks[1] else {
            panic!("expected list");
        };
        let labels: Vec<&str> = items.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["Proteins", "Fats", "Carbohydrates"]);
        assert_eq!(items[0].1, "0.5 g");
    }

    #[test]
    fn test_sustainability_placeholders() {
        let card = sustainability_card(&NonEdibleInfo {
            tips: Some(vec!["Refill".to_string(), "Recycle".to_string()]),
            ..Default::default()
        });
        let Block::Meta(cells) = &card.blocks[0] else {
            panic!("expected meta grid");
        };
        assert_eq!(cells[0].1, "Unknown");
        assert_eq!(cells[1].1, "Unknown");
        assert_eq!(cells[2].1, "—");
        assert_eq!(cells[3].1, "Refill • Recycle");
        assert_eq!(
            card.blocks[1],
            Block::Takeaway("Consider reuse, repair, or switching to a reusable alternative.".to_string())
        );
    }

    #[test]
    fn test_unparsed_raw_text_is_capped() {
        let mut r = renderer();
        r.render(classify(&"x".repeat(5000)));
        let Panel::Result(card) = r.panel() else {
            panic!("expected result panel");
        };
        let pre = card
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Preformatted(s) => Some(s),
                _ => None,
            })
            .unwrap();
        assert_eq!(pre.chars().count(), RAW_DISPLAY_LIMIT);
    }

    #[test]
    fn test_clear_drops_result_and_chart() {
        let mut r = renderer();
        r.render(apple());
        r.clear();
        assert_eq!(r.live_charts(), 0);
        assert!(r.current_result().is_none());
        assert_eq!(r.panel(), &Panel::Empty);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(25.0), "25");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.0), "0");
    }
}
