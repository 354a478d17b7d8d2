pub mod analysis_handler;
pub mod input;

pub use analysis_handler::{AnalysisHandler, Session};
pub use input::{load_previews, InputCollector, Preview};
