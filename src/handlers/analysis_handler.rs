use std::sync::Arc;

use crate::error::AnalysisError;
use crate::handlers::InputCollector;
use crate::models::{Attachment, ParsedResult};
use crate::normalizer::normalize;
use crate::render::{ChartBackend, Panel, ResultRenderer};
use crate::services::request_builder::build_request;
use crate::services::{AssetUploader, ChatService};

/// State of one UI instance: what the user entered and what is displayed.
pub struct Session {
    pub input: InputCollector,
    pub renderer: ResultRenderer,
}

impl Session {
    pub fn new(charts: Box<dyn ChartBackend>) -> Self {
        Self {
            input: InputCollector::new(),
            renderer: ResultRenderer::new(charts),
        }
    }

    /// Drop the selected images and whatever is displayed. The prompt stays.
    pub fn clear(&mut self) {
        self.input.clear_attachments();
        self.renderer.clear();
    }
}

pub struct AnalysisHandler {
    uploader: Arc<dyn AssetUploader>,
    ai: Arc<dyn ChatService>,
}

impl AnalysisHandler {
    pub fn new(uploader: Arc<dyn AssetUploader>, ai: Arc<dyn ChatService>) -> Self {
        Self { uploader, ai }
    }

    /// Run one analysis for the session and render its outcome.
    ///
    /// The session is marked in flight for the duration of the call; afterwards
    /// the submit state is recomputed from the current input. Dropping the
    /// returned future early (a disconnected client) also ends the request.
    pub async fn submit(&self, session: &mut Session) -> Result<(), AnalysisError> {
        if let Err(e) = session.input.begin_request() {
            match e {
                AnalysisError::InvalidInput => {
                    log::info!("✋ Nothing to analyze, skipping AI call");
                    session.renderer.show_notice(e.to_string());
                }
                _ => log::warn!("⚠️ Submit rejected: {}", e),
            }
            return Err(e);
        }

        let mut flight = InFlight::new(&mut *session);
        flight.session.renderer.show_pending();

        let outcome = self
            .analyze(flight.session.input.prompt(), flight.session.input.attachments())
            .await;

        let result = match outcome {
            Ok(parsed) => {
                log::info!("✅ Analysis finished: {}", describe(&parsed));
                flight.session.renderer.render(parsed);
                Ok(())
            }
            Err(e) => {
                log::error!("❌ Analysis failed: {}", e);
                flight.session.renderer.show_error(e.to_string());
                Err(e)
            }
        };
        drop(flight);

        log::debug!(
            "🔁 Submit enabled: {}, live charts: {}",
            session.input.submit_enabled(),
            session.renderer.live_charts()
        );

        result
    }

    async fn analyze(
        &self,
        prompt: &str,
        attachments: &[Attachment],
    ) -> Result<ParsedResult, AnalysisError> {
        let files = if attachments.is_empty() {
            Vec::new()
        } else {
            log::info!("📤 Uploading {} attachment(s)", attachments.len());
            self.uploader
                .upload(attachments)
                .await
                .map_err(|e| AnalysisError::Upload(format!("{:#}", e)))?
        };

        let request = build_request(prompt, &files);

        let raw = self
            .ai
            .chat(&request)
            .await
            .map_err(|e| AnalysisError::AiCall(format!("{:#}", e)))?;

        Ok(normalize(&raw))
    }
}

pub const INTERRUPTED_MESSAGE: &str = "The analysis was interrupted. Please try again.";

/// Ends the session's request when dropped, whether `submit` ran to
/// completion or its future was abandoned at an await point.
struct InFlight<'a> {
    session: &'a mut Session,
}

impl<'a> InFlight<'a> {
    fn new(session: &'a mut Session) -> Self {
        Self { session }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.session.input.in_flight() {
            return;
        }
        self.session.input.finish_request();
        if matches!(self.session.renderer.panel(), Panel::Pending) {
            log::warn!("⚠️ Analysis abandoned before it finished");
            self.session.renderer.show_error(INTERRUPTED_MESSAGE);
        }
    }
}

fn describe(result: &ParsedResult) -> &'static str {
    match result {
        ParsedResult::Edible(_) => "edible",
        ParsedResult::NonEdible(_) => "non-edible",
        ParsedResult::Unknown { .. } => "unknown",
        ParsedResult::Unparsed { .. } => "unparsed",
    }
}
