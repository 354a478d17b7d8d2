use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::handlers::{AnalysisHandler, Session};
use crate::models::{Attachment, ParsedResult};

/// Body of `POST /api/analyze`.
#[derive(Debug, Deserialize, Serialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub images: Vec<UploadedImage>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UploadedImage {
    pub filename: String,
    /// Base64 payload, optionally as a full `data:` URL.
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub html: String,
    pub submit_enabled: bool,
    pub result: Option<ParsedResult>,
    pub error: Option<String>,
}

pub fn decode_images(images: &[UploadedImage]) -> Result<Vec<Attachment>, AnalysisError> {
    images
        .iter()
        .map(|image| -> Result<Attachment, AnalysisError> {
            let payload = match image.data.split_once(";base64,") {
                Some((prefix, rest)) if prefix.starts_with("data:") => rest,
                _ => image.data.as_str(),
            };
            let bytes = general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|e| AnalysisError::Upload(format!("{} is not valid base64: {}", image.filename, e)))?;
            Ok(Attachment::Inline {
                filename: image.filename.clone(),
                bytes,
            })
        })
        .collect()
}

/// Apply the form to the session, run the analysis and describe the new view.
pub async fn handle_web_analyze(
    handler: &AnalysisHandler,
    session: &mut Session,
    form: AnalyzeForm,
) -> (Result<(), AnalysisError>, AnalyzeResponse) {
    log::info!(
        "🌐 Analyze request: prompt {} chars, {} image(s)",
        form.prompt.len(),
        form.images.len()
    );

    session.input.set_prompt(form.prompt);

    let outcome = match decode_images(&form.images) {
        Ok(attachments) => {
            session.input.set_attachments(attachments);
            handler.submit(session).await
        }
        Err(e) => {
            log::error!("❌ Rejected uploaded images: {}", e);
            session.input.clear_attachments();
            session.renderer.show_error(e.to_string());
            Err(e)
        }
    };

    let response = AnalyzeResponse {
        html: session.renderer.to_html(),
        submit_enabled: session.input.submit_enabled(),
        result: session.renderer.current_result().cloned(),
        error: outcome.as_ref().err().map(|e| e.to_string()),
    };

    (outcome, response)
}

// Axum integration (optional - requires axum dependency)
#[cfg(feature = "web-server")]
pub mod server {
    use super::*;
    use axum::{
        extract::{DefaultBodyLimit, State},
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use std::path::Path;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceBuilder;
    use tower_http::limit::RequestBodyLimitLayer;
    use tower_http::services::ServeDir;

    /// Base64 makes images about a third larger than on disk.
    pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

    pub struct AppState {
        pub handler: Arc<AnalysisHandler>,
        pub session: Mutex<Session>,
    }

    pub fn create_router(state: Arc<AppState>, static_dir: &Path) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/api/analyze", post(analyze_handler))
            .route("/api/clear", post(clear_handler))
            .fallback_service(ServeDir::new(static_dir))
            .layer(
                ServiceBuilder::new()
                    .layer(DefaultBodyLimit::disable())
                    .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
            )
            .with_state(state)
    }

    pub fn status_for(outcome: &Result<(), AnalysisError>) -> StatusCode {
        match outcome {
            Ok(()) => StatusCode::OK,
            Err(AnalysisError::InvalidInput) => StatusCode::BAD_REQUEST,
            Err(AnalysisError::Busy) => StatusCode::CONFLICT,
            Err(AnalysisError::Upload(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Err(AnalysisError::AiCall(_)) => StatusCode::BAD_GATEWAY,
        }
    }

    async fn analyze_handler(
        State(state): State<Arc<AppState>>,
        Json(form): Json<AnalyzeForm>,
    ) -> (StatusCode, Json<AnalyzeResponse>) {
        // One analysis at a time per session; a second click gets 409.
        let Ok(mut session) = state.session.try_lock() else {
            log::warn!("⚠️ Analyze request while another is in flight");
            let busy = busy_response();
            return (status_for(&Err(AnalysisError::Busy)), Json(busy));
        };

        let (outcome, response) = handle_web_analyze(&state.handler, &mut session, form).await;
        (status_for(&outcome), Json(response))
    }

    /// No panel markup: the page keeps its own view and shows `error` as text.
    pub fn busy_response() -> AnalyzeResponse {
        AnalyzeResponse {
            html: String::new(),
            submit_enabled: false,
            result: None,
            error: Some(AnalysisError::Busy.to_string()),
        }
    }

    async fn clear_handler(State(state): State<Arc<AppState>>) -> Json<AnalyzeResponse> {
        let mut session = state.session.lock().await;
        session.clear();
        Json(AnalyzeResponse {
            html: session.renderer.to_html(),
            submit_enabled: session.input.submit_enabled(),
            result: None,
            error: None,
        })
    }

    async fn health_check() -> &'static str {
        "OK"
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_status_mapping() {
            assert_eq!(status_for(&Ok(())), StatusCode::OK);
            assert_eq!(status_for(&Err(AnalysisError::InvalidInput)), StatusCode::BAD_REQUEST);
            assert_eq!(status_for(&Err(AnalysisError::Busy)), StatusCode::CONFLICT);
            assert_eq!(
                status_for(&Err(AnalysisError::AiCall("x".to_string()))),
                StatusCode::BAD_GATEWAY
            );
        }

        #[test]
        fn test_busy_response_carries_message() {
            let body = serde_json::to_value(busy_response()).unwrap();
            assert_eq!(body["html"], "");
            assert_eq!(body["submit_enabled"], false);
            assert_eq!(body["result"], serde_json::Value::Null);
            assert_eq!(body["error"], "An analysis is already in progress.");
        }
    }
}
