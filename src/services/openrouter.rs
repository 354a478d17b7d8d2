use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine};
use serde::Serialize;
use serde_json::Value;

use super::ChatService;
use crate::models::{mime_for_extension, ChatMessage, ChatRequest, ContentPart, MessageContent};

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: WireContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<WirePart>),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart {
    Text {
        #[serde(rename = "type")]
        content_type: String,
        text: String,
    },
    ImageUrl {
        #[serde(rename = "type")]
        content_type: String,
        image_url: ImageData,
    },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
}

pub struct OpenRouterService {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenRouterService {
    pub fn new(api_key: String, model: String, base_url: String, max_tokens: u32) -> Self {
        Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_tokens,
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Translate the neutral request into OpenRouter's JSON body. Uploaded
    /// files travel inline as base64 data URLs.
    async fn to_wire(&self, request: &ChatRequest) -> Result<WireRequest> {
        let mut messages = Vec::with_capacity(request.messages.len());
        for message in &request.messages {
            messages.push(wire_message(message).await?);
        }

        Ok(WireRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
        })
    }
}

async fn wire_message(message: &ChatMessage) -> Result<WireMessage> {
    let content = match &message.content {
        MessageContent::Text(text) => WireContent::Text(text.clone()),
        MessageContent::Parts(parts) => {
            let mut wire_parts = Vec::with_capacity(parts.len());
            for part in parts {
                wire_parts.push(match part {
                    ContentPart::Text { text } => WirePart::Text {
                        content_type: "text".to_string(),
                        text: text.clone(),
                    },
                    ContentPart::File { file } => {
                        let image_data = tokio::fs::read(&file.path)
                            .await
                            .with_context(|| format!("Failed to read uploaded file {}", file.path.display()))?;
                        let base64_image = general_purpose::STANDARD.encode(&image_data);
                        let ext = file
                            .path
                            .extension()
                            .map(|e| e.to_string_lossy().to_lowercase());
                        let mime_type = mime_for_extension(ext.as_deref());

                        log::debug!(
                            "🖼️ Attaching {} ({} bytes, {})",
                            file.path.display(),
                            image_data.len(),
                            mime_type
                        );

                        WirePart::ImageUrl {
                            content_type: "image_url".to_string(),
                            image_url: ImageData {
                                url: format!("data:{};base64,{}", mime_type, base64_image),
                            },
                        }
                    }
                });
            }
            WireContent::Parts(wire_parts)
        }
    };

    Ok(WireMessage {
        role: message.role.to_string(),
        content,
    })
}

#[async_trait::async_trait]
impl ChatService for OpenRouterService {
    async fn chat(&self, request: &ChatRequest) -> Result<Value> {
        let wire = self.to_wire(request).await?;

        log::info!("🤖 Sending request to OpenRouter with model: {}", self.model);
        log::debug!("📤 Request payload size: {} bytes", serde_json::to_string(&wire)?.len());

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", "https://github.com/ecoreveal")
            .header("X-Title", "EcoReveal")
            .json(&wire)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 OpenRouter response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ OpenRouter API error response: {}", error_text);
            anyhow::bail!("OpenRouter API error ({}): {}", status, error_text);
        }

        let response_text = response.text().await?;
        log::debug!("📄 Raw OpenRouter response size: {} bytes", response_text.len());

        // Providers occasionally answer with a bare string body; keep it as-is.
        let raw = serde_json::from_str(&response_text)
            .unwrap_or_else(|_| Value::String(response_text));

        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::request_builder::build_request;
    use crate::models::FileRef;
    use chrono::Utc;

    fn service() -> OpenRouterService {
        OpenRouterService::new(
            "test_key".to_string(),
            "test_model".to_string(),
            "https://openrouter.ai/api/v1/".to_string(),
            500,
        )
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        assert_eq!(
            service().endpoint(),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_wire_request_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cafe.png");
        std::fs::write(&path, b"png-bytes").unwrap();

        let file = FileRef {
            path,
            digest: "d".to_string(),
            size_bytes: 9,
            uploaded_at: Utc::now(),
        };
        let request = build_request("coffee cup", &[file]);
        let wire = service().to_wire(&request).await.unwrap();
        let json = serde_json::to_value(&wire).unwrap();

        assert_eq!(json["model"], "test_model");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["messages"][0]["role"], "system");
        assert!(json["messages"][0]["content"].is_string());

        let parts = &json["messages"][1]["content"];
        assert_eq!(parts[0]["type"], "image_url");
        let expected_url = format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(b"png-bytes")
        );
        assert_eq!(parts[0]["image_url"]["url"], expected_url.as_str());
        assert_eq!(parts[1]["type"], "text");
        assert_eq!(parts[1]["text"], "coffee cup");
    }

    #[tokio::test]
    async fn test_missing_file_fails_translation() {
        let file = FileRef {
            path: "/definitely/not/here.jpg".into(),
            digest: "d".to_string(),
            size_bytes: 0,
            uploaded_at: Utc::now(),
        };
        let request = build_request("", &[file]);
        assert!(service().to_wire(&request).await.is_err());
    }
}
