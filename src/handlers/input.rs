use base64::{engine::general_purpose, Engine};
use tokio::task::JoinSet;

use crate::error::AnalysisError;
use crate::models::{mime_for_extension, Attachment};

/// Prompt text, attachments and the in-flight flag of one UI instance.
#[derive(Debug, Default)]
pub struct InputCollector {
    prompt: String,
    attachments: Vec<Attachment>,
    in_flight: bool,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Replaces the current selection, like picking files again.
    pub fn set_attachments(&mut self, attachments: Vec<Attachment>) {
        self.attachments = attachments;
    }

    pub fn clear_attachments(&mut self) {
        self.attachments.clear();
    }

    pub fn has_content(&self) -> bool {
        !self.prompt.trim().is_empty() || !self.attachments.is_empty()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Whether the analyze action is currently available.
    pub fn submit_enabled(&self) -> bool {
        !self.in_flight && self.has_content()
    }

    pub fn begin_request(&mut self) -> Result<(), AnalysisError> {
        if self.in_flight {
            return Err(AnalysisError::Busy);
        }
        if !self.has_content() {
            return Err(AnalysisError::InvalidInput);
        }
        self.in_flight = true;
        Ok(())
    }

    pub fn finish_request(&mut self) {
        self.in_flight = false;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub name: String,
    pub size_bytes: usize,
    pub data_url: String,
}

/// Load thumbnails for the attachments concurrently. Completion order is not
/// preserved and an unreadable file is skipped.
pub async fn load_previews(attachments: &[Attachment]) -> Vec<Preview> {
    let mut tasks = JoinSet::new();

    for attachment in attachments.iter().cloned() {
        tasks.spawn(async move {
            let name = attachment.display_name();
            let bytes = match &attachment {
                Attachment::Path(path) => tokio::fs::read(path).await?,
                Attachment::Inline { bytes, .. } => bytes.clone(),
            };
            let mime = mime_for_extension(attachment.extension().as_deref());
            Ok::<_, std::io::Error>(Preview {
                name,
                size_bytes: bytes.len(),
                data_url: format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(&bytes)),
            })
        });
    }

    let mut previews = Vec::with_capacity(attachments.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(preview)) => previews.push(preview),
            Ok(Err(e)) => log::warn!("⚠️ Could not load preview: {}", e),
            Err(e) => log::warn!("⚠️ Preview task failed: {}", e),
        }
    }
    previews
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_submit_enabled_tracks_input() {
        let mut input = InputCollector::new();
        assert!(!input.submit_enabled());

        input.set_prompt("   ");
        assert!(!input.submit_enabled());

        input.set_prompt("glass jar");
        assert!(input.submit_enabled());

        input.set_prompt("");
        input.set_attachments(vec![Attachment::Path(PathBuf::from("a.jpg"))]);
        assert!(input.submit_enabled());

        input.clear_attachments();
        assert!(!input.submit_enabled());
    }

    #[test]
    fn test_in_flight_blocks_second_request() {
        let mut input = InputCollector::new();
        input.set_prompt("banana");

        assert_eq!(input.begin_request(), Ok(()));
        assert!(!input.submit_enabled());
        assert_eq!(input.begin_request(), Err(AnalysisError::Busy));

        input.finish_request();
        assert!(input.submit_enabled());
    }

    #[test]
    fn test_begin_request_rejects_empty_input() {
        let mut input = InputCollector::new();
        assert_eq!(input.begin_request(), Err(AnalysisError::InvalidInput));
        assert!(!input.in_flight());
    }

    #[tokio::test]
    async fn test_load_previews_skips_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("leaf.png");
        std::fs::write(&good, b"img").unwrap();

        let previews = load_previews(&[
            Attachment::Path(good),
            Attachment::Path(dir.path().join("missing.png")),
            Attachment::Inline { filename: "cup.webp".to_string(), bytes: vec![1, 2] },
        ])
        .await;

        assert_eq!(previews.len(), 2);
        let leaf = previews.iter().find(|p| p.name == "leaf.png").unwrap();
        assert_eq!(leaf.size_bytes, 3);
        assert!(leaf.data_url.starts_with("data:image/png;base64,"));
        assert!(previews.iter().any(|p| p.data_url.starts_with("data:image/webp;base64,")));
    }
}
