use thiserror::Error;

pub const INVALID_INPUT_MESSAGE: &str =
    "Please describe a product or attach at least one image to analyze.";

/// Failures of one analysis attempt. All of them are shown to the user as
/// plain text; none is fatal to the session.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    #[error("{}", INVALID_INPUT_MESSAGE)]
    InvalidInput,
    #[error("An analysis is already in progress.")]
    Busy,
    #[error("Image upload failed: {0}")]
    Upload(String),
    #[error("AI request failed: {0}")]
    AiCall(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(AnalysisError::InvalidInput.to_string(), INVALID_INPUT_MESSAGE);
        assert_eq!(
            AnalysisError::Upload("disk full".to_string()).to_string(),
            "Image upload failed: disk full"
        );
    }
}
