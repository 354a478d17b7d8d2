pub mod ai_service;
pub mod openrouter; // OpenRouter AI service
pub mod request_builder;
pub mod upload; // Attachment storage

pub use ai_service::ChatService;
pub use openrouter::OpenRouterService;
pub use upload::{AssetUploader, LocalAssetStore};
