use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Typed outcome of classifying one AI reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParsedResult {
    Edible(EdibleInfo),
    NonEdible(NonEdibleInfo),
    Unknown { message: String },
    Unparsed { raw_text: String, reason: UnparsedReason },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdibleInfo {
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbohydrates: f64,
    pub fiber: Option<f64>,
    pub minerals: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NonEdibleInfo {
    pub material: Option<String>,
    pub recyclability: Option<String>,
    pub alternatives: Option<Vec<String>>,
    pub tips: Option<Vec<String>>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnparsedReason {
    NotJson,         // reply was not pure JSON
    UnexpectedShape, // JSON, but no recognised `type`
}

/// Value of the `type` discriminant the system prompt asks the model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Edible,
    NonEdible,
    Unknown,
}

impl ReplyKind {
    /// Exact match only: `"Edible"` or `"non_edible"` are not discriminants.
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "edible" => Some(ReplyKind::Edible),
            "non-edible" => Some(ReplyKind::NonEdible),
            "unknown" => Some(ReplyKind::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReplyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReplyKind::Edible => "edible",
            ReplyKind::NonEdible => "non-edible",
            ReplyKind::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::System => "system",
            Role::User => "user",
        };
        write!(f, "{}", s)
    }
}

/// Provider-neutral chat request. Services translate it to their wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text { text: String },
    File { file: FileRef },
}

/// Stable reference to an uploaded asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    pub path: PathBuf,
    pub digest: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// A user-selected image, either on disk (CLI) or received inline (web form).
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    Path(PathBuf),
    Inline { filename: String, bytes: Vec<u8> },
}

impl Attachment {
    pub fn display_name(&self) -> String {
        match self {
            Attachment::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Attachment::Inline { filename, .. } => filename.clone(),
        }
    }

    /// Lowercased extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            Attachment::Path(path) => path.to_string_lossy().into_owned(),
            Attachment::Inline { filename, .. } => filename.clone(),
        };
        std::path::Path::new(&name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }
}

/// MIME type guessed from a file extension; images default to JPEG.
pub fn mime_for_extension(ext: Option<&str>) -> &'static str {
    match ext {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "image/jpeg",
    }
}
