use crate::models::{ChatMessage, ChatRequest, ContentPart, FileRef, MessageContent, Role};

pub const DEFAULT_USER_TEXT: &str = "Please analyze the uploaded product.";

pub const SYSTEM_PROMPT: &str = r#"You are EcoReveal. When analyzing a product:

- IF THE ITEM IS EDIBLE: respond with ONLY a valid JSON object (no extra text) with EXACT keys:
  {
    "type": "edible",
    "Calories": <number in kcal>,
    "Proteins": <number in grams>,
    "Fats": <number in grams>,
    "Carbohydrates": <number in grams>,
    "Fiber": <number in grams>,          // optional
    "Minerals": [ "Calcium", "Iron", ... ]  // optional
  }

- IF THE ITEM IS NON-EDIBLE: respond with ONLY a valid JSON object (no extra text) with EXACT keys:
  {
    "type": "non-edible",
    "material": "<short material name>",
    "recyclability": "<short recyclability note>",
    "alternatives": ["Glass", "Stainless steel"], // array
    "tips": ["Tip 1", "Tip 2"],
    "summary": "<one engaging 1-sentence summary>"
  }

- If you are unsure, return:
  { "type": "unknown", "message": "short explanation" }

Do NOT include any additional commentary, headings, or markdown — output must be pure JSON.
"#;

/// System instructions plus one user message: file parts first, then exactly
/// one text part.
pub fn build_request(prompt: &str, files: &[FileRef]) -> ChatRequest {
    let mut parts: Vec<ContentPart> = files
        .iter()
        .map(|file| ContentPart::File { file: file.clone() })
        .collect();

    let text = match prompt.trim() {
        "" => DEFAULT_USER_TEXT.to_string(),
        t => t.to_string(),
    };
    parts.push(ContentPart::Text { text });

    ChatRequest {
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
            },
            ChatMessage {
                role: Role::User,
                content: MessageContent::Parts(parts),
            },
        ],
    }
}
