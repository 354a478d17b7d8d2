use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout:free";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_UPLOAD_DIR: &str = "data/uploads";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub openrouter_api_key: String,
    pub openrouter_model: String,
    pub openrouter_base_url: String,
    pub max_tokens: u32,
    pub upload_dir: PathBuf,
    pub bind_addr: String,
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Read configuration from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let openrouter_api_key = get("OPENROUTER_API_KEY")
            .context("OPENROUTER_API_KEY must be set in the environment or .env file")?;

        let max_tokens = match get("ECOREVEAL_MAX_TOKENS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("ECOREVEAL_MAX_TOKENS must be a positive integer, got '{}'", raw))?,
            None => DEFAULT_MAX_TOKENS,
        };

        Ok(Self {
            openrouter_api_key,
            openrouter_model: get("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openrouter_base_url: get("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            max_tokens,
            upload_dir: get("ECOREVEAL_UPLOAD_DIR")
                .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string())
                .into(),
            bind_addr: get("ECOREVEAL_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            static_dir: get("ECOREVEAL_STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())
                .into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("OPENROUTER_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.openrouter_api_key, "sk-test");
        assert_eq!(config.openrouter_model, DEFAULT_MODEL);
        assert_eq!(config.openrouter_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.upload_dir, PathBuf::from(DEFAULT_UPLOAD_DIR));
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_missing_api_key_is_error() {
        assert!(AppConfig::from_lookup(lookup(&[])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[("OPENROUTER_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_overrides_and_bad_max_tokens() {
        let config = AppConfig::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "k"),
            ("OPENROUTER_MODEL", "openai/gpt-4o-mini"),
            ("ECOREVEAL_MAX_TOKENS", "800"),
        ]))
        .unwrap();
        assert_eq!(config.openrouter_model, "openai/gpt-4o-mini");
        assert_eq!(config.max_tokens, 800);

        let bad = AppConfig::from_lookup(lookup(&[
            ("OPENROUTER_API_KEY", "k"),
            ("ECOREVEAL_MAX_TOKENS", "lots"),
        ]));
        assert!(bad.is_err());
    }
}
