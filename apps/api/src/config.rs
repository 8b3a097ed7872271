use anyhow::{Context, Result};

const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
const DEFAULT_MODEL: &str = "google/gemini-3-flash-preview";
/// Uploads above this size are rejected before extraction.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub ai_api_key: String,
    pub ai_gateway_url: String,
    pub ai_model: String,
    pub max_document_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            ai_api_key: require_env("AI_GATEWAY_API_KEY")?,
            ai_gateway_url: env_or("AI_GATEWAY_URL", DEFAULT_GATEWAY_URL),
            ai_model: env_or("AI_MODEL", DEFAULT_MODEL),
            max_document_bytes: env_or("MAX_DOCUMENT_BYTES", &DEFAULT_MAX_DOCUMENT_BYTES.to_string())
                .parse::<usize>()
                .context("MAX_DOCUMENT_BYTES must be a positive integer")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Largest request body accepted: the base64 form of a maximum-size
    /// document plus room for the JSON envelope and job description.
    pub fn max_request_bytes(&self) -> usize {
        self.max_document_bytes.div_ceil(3) * 4 + 256 * 1024
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_request_bytes_covers_base64_expansion() {
        let config = Config {
            ai_api_key: "k".to_string(),
            ai_gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            ai_model: DEFAULT_MODEL.to_string(),
            max_document_bytes: 3 * 1024,
            port: 8080,
            rust_log: "info".to_string(),
        };
        assert_eq!(config.max_request_bytes(), 4 * 1024 + 256 * 1024);
    }
}
