//! Runtime configuration.
//!
//! Precedence: env `USTAZ_CONFIG` path > `config/ustaz.toml` > defaults,
//! with `USTAZ__*` environment variables overriding file values.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Production backend base, including the API prefix.
pub const DEFAULT_API_BASE_URL: &str = "https://backof.onrender.com/api/v1";
/// n8n chat-widget webhook.
pub const DEFAULT_CHAT_WEBHOOK_URL: &str =
    "https://nurik02.app.n8n.cloud/webhook/755b1cf7-ecca-4fc1-988f-decab37f24c2/chat";
/// n8n voice-agent webhook.
pub const DEFAULT_VOICE_WEBHOOK_URL: &str = "https://nurik02.app.n8n.cloud/webhook/voice-input";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UstazConfig {
    pub api_base_url: String,
    /// Directory for the sled-backed local state.
    pub data_dir: String,
    /// When sign-in fails, fall back to a local demo session instead of
    /// surfacing the error.
    #[serde(default = "default_true")]
    pub demo_fallback: bool,
    pub chat_webhook_url: String,
    pub voice_webhook_url: String,
    pub request_timeout_secs: u64,
    /// Upper bound on a single voice recording, seconds.
    pub max_recording_secs: u64,
}

fn default_true() -> bool {
    true
}

impl Default for UstazConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            data_dir: "./ustaz-data".to_string(),
            demo_fallback: true,
            chat_webhook_url: DEFAULT_CHAT_WEBHOOK_URL.to_string(),
            voice_webhook_url: DEFAULT_VOICE_WEBHOOK_URL.to_string(),
            request_timeout_secs: 15,
            max_recording_secs: 30,
        }
    }
}

impl UstazConfig {
    /// Load config from file and environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("USTAZ_CONFIG").unwrap_or_else(|_| "config/ustaz.toml".to_string());
        let builder = config::Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("data_dir", "./ustaz-data")?
            .set_default("demo_fallback", true)?
            .set_default("chat_webhook_url", DEFAULT_CHAT_WEBHOOK_URL)?
            .set_default("voice_webhook_url", DEFAULT_VOICE_WEBHOOK_URL)?
            .set_default("request_timeout_secs", 15_i64)?
            .set_default("max_recording_secs", 30_i64)?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("USTAZ").separator("__"))
            .build()?;

        built.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_production() {
        let cfg = UstazConfig::default();
        assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
        assert!(cfg.demo_fallback, "demo fallback is on by default");
        assert_eq!(cfg.request_timeout_secs, 15);
        assert_eq!(cfg.max_recording_secs, 30);
    }
}
