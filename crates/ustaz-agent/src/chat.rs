//! Chat assistant bridge over the n8n chat webhook.
//!
//! Speaks the same wire protocol as the embedded web widget: every
//! message is a `sendMessage` action carrying the session id and the
//! input under configurable keys, and earlier turns can be fetched with
//! `loadPreviousSession`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AgentError, AgentResult};

static CHAT_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Widget options carried over from the web embedding. The wire keys
/// (`chat_input_key`, `chat_session_key`) shape the request payload;
/// the rest is presentation the caller may surface.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub mode: String,
    pub chat_input_key: String,
    pub chat_session_key: String,
    pub load_previous_session: bool,
    pub show_welcome_screen: bool,
    pub default_language: String,
    pub enable_streaming: bool,
    pub initial_messages: Vec<String>,
    pub title: String,
    pub subtitle: String,
    pub input_placeholder: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            mode: "window".to_string(),
            chat_input_key: "chatInput".to_string(),
            chat_session_key: "sessionId".to_string(),
            load_previous_session: true,
            show_welcome_screen: false,
            default_language: "en".to_string(),
            enable_streaming: false,
            initial_messages: vec![
                "Сәлем! 👋".to_string(),
                "Мен Ustaz ai дың вертуалды көмекшісімін".to_string(),
            ],
            title: "Сәлем! 👋".to_string(),
            subtitle: "Сөйлесуді бастаңыз. Біз сізге көмектесу үшін 24/7 осындамыз.".to_string(),
            input_placeholder: "Type your question..".to_string(),
        }
    }
}

pub struct ChatAgent {
    webhook_url: String,
    config: ChatConfig,
    session_id: String,
    http: Client,
}

impl ChatAgent {
    /// Claims the process-wide chat instance. Later calls get `None`,
    /// matching the single widget the web embedding allows.
    pub fn init(webhook_url: &str) -> Option<Self> {
        if CHAT_CLAIMED.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(Self::new(webhook_url))
    }

    pub fn new(webhook_url: &str) -> Self {
        Self::with_session(webhook_url, &Uuid::new_v4().to_string())
    }

    /// Resumes an existing conversation under `session_id`.
    pub fn with_session(webhook_url: &str, session_id: &str) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            webhook_url: webhook_url.to_string(),
            config: ChatConfig::default(),
            session_id: session_id.to_string(),
            http,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Opening lines the assistant shows before the first exchange.
    pub fn greetings(&self) -> &[String] {
        &self.config.initial_messages
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub async fn send(&self, message: &str) -> AgentResult<String> {
        if self.webhook_url.is_empty() {
            return Err(AgentError::MissingWebhook);
        }

        let mut payload = Map::new();
        payload.insert("action".to_string(), Value::from("sendMessage"));
        payload.insert(
            self.config.chat_session_key.clone(),
            Value::from(self.session_id.as_str()),
        );
        payload.insert(self.config.chat_input_key.clone(), Value::from(message));

        debug!(target: "ustaz::chat", session = %self.session_id, "sending chat message");
        let response = self
            .http
            .post(&self.webhook_url)
            .json(&Value::Object(payload))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response.json().await.map_err(|_| AgentError::MalformedJson)?;
        Ok(reply_text(&value))
    }

    /// Earlier turns of this session. Fetch problems and disabled
    /// history both read as an empty transcript.
    pub async fn load_previous_session(&self) -> AgentResult<Vec<String>> {
        if !self.config.load_previous_session || self.webhook_url.is_empty() {
            return Ok(Vec::new());
        }

        let mut payload = Map::new();
        payload.insert("action".to_string(), Value::from("loadPreviousSession"));
        payload.insert(
            self.config.chat_session_key.clone(),
            Value::from(self.session_id.as_str()),
        );

        let response = self
            .http
            .post(&self.webhook_url)
            .json(&Value::Object(payload))
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(Vec::new());
        }
        let value: Value = match response.json().await {
            Ok(value) => value,
            Err(_) => return Ok(Vec::new()),
        };
        Ok(session_texts(&value))
    }
}

/// Assistant text out of a chat webhook reply. n8n agents answer with
/// `output`; older workflows use `text` or `message`.
fn reply_text(value: &Value) -> String {
    if let Some(text) = value.as_str() {
        return text.to_string();
    }
    for key in ["output", "text", "message"] {
        if let Some(text) = value.get(key).and_then(Value::as_str) {
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }
    String::new()
}

/// Message texts out of a `loadPreviousSession` reply (LangChain
/// serialized messages under `data`).
fn session_texts(value: &Value) -> Vec<String> {
    value
        .get("data")
        .and_then(Value::as_array)
        .map(|messages| {
            messages
                .iter()
                .filter_map(|message| {
                    message
                        .pointer("/kwargs/content")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default()
}
