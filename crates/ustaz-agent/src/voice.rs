//! Voice reports over the n8n voice webhook.
//!
//! A recording goes up as multipart form data (`audio`, `recording.webm`);
//! what comes back depends on the workflow. JSON replies carry `text`,
//! `audio` and `pdf_url` fields, raw audio bodies become an embeddable
//! data URI, and anything else is parsed as JSON on a best-effort basis
//! before falling back to plain text.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AgentError, AgentResult};

/// Upload field name the workflow expects.
const AUDIO_FIELD: &str = "audio";
/// Upload filename; the workflow keys its parsing off the extension.
const AUDIO_FILE_NAME: &str = "recording.webm";
const AUDIO_MIME: &str = "audio/webm";

/// Shown when the workflow answered in a format nothing recognizes.
const UNKNOWN_FORMAT_TEXT: &str = "Ответ получен, но формат неизвестен";

/// What the voice workflow answered with. At least one field is set on a
/// non-empty reply; `pdf_url` takes precedence when consumers render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentReply {
    pub text: String,
    /// Inline audio as a `data:audio/mp3;base64,` URI.
    pub audio: Option<String>,
    /// Remote PDF produced by the workflow.
    pub pdf_url: Option<String>,
}

impl AgentReply {
    /// True when the workflow answered with nothing usable. Callers show
    /// a "try again" prompt instead of an empty report.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.audio.is_none() && self.pdf_url.is_none()
    }

    /// Decoded audio payload, for callers that write the reply to disk.
    /// `None` when there is no audio or the data URI does not decode.
    pub fn audio_bytes(&self) -> Option<Vec<u8>> {
        let uri = self.audio.as_deref()?;
        let encoded = uri.split_once("base64,").map(|(_, rest)| rest)?;
        BASE64.decode(encoded).ok()
    }
}

pub struct VoiceAgent {
    webhook_url: String,
    http: Client,
}

impl VoiceAgent {
    pub fn new(webhook_url: &str) -> Self {
        Self::with_timeout(webhook_url, Duration::from_secs(60))
    }

    /// Workflows that synthesize audio or PDFs can run long; the timeout
    /// covers the whole exchange.
    pub fn with_timeout(webhook_url: &str, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            webhook_url: webhook_url.to_string(),
            http,
        }
    }

    /// Sends one recording and interprets whatever the workflow answers.
    pub async fn send_recording(&self, audio: Vec<u8>) -> AgentResult<AgentReply> {
        if self.webhook_url.is_empty() {
            return Err(AgentError::MissingWebhook);
        }
        if audio.is_empty() {
            return Err(AgentError::EmptyRecording);
        }

        debug!(
            target: "ustaz::voice",
            bytes = audio.len(),
            "uploading recording to the voice webhook"
        );
        let part = Part::bytes(audio)
            .file_name(AUDIO_FILE_NAME)
            .mime_str(AUDIO_MIME)
            .map_err(AgentError::Http)?;
        let form = Form::new().part(AUDIO_FIELD, part);

        let response = self
            .http
            .post(&self.webhook_url)
            .multipart(form)
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

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if content_type.contains("application/json") {
            let body = response.text().await?;
            json_reply(&body)
        } else if content_type.contains("audio") {
            let bytes = response.bytes().await?;
            Ok(AgentReply {
                text: String::new(),
                audio: Some(audio_data_uri(&bytes)),
                pdf_url: None,
            })
        } else {
            let body = response.text().await?;
            warn!(
                target: "ustaz::voice",
                "unexpected content type {content_type:?}, parsing the body as text"
            );
            Ok(opaque_reply(&body))
        }
    }
}

/// Inline data URI for a raw audio body. The workflow answers with mp3.
fn audio_data_uri(bytes: &[u8]) -> String {
    format!("data:audio/mp3;base64,{}", BASE64.encode(bytes))
}

/// Reply out of a declared-JSON body. Empty bodies read as an empty
/// reply rather than an error.
fn json_reply(body: &str) -> AgentResult<AgentReply> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "{}" {
        return Ok(AgentReply::default());
    }
    let value: Value = serde_json::from_str(trimmed).map_err(|_| AgentError::MalformedJson)?;
    reply_from_value(&value)
}

/// Reply out of a body with no usable content type: JSON if it parses,
/// plain text otherwise. An empty body gets the unknown-format wording
/// so the user sees something happened.
fn opaque_reply(body: &str) -> AgentReply {
    let text_reply = || AgentReply {
        text: if body.is_empty() {
            UNKNOWN_FORMAT_TEXT.to_string()
        } else {
            body.to_string()
        },
        ..AgentReply::default()
    };
    match serde_json::from_str::<Value>(body) {
        Ok(value) => reply_from_value(&value).unwrap_or_else(|_| text_reply()),
        Err(_) => text_reply(),
    }
}

/// Normalizes a decoded workflow reply.
///
/// `text` falls back to `response`, `output`, then `message`. A `message`
/// announcing a workflow start means the webhook node responds before the
/// workflow finishes; that is a configuration error, not a reply.
fn reply_from_value(value: &Value) -> AgentResult<AgentReply> {
    if !value.is_object() {
        return Err(AgentError::UnexpectedShape);
    }

    let text_of = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if let Some(message) = text_of("message") {
        if message.contains("Workflow was started") {
            return Err(AgentError::WorkflowMisconfigured);
        }
    }

    let text = text_of("text")
        .or_else(|| text_of("response"))
        .or_else(|| text_of("output"))
        .or_else(|| text_of("message"))
        .unwrap_or_default();

    Ok(AgentReply {
        text,
        audio: text_of("audio"),
        pdf_url: text_of("pdf_url"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_reply_reads_all_three_fields() {
        let reply = json_reply(
            r#"{"text":"Есеп дайын","audio":"data:audio/mp3;base64,QUJD","pdf_url":"https://files.example/report.pdf"}"#,
        )
        .unwrap();
        assert_eq!(reply.text, "Есеп дайын");
        assert_eq!(reply.audio.as_deref(), Some("data:audio/mp3;base64,QUJD"));
        assert_eq!(
            reply.pdf_url.as_deref(),
            Some("https://files.example/report.pdf")
        );
        assert!(!reply.is_empty());
    }

    #[test]
    fn empty_json_bodies_read_as_an_empty_reply() {
        assert!(json_reply("").unwrap().is_empty());
        assert!(json_reply("  {}  ").unwrap().is_empty());
    }

    #[test]
    fn broken_json_under_a_json_content_type_is_an_error() {
        let err = json_reply("{not json").unwrap_err();
        assert!(matches!(err, AgentError::MalformedJson));
    }

    #[test]
    fn text_falls_back_through_response_output_message() {
        let reply = reply_from_value(&json!({ "response": "Жауап" })).unwrap();
        assert_eq!(reply.text, "Жауап");

        let reply = reply_from_value(&json!({ "output": "Нәтиже" })).unwrap();
        assert_eq!(reply.text, "Нәтиже");

        let reply = reply_from_value(&json!({ "message": "Хабарлама" })).unwrap();
        assert_eq!(reply.text, "Хабарлама");
    }

    #[test]
    fn workflow_start_message_is_a_configuration_error() {
        let err = reply_from_value(&json!({
            "message": "Workflow was started"
        }))
        .unwrap_err();
        assert!(matches!(err, AgentError::WorkflowMisconfigured));
    }

    #[test]
    fn non_object_replies_are_rejected() {
        let err = reply_from_value(&json!(["a", "b"])).unwrap_err();
        assert!(matches!(err, AgentError::UnexpectedShape));
    }

    #[test]
    fn raw_audio_becomes_an_mp3_data_uri() {
        let uri = audio_data_uri(b"ABC");
        assert_eq!(uri, "data:audio/mp3;base64,QUJD");
    }

    #[test]
    fn opaque_bodies_try_json_before_plain_text() {
        let reply = opaque_reply(r#"{"text":"Құпия JSON"}"#);
        assert_eq!(reply.text, "Құпия JSON");

        let reply = opaque_reply("жай мәтін");
        assert_eq!(reply.text, "жай мәтін");
        assert!(reply.audio.is_none());

        // A JSON array cannot be shaped into a reply; keep the raw text.
        let reply = opaque_reply(r#"["а","б"]"#);
        assert_eq!(reply.text, r#"["а","б"]"#);

        let reply = opaque_reply("");
        assert_eq!(reply.text, UNKNOWN_FORMAT_TEXT);
    }

    #[test]
    fn audio_bytes_decode_the_data_uri() {
        let reply = AgentReply {
            audio: Some("data:audio/mp3;base64,QUJD".to_string()),
            ..AgentReply::default()
        };
        assert_eq!(reply.audio_bytes().unwrap(), b"ABC");

        assert!(AgentReply::default().audio_bytes().is_none());
        let broken = AgentReply {
            audio: Some("data:audio/mp3;base64,@@".to_string()),
            ..AgentReply::default()
        };
        assert!(broken.audio_bytes().is_none());
    }

    #[tokio::test]
    async fn blank_webhook_and_empty_recordings_fail_locally() {
        let agent = VoiceAgent::new("");
        let err = agent.send_recording(vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, AgentError::MissingWebhook));

        let agent = VoiceAgent::new("http://127.0.0.1:1/webhook/voice-input");
        let err = agent.send_recording(Vec::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::EmptyRecording));
    }

    #[tokio::test]
    async fn unreachable_webhook_surfaces_the_transport_error() {
        let agent = VoiceAgent::with_timeout(
            "http://127.0.0.1:1/webhook/voice-input",
            Duration::from_secs(2),
        );
        let err = agent.send_recording(vec![0u8; 16]).await.unwrap_err();
        assert!(matches!(err, AgentError::Http(_)));
    }
}
