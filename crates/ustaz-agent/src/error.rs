//! Error types for the n8n agent bridge.

use thiserror::Error;

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Errors from the chat and voice webhooks. The user-facing messages
/// match the ones the workflow operators already know.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("n8n webhook URL не настроен")]
    MissingWebhook,

    #[error("Нет аудио данных для отправки")]
    EmptyRecording,

    #[error("HTTP error! status: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Некорректный JSON ответ от n8n")]
    MalformedJson,

    #[error("Некорректный формат ответа от n8n. Ожидается JSON с полями text, audio или pdf_url.")]
    UnexpectedShape,

    #[error(
        "Webhook настроен неправильно. Измените \"Respond\" в Webhook node на \"Using Respond to Webhook Node\"."
    )]
    WorkflowMisconfigured,

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
