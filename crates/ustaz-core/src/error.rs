//! Error types for the ustaz core crate.

use thiserror::Error;

/// Errors raised while talking to the backend API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Non-2xx response with a user-facing message assembled from the body.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// 401 from any endpoint. The session has already been cleared.
    #[error("Сеанс аяқталды. Қайта кіріңіз.")]
    Unauthorized,

    /// Connection-level failure (DNS, refused, timeout).
    #[error("Бэкенд серверге қол жеткізу мүмкін емес. Бэкендтің іске қосылғанын тексеріңіз.")]
    Connectivity(#[source] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("Unexpected response shape: {0}")]
    Decode(String),

    /// Refresh was requested without a stored refresh token.
    #[error("No refresh token available")]
    MissingRefreshToken,

    /// Token or profile persistence failed mid-flow.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Build the user-facing error for a non-2xx response.
    ///
    /// FastAPI bodies come in several shapes: `detail` as a validation
    /// array (`[{loc, msg}]`), `detail` as a plain string, or a generic
    /// `message` field. Bodies that are not JSON fall back to localized
    /// per-status messages.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => Self::message_from_body(&value)
                .unwrap_or_else(|| value.to_string()),
            Err(_) => Self::fallback_message(status),
        };
        ApiError::Status { status, message }
    }

    fn message_from_body(value: &serde_json::Value) -> Option<String> {
        if let Some(detail) = value.get("detail") {
            if let Some(entries) = detail.as_array() {
                let joined = entries
                    .iter()
                    .map(|entry| {
                        let loc = entry
                            .get("loc")
                            .and_then(|l| l.as_array())
                            .map(|parts| {
                                parts
                                    .iter()
                                    .map(|p| match p.as_str() {
                                        Some(s) => s.to_string(),
                                        None => p.to_string(),
                                    })
                                    .collect::<Vec<_>>()
                                    .join(".")
                            })
                            .unwrap_or_default();
                        let msg = entry.get("msg").and_then(|m| m.as_str()).unwrap_or("");
                        format!("{loc}: {msg}")
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                return Some(joined);
            }
            if let Some(text) = detail.as_str() {
                return Some(text.to_string());
            }
            return Some(detail.to_string());
        }
        value
            .get("message")
            .and_then(|m| m.as_str())
            .map(|m| m.to_string())
    }

    fn fallback_message(status: u16) -> String {
        match status {
            500 => "Бэкенд серверде қате пайда болды (500). Demo режимге ауысамыз.".to_string(),
            404 => "Эндпоинт табылмады (404)".to_string(),
            403 => "Доступ запрещен (403)".to_string(),
            422 => "Деректер дұрыс емес (422). Барлық өрістерді тексеріңіз.".to_string(),
            other => format!("HTTP error! status: {other}"),
        }
    }
}

/// Errors from the local state store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

/// Errors from the timetable store.
#[derive(Error, Debug)]
pub enum ScheduleError {
    /// The target cell is already taken by a different lesson.
    #[error("Бұл уақытта басқа сабақ бар!")]
    Conflict { day: String, period: u8, class: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Errors from document PDF rendering.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("PDF layout produced no content")]
    EmptyDocument,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type PdfResult<T> = Result<T, PdfError>;

/// Errors from the sign-in flow. Only surfaced when the demo fallback
/// is disabled; with the fallback on, failures become a local session.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    SignIn(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type AuthResult<T> = Result<T, AuthError>;
