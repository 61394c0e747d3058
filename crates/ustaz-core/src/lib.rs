//! ustaz-core: teacher assistant core library (session, REST client,
//! local stores, document templates, PDF output).
//!
//! Re-exports every subsystem so the agent crate and the CLI share one
//! consistent public API.

mod api;
mod auth;
mod catalog;
mod config;
mod documents;
mod error;
mod messages;
mod pdf;
mod schedule;
mod session;
mod store;
mod templates;

// REST backend (paged listing + auth endpoints)
pub use api::{
    collect_paged, ApiClient, ListResponse, PageData, PageFetch, PageQuery, RegisterRequest,
    TokenPair, PAGE_CEILING, PAGE_SIZE,
};

// Sign-in flows with the demo fallback
pub use auth::{Auth, OFFLINE_TEACHER_NAME};

// Reference data with built-in degradation
pub use catalog::{fallback_classes, fallback_subjects, Catalog, CatalogItem};

// Configuration (file + USTAZ__ environment overrides)
pub use config::{
    UstazConfig, DEFAULT_API_BASE_URL, DEFAULT_CHAT_WEBHOOK_URL, DEFAULT_VOICE_WEBHOOK_URL,
};

// Saved documents and their action trail
pub use documents::{DocumentStore, HistoryAction, HistoryEntry, StoredDocument};

// Error surface, one enum per subsystem
pub use error::{
    ApiError, ApiResult, AuthError, AuthResult, PdfError, PdfResult, ScheduleError,
    ScheduleResult, StorageError, StorageResult,
};

// Parent notices (WhatsApp)
pub use messages::{whatsapp_link, MessageCategory, MessageForm};

// PDF output
pub use pdf::{html_to_lines, render_document, save_document};

// Weekly timetable
pub use schedule::{demo_week, LessonSlot, ScheduleStore, DAYS, PERIODS};

// Session state over the store
pub use session::{Session, UserProfile, DEMO_TOKEN};

// Persistent state (sled) and the in-memory test double
pub use store::{
    MemoryStore, SledStore, StateStore, KEY_ACCESS_TOKEN, KEY_DOCUMENTS, KEY_REFRESH_TOKEN,
    KEY_SCHEDULE, KEY_USER,
};

// Ministry document templates
pub use templates::{
    initial_values, template_by_id, DataSource, DocumentTemplate, FieldKind, TemplateField,
    TemplateValues, TEMPLATES,
};
