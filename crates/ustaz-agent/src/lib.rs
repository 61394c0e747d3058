//! ustaz-agent: clients for the n8n assistant webhooks (text chat and
//! voice reports).

mod chat;
mod error;
mod voice;

pub use chat::{ChatAgent, ChatConfig};
pub use error::{AgentError, AgentResult};
pub use voice::{AgentReply, VoiceAgent};
