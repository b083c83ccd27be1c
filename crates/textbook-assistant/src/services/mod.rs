pub mod auth_client;
pub mod auth_service;
pub mod chat_service;
pub mod notifier;
pub mod rag_client;

pub use auth_client::{AuthBackend, AuthClient};
pub use auth_service::{AuthPhase, AuthSession, AuthState};
pub use chat_service::{ChatSession, ChatSessionState, SendOutcome};
pub use notifier::{ChannelNotifier, Notification, NotificationLevel, Notifier};
pub use rag_client::{ChatBackend, RagClient};
