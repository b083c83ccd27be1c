pub mod auth;
pub mod chat;

pub use auth::{AuthResponse, User, UserSession};
pub use chat::{ChatMessage, ChatRequest, ChatResponse, Role, Source};
