use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const WELCOME_MESSAGE: &str = "Hi! I'm your AI textbook assistant. Ask me anything about Physical AI and Humanoid Robotics!\nYou can also select text from the book and ask me about it.";

pub const ERROR_FALLBACK_MESSAGE: &str =
    "Sorry, I encountered an error. Please make sure the backend server is running and try again.";

// ===== REQUEST / RESPONSE MODELS =====

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatRequest {
    pub query: String,
    pub top_k: usize,
}

/// Citation attached to an answer by the RAG backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    pub excerpt_num: u32,
    pub week: u32,
    pub section: String,
    pub score: f64, // 0.0 - 1.0
}

impl Source {
    pub fn label(&self) -> String {
        format!("Week {} - {}", self.week, self.section)
    }

    /// Relevance as a whole percentage
    pub fn relevance_percent(&self) -> u32 {
        (self.score.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub has_answer: bool,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub num_sources: usize,
    #[serde(default)]
    pub query_processed: String,
}

// ===== CONVERSATION MODELS =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            sources: None,
            confidence: None,
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn welcome() -> Self {
        Self::assistant(WELCOME_MESSAGE)
    }

    pub fn error_fallback() -> Self {
        Self::assistant(ERROR_FALLBACK_MESSAGE)
    }

    pub fn from_response(response: ChatResponse) -> Self {
        let mut message = Self::assistant(response.answer);
        message.sources = Some(response.sources);
        message.confidence = response.confidence.filter(|c| !c.is_empty());
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserialize() {
        let body = r#"{
            "answer": "ROS 2 uses DDS.",
            "sources": [{"excerpt_num": 1, "week": 3, "section": "Middleware", "score": 0.874}],
            "has_answer": true,
            "confidence": "high",
            "num_sources": 1,
            "query_processed": "what does ros 2 use"
        }"#;

        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.sources.len(), 1);
        assert_eq!(response.sources[0].label(), "Week 3 - Middleware");
        assert_eq!(response.sources[0].relevance_percent(), 87);

        let message = ChatMessage::from_response(response);
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.confidence.as_deref(), Some("high"));
    }

    #[test]
    fn test_response_minimal_body() {
        let response: ChatResponse = serde_json::from_str(r#"{"answer": "ok"}"#).unwrap();
        assert!(response.sources.is_empty());
        assert!(response.confidence.is_none());
    }

    #[test]
    fn test_request_wire_format() {
        let request = ChatRequest {
            query: "What is a URDF?".to_string(),
            top_k: 5,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"query": "What is a URDF?", "top_k": 5}));
    }
}
