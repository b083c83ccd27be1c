//! Chat Session Controller
//!
//! Owns the conversation, the draft and the in-flight flag. One HTTP call per
//! user turn; failures become an apology message in the history.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::ChatConfig;
use crate::models::{ChatMessage, ChatRequest};
use crate::services::rag_client::ChatBackend;
use crate::utils::error::{AssistantError, Result};

#[derive(Debug, Clone)]
pub struct ChatSessionState {
    pub messages: Vec<ChatMessage>,
    pub draft: String,
    pub is_waiting: bool,
    pub error: Option<String>,
    pub is_open: bool,
}

impl Default for ChatSessionState {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::welcome()],
            draft: String::new(),
            is_waiting: false,
            error: None,
            is_open: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty input or a request already in flight
    Skipped,
    Answered,
    Failed,
}

/// Clears `is_waiting` however the send ends, including when the future is dropped.
struct PendingGuard {
    state: Arc<Mutex<ChatSessionState>>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.state.lock().is_waiting = false;
    }
}

pub fn scoped_prompt(selected: &str) -> String {
    format!(
        "Based on the following selected text, please answer my question:\n\n\"{}\"\n\nQuestion: What does this text mean? Explain it to me.",
        selected
    )
}

#[derive(Clone)]
pub struct ChatSession {
    state: Arc<Mutex<ChatSessionState>>,
    backend: Arc<dyn ChatBackend>,
    config: ChatConfig,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>, config: ChatConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChatSessionState::default())),
            backend,
            config,
        }
    }

    pub fn snapshot(&self) -> ChatSessionState {
        self.state.lock().clone()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.state.lock().messages.len()
    }

    pub fn is_waiting(&self) -> bool {
        self.state.lock().is_waiting
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn draft(&self) -> String {
        self.state.lock().draft.clone()
    }

    pub fn set_draft(&self, text: impl Into<String>) {
        self.state.lock().draft = text.into();
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().is_open
    }

    pub fn open(&self) {
        self.state.lock().is_open = true;
    }

    pub fn close(&self) {
        self.state.lock().is_open = false;
    }

    pub fn toggle(&self) -> bool {
        let mut state = self.state.lock();
        state.is_open = !state.is_open;
        state.is_open
    }

    pub async fn send_draft(&self) -> SendOutcome {
        let draft = self.state.lock().draft.clone();
        self.send_message(&draft).await
    }

    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let query = text.trim();

        {
            let mut state = self.state.lock();
            if query.is_empty() || state.is_waiting {
                debug!(
                    "Send skipped (empty={}, waiting={})",
                    query.is_empty(),
                    state.is_waiting
                );
                return SendOutcome::Skipped;
            }

            state.messages.push(ChatMessage::user(query));
            state.draft.clear();
            state.is_waiting = true;
            state.error = None;
        }

        let _pending = PendingGuard {
            state: Arc::clone(&self.state),
        };

        let request = ChatRequest {
            query: query.to_string(),
            top_k: self.config.top_k,
        };

        match self.backend.ask(&request).await {
            Ok(response) => {
                info!(
                    "Chat answer received ({} sources, confidence={:?})",
                    response.sources.len(),
                    response.confidence
                );
                self.state
                    .lock()
                    .messages
                    .push(ChatMessage::from_response(response));
                SendOutcome::Answered
            }
            Err(e) => {
                error!("Chat error: {}", e);
                let mut state = self.state.lock();
                state.error = Some(e.to_string());
                state.messages.push(ChatMessage::error_fallback());
                SendOutcome::Failed
            }
        }
    }

    /// Validate a text selection and queue a scoped question about it.
    ///
    /// The send runs on a spawned task after `selection_send_delay_ms`, and
    /// reads whatever the draft holds at that point. Must be called from
    /// within a tokio runtime.
    pub fn ask_about_selection(&self, selected: &str) -> Result<JoinHandle<SendOutcome>> {
        {
            let mut state = self.state.lock();
            state.error = None;

            if let Err(e) = self.validate_selection(selected) {
                warn!("Selection rejected: {}", e);
                state.error = Some(e.to_string());
                return Err(e);
            }

            state.is_open = true;
            state.draft = scoped_prompt(selected);
        }

        let session = self.clone();
        let delay = self.config.selection_send_delay();
        Ok(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            session.send_draft().await
        }))
    }

    fn validate_selection(&self, selected: &str) -> Result<()> {
        let len = selected.chars().count();
        if len < self.config.min_selection_chars {
            return Err(AssistantError::SelectionTooShort {
                min: self.config.min_selection_chars,
            });
        }
        if len > self.config.max_selection_chars {
            return Err(AssistantError::SelectionTooLong {
                max: self.config.max_selection_chars,
            });
        }
        Ok(())
    }
}
