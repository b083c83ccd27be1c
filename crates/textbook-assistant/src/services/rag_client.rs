use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::ApiEndpoint;
use crate::models::{ChatRequest, ChatResponse};
use crate::utils::error::{AssistantError, Result};

/// Anything that can answer a chat turn.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn ask(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// HTTP client for the RAG backend's `/api/chat/` endpoint.
#[derive(Clone)]
pub struct RagClient {
    client: Client,
    endpoint: ApiEndpoint,
}

impl RagClient {
    pub fn new(endpoint: ApiEndpoint) -> Self {
        Self {
            client: Client::builder().build().unwrap_or_else(|_| Client::new()),
            endpoint,
        }
    }
}

#[async_trait]
impl ChatBackend for RagClient {
    async fn ask(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.endpoint.chat_url();
        debug!("POST {} ({} chars, top_k={})", url, request.query.len(), request.top_k);

        let response = self.client.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Chat backend returned {}", status);
            return Err(AssistantError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)?;

        debug!(
            "Chat answer: {} chars, {} sources, has_answer={}",
            parsed.answer.len(),
            parsed.num_sources,
            parsed.has_answer
        );
        Ok(parsed)
    }
}
