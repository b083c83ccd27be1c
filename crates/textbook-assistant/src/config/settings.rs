use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::error::Result;

pub const DEFAULT_LOCAL_URL: &str = "http://localhost:8000";
pub const DEFAULT_REMOTE_URL: &str = "https://YOUR_BACKEND_URL.hf.space";

/// Checked in order on every resolution; the first one that is set wins.
pub const API_URL_ENV_VARS: [&str; 2] = ["TEXTBOOK_API_URL", "RAG_API_URL"];

const CHAT_PATH: &str = "/api/chat/";
const LOGIN_PATH: &str = "/auth/login";
const SIGNUP_PATH: &str = "/auth/signup";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    pub api: ApiEndpoint,
    pub chat: ChatConfig,
    pub storage: StorageConfig,
}

/// Where the backend lives. Resolved per call, never cached.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiEndpoint {
    #[serde(default)]
    pub base_url: Option<String>,
    /// Host the site is being served from (`localhost` during development).
    #[serde(default)]
    pub page_host: Option<String>,
    pub local_url: String,
    pub remote_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatConfig {
    pub top_k: usize,
    pub min_selection_chars: usize,
    pub max_selection_chars: usize,
    pub selection_send_delay_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    pub path: String,
}

impl Default for ApiEndpoint {
    fn default() -> Self {
        Self {
            base_url: None,
            page_host: None,
            local_url: DEFAULT_LOCAL_URL.to_string(),
            remote_url: DEFAULT_REMOTE_URL.to_string(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_selection_chars: 3,
            max_selection_chars: 500,
            selection_send_delay_ms: 300,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: ".textbook-assistant/session.json".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .set_default("api.local_url", DEFAULT_LOCAL_URL)?
            .set_default("api.remote_url", DEFAULT_REMOTE_URL)?
            .set_default("chat.top_k", 5)?
            .set_default("chat.min_selection_chars", 3)?
            .set_default("chat.max_selection_chars", 500)?
            .set_default("chat.selection_send_delay_ms", 300)?
            .set_default("storage.path", ".textbook-assistant/session.json")?
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.path)
    }
}

impl ApiEndpoint {
    /// Base URL for the next request, reading the process environment now.
    pub fn resolve(&self) -> String {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    pub fn resolve_with<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        // First *defined* variable wins, even if empty; an empty value then
        // falls through to the configured sources.
        let from_env = API_URL_ENV_VARS.iter().find_map(|name| lookup(name));

        let base = from_env
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.base_url.clone().filter(|url| !url.trim().is_empty()))
            .unwrap_or_else(|| {
                if self.page_host.as_deref() == Some("localhost") {
                    self.local_url.clone()
                } else {
                    self.remote_url.clone()
                }
            });

        base.trim().trim_end_matches('/').to_string()
    }

    pub fn chat_url(&self) -> String {
        self.url_with(CHAT_PATH, |name| std::env::var(name).ok())
    }

    pub fn login_url(&self) -> String {
        self.url_with(LOGIN_PATH, |name| std::env::var(name).ok())
    }

    pub fn signup_url(&self) -> String {
        self.url_with(SIGNUP_PATH, |name| std::env::var(name).ok())
    }

    fn url_with<F>(&self, path: &str, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        format!("{}{}", self.resolve_with(lookup), path)
    }
}

impl ChatConfig {
    pub fn selection_send_delay(&self) -> Duration {
        Duration::from_millis(self.selection_send_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_remote_placeholder_by_default() {
        let api = ApiEndpoint::default();
        assert_eq!(api.resolve_with(no_env), DEFAULT_REMOTE_URL);
    }

    #[test]
    fn test_localhost_page_uses_local_backend() {
        let api = ApiEndpoint {
            page_host: Some("localhost".to_string()),
            ..ApiEndpoint::default()
        };
        assert_eq!(api.resolve_with(no_env), "http://localhost:8000");

        let api = ApiEndpoint {
            page_host: Some("docs.example.org".to_string()),
            ..ApiEndpoint::default()
        };
        assert_eq!(api.resolve_with(no_env), DEFAULT_REMOTE_URL);
    }

    #[test]
    fn test_configured_override_beats_host() {
        let api = ApiEndpoint {
            base_url: Some("https://rag.example.org/".to_string()),
            page_host: Some("localhost".to_string()),
            ..ApiEndpoint::default()
        };
        assert_eq!(api.resolve_with(no_env), "https://rag.example.org");
    }

    #[test]
    fn test_env_override_priority() {
        let api = ApiEndpoint {
            base_url: Some("https://configured.example.org".to_string()),
            ..ApiEndpoint::default()
        };

        let both = |name: &str| match name {
            "TEXTBOOK_API_URL" => Some("https://primary.example.org".to_string()),
            "RAG_API_URL" => Some("https://secondary.example.org".to_string()),
            _ => None,
        };
        assert_eq!(api.resolve_with(both), "https://primary.example.org");

        let secondary = |name: &str| {
            (name == "RAG_API_URL").then(|| "https://secondary.example.org".to_string())
        };
        assert_eq!(api.resolve_with(secondary), "https://secondary.example.org");
    }

    #[test]
    fn test_empty_env_falls_through() {
        let api = ApiEndpoint {
            page_host: Some("localhost".to_string()),
            ..ApiEndpoint::default()
        };
        // An empty primary shadows the secondary, then falls through
        let lookup = |name: &str| match name {
            "TEXTBOOK_API_URL" => Some(String::new()),
            "RAG_API_URL" => Some("https://secondary.example.org".to_string()),
            _ => None,
        };
        assert_eq!(api.resolve_with(lookup), "http://localhost:8000");
    }

    #[test]
    fn test_endpoint_paths() {
        let api = ApiEndpoint {
            base_url: Some("http://127.0.0.1:9000".to_string()),
            ..ApiEndpoint::default()
        };
        assert_eq!(api.url_with(CHAT_PATH, no_env), "http://127.0.0.1:9000/api/chat/");
        assert_eq!(api.url_with(LOGIN_PATH, no_env), "http://127.0.0.1:9000/auth/login");
        assert_eq!(api.url_with(SIGNUP_PATH, no_env), "http://127.0.0.1:9000/auth/signup");
    }

    #[test]
    fn test_chat_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.chat.top_k, 5);
        assert_eq!(settings.chat.min_selection_chars, 3);
        assert_eq!(settings.chat.max_selection_chars, 500);
        assert_eq!(settings.chat.selection_send_delay(), Duration::from_millis(300));
    }
}
