use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ApiEndpoint;
use crate::models::auth::{error_detail, AuthResponse, LoginRequest, SignupRequest};
use crate::models::UserSession;
use crate::utils::error::{AssistantError, Result};

pub const LOGIN_FAILED: &str = "Login failed";
pub const SIGNUP_FAILED: &str = "Signup failed";

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<UserSession>;

    async fn signup(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<UserSession>;
}

/// HTTP client for the `/auth/*` endpoints.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    endpoint: ApiEndpoint,
}

impl AuthClient {
    pub fn new(endpoint: ApiEndpoint) -> Self {
        Self {
            client: Client::builder().build().unwrap_or_else(|_| Client::new()),
            endpoint,
        }
    }

    async fn post<B>(&self, url: String, body: &B, fallback: &str) -> Result<UserSession>
    where
        B: Serialize + Sync + ?Sized,
    {
        debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_detail(&text).unwrap_or_else(|| fallback.to_string());
            warn!("Auth backend returned {}: {}", status, message);
            return Err(AssistantError::Rejected(message));
        }

        let parsed: AuthResponse = serde_json::from_str(&text)?;
        Ok(parsed.into())
    }
}

#[async_trait]
impl AuthBackend for AuthClient {
    async fn login(&self, email: &str, password: &str) -> Result<UserSession> {
        let body = LoginRequest { email, password };
        self.post(self.endpoint.login_url(), &body, LOGIN_FAILED).await
    }

    async fn signup(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<UserSession> {
        let body = SignupRequest {
            email,
            password,
            full_name,
        };
        self.post(self.endpoint.signup_url(), &body, SIGNUP_FAILED).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: String) -> AuthClient {
        AuthClient::new(ApiEndpoint {
            base_url: Some(uri),
            ..ApiEndpoint::default()
        })
    }

    #[tokio::test]
    async fn test_login_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(serde_json::json!({"email": "a@b.com", "password": "x"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "T1",
                "user": {"id": 1, "email": "a@b.com"}
            })))
            .mount(&server)
            .await;

        let session = client(server.uri()).login("a@b.com", "x").await.unwrap();
        assert_eq!(session.token, "T1");
        assert_eq!(session.user.id, 1);
        assert!(session.user.full_name.is_none());
    }

    #[tokio::test]
    async fn test_login_detail_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"detail": "Incorrect email or password"})),
            )
            .mount(&server)
            .await;

        let err = client(server.uri()).login("a@b.com", "bad").await.unwrap_err();
        assert_eq!(err.to_string(), "Incorrect email or password");
    }

    #[tokio::test]
    async fn test_signup_fallback_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/signup"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let err = client(server.uri())
            .signup("a@b.com", "x", Some("Ada"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::Rejected(ref m) if m == SIGNUP_FAILED));
    }
}
