//! Auth Session Controller
//!
//! Login, signup and logout against the auth API, with the session mirrored
//! into durable storage under [`TOKEN_KEY`] and [`USER_KEY`].
//!
//! States: `Uninitialized` until [`AuthSession::initialize`] runs once, then
//! `Anonymous` or `Authenticated`. Overlapping login/signup calls are not
//! serialized; whichever completes last owns the session.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::{User, UserSession};
use crate::services::auth_client::AuthBackend;
use crate::services::notifier::{Notification, Notifier};
use crate::storage::{SessionStore, TOKEN_KEY, USER_KEY};
use crate::utils::error::Result;

const WELCOME_DISMISS: Duration = Duration::from_millis(2000);
const LOGOUT_DISMISS: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Uninitialized,
    Anonymous,
    Authenticated,
}

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub session: Option<UserSession>,
    pub is_loading: bool,
    pub is_initialized: bool,
    pub error: Option<String>,
    pub is_auth_modal_open: bool,
}

impl AuthState {
    pub fn phase(&self) -> AuthPhase {
        match (self.is_initialized, &self.session) {
            (false, _) => AuthPhase::Uninitialized,
            (true, Some(_)) => AuthPhase::Authenticated,
            (true, None) => AuthPhase::Anonymous,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum AuthAction {
    Login,
    Signup,
}

impl AuthAction {
    fn failure_title(self) -> &'static str {
        match self {
            Self::Login => "Login Failed",
            Self::Signup => "Signup Failed",
        }
    }

    fn success(self, user: &User) -> Notification {
        let notification = match self {
            Self::Login => Notification::success(
                "Welcome Back!",
                format!("Successfully logged in as {}", user.display_name()),
            ),
            Self::Signup => Notification::success(
                "Welcome!",
                "Your account has been created successfully.",
            ),
        };
        notification.dismiss_after(WELCOME_DISMISS)
    }
}

/// Resets `is_loading` when a login/signup ends, however it ends.
struct LoadingGuard {
    state: Arc<Mutex<AuthState>>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.state.lock().is_loading = false;
    }
}

enum StoredSession {
    Restored(UserSession),
    Empty,
    Corrupt,
}

#[derive(Clone)]
pub struct AuthSession {
    state: Arc<Mutex<AuthState>>,
    store: Arc<dyn SessionStore>,
    backend: Arc<dyn AuthBackend>,
    notifier: Arc<dyn Notifier>,
}

impl AuthSession {
    pub fn new(
        store: Arc<dyn SessionStore>,
        backend: Arc<dyn AuthBackend>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(AuthState::default())),
            store,
            backend,
            notifier,
        }
    }

    /// Hydrate from storage. Only the first call has any effect.
    pub fn initialize(&self) -> AuthPhase {
        let mut state = self.state.lock();
        if state.is_initialized {
            return state.phase();
        }

        match self.read_stored_session() {
            StoredSession::Restored(session) => {
                info!("Restored session for user {}", session.user.id);
                state.session = Some(session);
            }
            StoredSession::Empty => {
                debug!("No stored session");
            }
            StoredSession::Corrupt => {
                warn!("Stored user record is unreadable, clearing session");
                state.session = None;
                self.clear_storage();
            }
        }

        state.is_initialized = true;
        state.phase()
    }

    pub fn snapshot(&self) -> AuthState {
        self.state.lock().clone()
    }

    pub fn phase(&self) -> AuthPhase {
        self.state.lock().phase()
    }

    pub fn user(&self) -> Option<User> {
        self.state.lock().session.as_ref().map(|s| s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.state.lock().session.as_ref().map(|s| s.token.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().is_initialized
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn is_auth_modal_open(&self) -> bool {
        self.state.lock().is_auth_modal_open
    }

    pub fn open_auth_modal(&self) {
        self.state.lock().is_auth_modal_open = true;
    }

    pub fn close_auth_modal(&self) {
        let mut state = self.state.lock();
        state.is_auth_modal_open = false;
        state.error = None;
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let _loading = self.begin();
        let result = self.backend.login(email, password).await;
        self.complete(AuthAction::Login, result)
    }

    pub async fn signup(&self, email: &str, password: &str, full_name: Option<&str>) -> Result<()> {
        let _loading = self.begin();
        let result = self.backend.signup(email, password, full_name).await;
        self.complete(AuthAction::Signup, result)
    }

    /// Always succeeds, including when nobody is logged in.
    pub fn logout(&self) {
        self.state.lock().session = None;
        self.clear_storage();

        info!("Logged out");
        self.notifier.notify(
            Notification::success("Logged Out", "See you soon!")
                .dismiss_after(LOGOUT_DISMISS)
                .as_toast(),
        );
    }

    fn begin(&self) -> LoadingGuard {
        {
            let mut state = self.state.lock();
            state.is_loading = true;
            state.error = None;
        }
        LoadingGuard {
            state: Arc::clone(&self.state),
        }
    }

    fn complete(&self, action: AuthAction, result: Result<UserSession>) -> Result<()> {
        match result.and_then(|session| self.persist(&session).map(|()| session)) {
            Ok(session) => {
                info!("{:?} succeeded for user {}", action, session.user.id);
                let notification = action.success(&session.user);
                {
                    let mut state = self.state.lock();
                    state.session = Some(session);
                    state.is_auth_modal_open = false;
                    state.error = None;
                }
                self.notifier.notify(notification);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                warn!("{:?} failed: {}", action, message);
                self.state.lock().error = Some(message.clone());
                self.notifier
                    .notify(Notification::error(action.failure_title(), message));
                Err(e)
            }
        }
    }

    /// Write token and user together; on any failure neither is left behind.
    fn persist(&self, session: &UserSession) -> Result<()> {
        let written = self.write_session(session);
        if written.is_err() {
            self.clear_storage();
        }
        written
    }

    fn write_session(&self, session: &UserSession) -> Result<()> {
        let user_json = serde_json::to_string(&session.user)?;
        self.store.set(TOKEN_KEY, &session.token)?;
        self.store.set(USER_KEY, &user_json)
    }

    fn read_stored_session(&self) -> StoredSession {
        // Empty values count as absent
        let token = self.store.get(TOKEN_KEY).map(|v| v.filter(|t| !t.is_empty()));
        let user = self.store.get(USER_KEY).map(|v| v.filter(|u| !u.is_empty()));

        match (token, user) {
            (Ok(Some(token)), Ok(Some(user_json))) => {
                match serde_json::from_str::<User>(&user_json) {
                    Ok(user) => StoredSession::Restored(UserSession { user, token }),
                    Err(e) => {
                        debug!("Failed to parse stored user: {}", e);
                        StoredSession::Corrupt
                    }
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to read stored session: {}", e);
                StoredSession::Empty
            }
            _ => StoredSession::Empty,
        }
    }

    fn clear_storage(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!("Failed to remove {} from storage: {}", key, e);
            }
        }
    }
}
