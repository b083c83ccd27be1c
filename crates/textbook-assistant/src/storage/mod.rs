//! Durable key/value storage for the auth session.
//!
//! Mirrors browser local storage: synchronous, string keys and values, no
//! transactions. Callers that need two keys to move together do it themselves.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::utils::error::Result;

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "auth_user";

#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
