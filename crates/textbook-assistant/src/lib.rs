//! # Textbook Assistant
//!
//! Client-side session controllers for the Physical AI & Humanoid Robotics
//! textbook site: a chat session that proxies questions to the RAG backend,
//! and an auth session that keeps the login state in durable storage.

pub mod config;
pub mod models;
pub mod services;
pub mod storage;
pub mod telemetry;
pub mod utils;

pub use crate::config::Settings;
pub use crate::services::{AuthPhase, AuthSession, ChatSession, SendOutcome};
pub use crate::utils::error::{AssistantError, Result};
