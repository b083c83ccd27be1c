pub mod error;
pub mod markdown;

pub use error::{AssistantError, Result};
pub use markdown::{render_markdown, MessageView};
