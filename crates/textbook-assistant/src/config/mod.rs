pub mod settings;

pub use settings::{ApiEndpoint, ChatConfig, Settings, StorageConfig};
