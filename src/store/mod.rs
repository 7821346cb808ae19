pub mod files;
pub mod lock;
pub mod settings;

pub use files::{SnippetFileWriter, SnippetFiles};
pub use lock::SettingsLock;
pub use settings::{JsonFileStore, MemoryStore, SettingsStore};
