pub mod env;
mod loader;

pub use env::{
    AnthropicConfig, AppConfig, DirectoryConfig, ListedDateFallback, NotionConfig, SlackConfig,
    WatermarkBackend, WebContentConfig,
};
pub use loader::load_config;
