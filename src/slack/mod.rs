pub mod client;
pub mod types;
pub mod utils;

pub use client::SlackClient;
pub use utils::extract_urls;
