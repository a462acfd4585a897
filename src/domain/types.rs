use std::fmt;

use serde::{Deserialize, Serialize};

/// Best-effort readable content of a fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub title: Option<String>,
    pub text: String,
    /// Absolute http(s) links found anywhere in the raw document.
    pub links: Vec<String>,
}

/// Everything the extraction model gets to see for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionInput {
    pub url: String,
    pub page_title: Option<String>,
    pub page_text: String,
    /// Text of the social post a job link was found in, if any.
    pub post_context: Option<String>,
    /// The chat message that carried the URL.
    pub message_text: String,
}

impl ExtractionInput {
    pub fn has_content(&self) -> bool {
        !self.page_text.trim().is_empty()
            || self
                .post_context
                .as_deref()
                .is_some_and(|ctx| !ctx.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub messages: usize,
    pub skipped: usize,
    pub urls: usize,
    pub created: usize,
    pub duplicates: usize,
    pub failed: usize,
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "messages={} skipped={} urls={} created={} duplicates={} failed={}",
            self.messages, self.skipped, self.urls, self.created, self.duplicates, self.failed
        )
    }
}
