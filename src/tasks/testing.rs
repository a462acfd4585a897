//! In-memory collaborators for exercising the pass protocol without network
//! access. Each fake records what it was asked to do.

use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::domain::{
    ChannelMessage, ChatChannel, ExtractedJob, ExtractionInput, JobExtractor, JobPosting, JobSink,
    PageContent, PageFetcher, RecordOutcome, SlackTs,
};

pub fn message(ts: SlackTs, text: &str) -> ChannelMessage {
    ChannelMessage {
        ts,
        user: Some("U0POSTER".into()),
        text: text.into(),
        reactions: Vec::new(),
    }
}

#[derive(Default)]
pub struct FakeChat {
    pub messages: Mutex<Vec<ChannelMessage>>,
    pub reactions: Mutex<Vec<(SlackTs, String)>>,
    pub history_calls: Mutex<Vec<SlackTs>>,
    pub fail_history: Mutex<bool>,
    /// Reaction names that fail with an API error.
    pub failing_reactions: Mutex<Vec<String>>,
    /// When set, `history_since` waits for a notification before answering.
    pub gate: Option<Arc<Notify>>,
}

impl FakeChat {
    pub fn with_messages(messages: Vec<ChannelMessage>) -> Self {
        Self {
            messages: Mutex::new(messages),
            ..Default::default()
        }
    }

    pub fn push(&self, message: ChannelMessage) {
        self.messages.lock().push(message);
    }

    pub fn reactions_on(&self, ts: SlackTs) -> Vec<String> {
        self.reactions
            .lock()
            .iter()
            .filter(|(on, _)| *on == ts)
            .map(|(_, name)| name.clone())
            .collect()
    }
}

#[async_trait]
impl ChatChannel for FakeChat {
    async fn history_since(&self, oldest: SlackTs) -> Result<Vec<ChannelMessage>> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.history_calls.lock().push(oldest);
        if *self.fail_history.lock() {
            return Err(anyhow!("slack conversations.history failed: service_unavailable"));
        }
        let mut found: Vec<_> = self
            .messages
            .lock()
            .iter()
            .filter(|msg| msg.ts > oldest)
            .cloned()
            .collect();
        found.sort_by_key(|msg| msg.ts);
        Ok(found)
    }

    async fn add_reaction(&self, ts: SlackTs, name: &str) -> Result<()> {
        if self.failing_reactions.lock().iter().any(|n| n == name) {
            return Err(anyhow!("slack reactions.add failed: ratelimited"));
        }
        self.reactions.lock().push((ts, name.to_string()));
        Ok(())
    }
}

/// Serves canned pages; unknown URLs fail like an unreachable host.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, PageContent>,
    pub fetched: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn with_page(mut self, url: &str, text: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            PageContent {
                title: None,
                text: text.to_string(),
                links: links.iter().map(|l| l.to_string()).collect(),
            },
        );
        self
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<PageContent> {
        self.fetched.lock().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("failed to fetch {url}: connection refused"))
    }
}

/// Returns the configured job for any input with content, mirroring the
/// real extractor's "nothing to read" short-circuit.
#[derive(Default)]
pub struct FakeExtractor {
    pub job: ExtractedJob,
    pub failing_urls: Vec<String>,
    pub inputs: Mutex<Vec<ExtractionInput>>,
}

impl FakeExtractor {
    pub fn returning(job: ExtractedJob) -> Self {
        Self {
            job,
            ..Default::default()
        }
    }
}

#[async_trait]
impl JobExtractor for FakeExtractor {
    async fn extract(&self, input: &ExtractionInput) -> Result<Option<ExtractedJob>> {
        self.inputs.lock().push(input.clone());
        if self.failing_urls.contains(&input.url) {
            return Err(anyhow!("model output is not a job object"));
        }
        if !input.has_content() {
            return Ok(None);
        }
        Ok(Some(self.job.clone()))
    }
}

#[derive(Default)]
pub struct FakeSink {
    pub records: Mutex<Vec<JobPosting>>,
    /// Apply URLs the database refuses.
    pub failing_apply_urls: Vec<String>,
}

#[async_trait]
impl JobSink for FakeSink {
    async fn record(&self, posting: &JobPosting) -> Result<RecordOutcome> {
        if self.failing_apply_urls.contains(&posting.apply_url) {
            return Err(anyhow!("Notion rejected the page: 400 Bad Request"));
        }
        let mut records = self.records.lock();
        if records.iter().any(|r| r.apply_url == posting.apply_url) {
            return Ok(RecordOutcome::Duplicate);
        }
        records.push(posting.clone());
        Ok(RecordOutcome::Created)
    }
}
