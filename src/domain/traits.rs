// Seams between the poll loop and the outside world. Each external service
// sits behind one of these so the pass protocol can run against fakes.

use anyhow::Result;
use async_trait::async_trait;

use super::{
    ChannelMessage, ExtractedJob, ExtractionInput, JobPosting, PageContent, RecordOutcome, SlackTs,
};

/// Chat channel the job links are posted to.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Every message with `ts > oldest`, oldest first.
    async fn history_since(&self, oldest: SlackTs) -> Result<Vec<ChannelMessage>>;

    /// Adds `name` as a reaction to the message; already-present is success.
    async fn add_reaction(&self, ts: SlackTs, name: &str) -> Result<()>;
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PageContent>;
}

#[async_trait]
pub trait JobExtractor: Send + Sync {
    /// `Ok(None)` when there is nothing to extract from.
    async fn extract(&self, input: &ExtractionInput) -> Result<Option<ExtractedJob>>;
}

#[async_trait]
pub trait JobSink: Send + Sync {
    async fn record(&self, posting: &JobPosting) -> Result<RecordOutcome>;
}

/// Holder of the single "last processed message" marker.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    async fn get(&self) -> Result<Option<SlackTs>>;

    /// Stores `ts` unless it is lower than the current value.
    async fn set(&self, ts: SlackTs) -> Result<()>;
}
