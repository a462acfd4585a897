use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{SlackTs, WatermarkStore};

/// Process-local watermark. Lost on restart; the next process starts from
/// its own startup lookback instead.
#[derive(Debug, Default)]
pub struct InMemoryWatermarkStore {
    current: Mutex<Option<SlackTs>>,
}

impl InMemoryWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WatermarkStore for InMemoryWatermarkStore {
    async fn get(&self) -> Result<Option<SlackTs>> {
        Ok(*self.current.lock())
    }

    async fn set(&self, ts: SlackTs) -> Result<()> {
        let mut current = self.current.lock();
        if current.map_or(true, |existing| ts > existing) {
            *current = Some(ts);
            tracing::debug!(target: "watermark", ts = %ts, "watermark advanced");
        }
        Ok(())
    }
}
