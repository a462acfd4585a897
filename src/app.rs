use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use reqwest::Client;
use tokio::time::timeout;

use crate::{
    ai::AnthropicClient,
    config::{AppConfig, WatermarkBackend},
    db::{self, watermark::SqliteWatermarkStore},
    domain::{PassReport, WatermarkStore},
    infrastructure::{directories::ResolvedPaths, shutdown::ShutdownSignal},
    notion::NotionClient,
    slack::SlackClient,
    tasks::{
        poller::{Poller, PollerSettings},
        scheduler::{configure_poll_job, PollLoop},
        watermark::InMemoryWatermarkStore,
    },
    web_content::WebContentFetcher,
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HiringTrackerApp {
    config: Arc<AppConfig>,
    poll: Arc<PollLoop>,
    sqlite_store: Option<Arc<SqliteWatermarkStore>>,
}

impl HiringTrackerApp {
    pub async fn initialize(config: AppConfig, paths: &ResolvedPaths) -> Result<Self> {
        let config = Arc::new(config);

        let http_client = Client::builder()
            .user_agent(format!("hiring-tracker/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.http_timeout)
            .build()?;

        let slack = Arc::new(SlackClient::new(http_client.clone(), config.slack.clone()));
        let anthropic = Arc::new(AnthropicClient::new(
            http_client.clone(),
            config.anthropic.clone(),
        ));
        let notion = Arc::new(NotionClient::new(http_client, config.notion.clone()));
        let web_fetcher = Arc::new(WebContentFetcher::new(config.web.clone())?);

        let (watermark, sqlite_store): (Arc<dyn WatermarkStore>, _) =
            match config.watermark.backend {
                WatermarkBackend::Memory => {
                    let store = Arc::new(InMemoryWatermarkStore::new());
                    (store as Arc<dyn WatermarkStore>, None)
                }
                WatermarkBackend::Sqlite => {
                    let db_path = paths
                        .db_path
                        .as_deref()
                        .ok_or_else(|| anyhow!("sqlite watermark selected without a db path"))?;
                    let pool = db::init_pool(db_path).await?;
                    let store = Arc::new(SqliteWatermarkStore::new(pool));
                    (store.clone() as Arc<dyn WatermarkStore>, Some(store))
                }
            };

        let poller = Poller::new(
            slack,
            web_fetcher,
            anthropic,
            notion,
            watermark,
            PollerSettings::from_config(&config),
        );

        tracing::info!(
            channel = %config.slack.channel_id,
            model = %config.anthropic.model,
            backend = ?config.watermark.backend,
            "hiring tracker initialized"
        );

        Ok(Self {
            config,
            poll: Arc::new(PollLoop::new(poller)),
            sqlite_store,
        })
    }

    /// Runs exactly one pass. An aborted pass is returned as an error.
    pub async fn run_once(self) -> Result<PassReport> {
        let result = self.poll.tick().await;
        self.close_store().await;
        result.unwrap_or_else(|| Err(anyhow!("a pass is already in progress")))
    }

    pub async fn run_forever(self, mut shutdown: ShutdownSignal) -> Result<()> {
        tracing::info!("hiring tracker started");
        self.poll.tick_logged().await;

        let mut scheduler = configure_poll_job(&self.config.scheduler, self.poll.clone()).await?;

        shutdown.received().await;
        tracing::info!("shutdown signal received (CTRL+C / SIGTERM)");

        match timeout(SHUTDOWN_TIMEOUT, scheduler.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::error!(?err, "scheduler shutdown failed");
            }
            Err(_) => {
                tracing::warn!(
                    target: "scheduler",
                    "scheduler did not stop within {:?}",
                    SHUTDOWN_TIMEOUT
                );
            }
        }

        // An in-flight pass finishes so its watermark update is not lost.
        self.poll.wait_idle().await;
        self.close_store().await;

        tracing::info!("hiring tracker stopped");
        Ok(())
    }

    async fn close_store(&self) {
        if let Some(store) = &self.sqlite_store {
            if timeout(SHUTDOWN_TIMEOUT, store.close()).await.is_err() {
                tracing::warn!(
                    target: "db",
                    "watermark store did not close within {:?}",
                    SHUTDOWN_TIMEOUT
                );
            }
        }
    }
}
