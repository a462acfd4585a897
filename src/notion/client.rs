use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::NotionConfig,
    domain::{JobPosting, JobSink, RecordOutcome},
};

use super::properties::{create_page_body, duplicate_query_body};

const NOTION_API_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    config: NotionConfig,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CreatedPage {
    id: String,
}

impl NotionClient {
    pub fn new(http: Client, config: NotionConfig) -> Self {
        Self { http, config }
    }

    async fn is_duplicate(&self, apply_url: &str) -> Result<bool> {
        let response: QueryResponse = self
            .http
            .post(format!(
                "{NOTION_API_URL}/databases/{}/query",
                self.config.database_id
            ))
            .bearer_auth(&self.config.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&duplicate_query_body(apply_url))
            .send()
            .await
            .context("Notion query request failed")?
            .error_for_status()?
            .json()
            .await?;
        Ok(!response.results.is_empty())
    }

    async fn create_page(&self, posting: &JobPosting) -> Result<String> {
        let page: CreatedPage = self
            .http
            .post(format!("{NOTION_API_URL}/pages"))
            .bearer_auth(&self.config.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&create_page_body(&self.config.database_id, posting))
            .send()
            .await
            .context("Notion create request failed")?
            .error_for_status()
            .context("Notion rejected the page")?
            .json()
            .await?;
        Ok(page.id)
    }
}

#[async_trait]
impl JobSink for NotionClient {
    async fn record(&self, posting: &JobPosting) -> Result<RecordOutcome> {
        match self.is_duplicate(&posting.apply_url).await {
            Ok(true) => {
                tracing::info!(
                    target: "notion",
                    apply_url = %posting.apply_url,
                    "posting already tracked; skipping"
                );
                return Ok(RecordOutcome::Duplicate);
            }
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(target: "notion", error = %err, "duplicate check failed; creating anyway");
            }
        }

        let page_id = self.create_page(posting).await?;
        tracing::info!(
            target: "notion",
            page_id = %page_id,
            company = %posting.company,
            role = %posting.role,
            "posting added"
        );
        Ok(RecordOutcome::Created)
    }
}
