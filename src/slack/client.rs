use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::SlackConfig,
    domain::{ChannelMessage, ChatChannel, SlackTs},
};

use super::types::{merge_history, AckResponse, AddReactionRequest, HistoryResponse, SlackApiError};

const SLACK_API_URL: &str = "https://slack.com/api";

#[derive(Clone)]
pub struct SlackClient {
    http: Client,
    config: SlackConfig,
}

impl SlackClient {
    pub fn new(http: Client, config: SlackConfig) -> Self {
        Self { http, config }
    }

    async fn history_page(&self, oldest: SlackTs, cursor: Option<&str>) -> Result<HistoryResponse> {
        let oldest = oldest.to_string();
        let limit = self.config.history_page_size.to_string();
        let mut params = vec![
            ("channel", self.config.channel_id.as_str()),
            ("oldest", oldest.as_str()),
            ("limit", limit.as_str()),
        ];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor));
        }

        let page: HistoryResponse = self
            .http
            .get(format!("{SLACK_API_URL}/conversations.history"))
            .bearer_auth(&self.config.bot_token)
            .query(&params)
            .send()
            .await
            .context("conversations.history request failed")?
            .error_for_status()?
            .json()
            .await
            .context("conversations.history returned an unreadable body")?;

        if !page.ok {
            return Err(SlackApiError {
                method: "conversations.history",
                error: page.error.unwrap_or_else(|| "unknown_error".to_string()),
            }
            .into());
        }
        Ok(page)
    }
}

#[async_trait]
impl ChatChannel for SlackClient {
    async fn history_since(&self, oldest: SlackTs) -> Result<Vec<ChannelMessage>> {
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.history_page(oldest, cursor.as_deref()).await?;
            cursor = page.next_cursor().map(str::to_string);
            pages.push(page);
            if cursor.is_none() {
                break;
            }
        }

        let messages = merge_history(pages, oldest);
        tracing::debug!(target: "slack", oldest = %oldest, count = messages.len(), "history fetched");
        Ok(messages)
    }

    async fn add_reaction(&self, ts: SlackTs, name: &str) -> Result<()> {
        let request = AddReactionRequest {
            channel: &self.config.channel_id,
            timestamp: ts.to_string(),
            name,
        };
        let ack: AckResponse = self
            .http
            .post(format!("{SLACK_API_URL}/reactions.add"))
            .bearer_auth(&self.config.bot_token)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("reactions.add request failed for {ts}"))?
            .error_for_status()?
            .json()
            .await?;

        ack.into_result("reactions.add")?;
        Ok(())
    }
}
