use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::AnthropicConfig,
    domain::{ExtractedJob, ExtractionInput, JobExtractor},
};

use super::inference::{
    build_prompt, build_request, parse_response, MessagesResponse, ANTHROPIC_API_URL,
    ANTHROPIC_VERSION,
};

#[derive(Clone)]
pub struct AnthropicClient {
    http: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(http: Client, config: AnthropicConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl JobExtractor for AnthropicClient {
    async fn extract(&self, input: &ExtractionInput) -> Result<Option<ExtractedJob>> {
        if !input.has_content() {
            return Ok(None);
        }

        let request = build_request(
            self.config.model.clone(),
            self.config.max_tokens,
            build_prompt(input),
        );
        let response: MessagesResponse = self
            .http
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .context("Anthropic request failed")?
            .error_for_status()?
            .json()
            .await
            .context("Anthropic returned an unreadable body")?;

        let job = parse_response(response)?;
        tracing::debug!(
            target: "ai",
            url = %input.url,
            company = job.company_name.as_deref().unwrap_or("-"),
            role = job.open_role.as_deref().unwrap_or("-"),
            "job details extracted"
        );
        Ok(Some(job))
    }
}
