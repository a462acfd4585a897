use anyhow::{Context, Result};
use async_trait::async_trait;
use dom_smoothie::{Config as ReadabilityConfig, Readability, TextMode};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header, Client, StatusCode};
use tracing::warn;
use url::Url;

use crate::{
    config::WebContentConfig,
    domain::{PageContent, PageFetcher},
};

static LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"'\\,;)}\]]+"#).expect("valid link regex"));
static SCRIPT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)[^>]*>.*?</(script|style|noscript)>")
        .expect("valid script regex")
});
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));
static SPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid space regex"));

pub struct WebContentFetcher {
    client: Client,
    config: WebContentConfig,
}

impl WebContentFetcher {
    pub fn new(config: WebContentConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.fetch_timeout)
            .build()
            .context("failed to build page fetch client")?;
        Ok(Self { client, config })
    }

    async fn fetch_body(&self, url: &Url) -> Result<Option<String>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", url))?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        if let Some(reason) = skip_reason(response.status(), content_type) {
            warn!(target: "web", url = %url, status = %response.status(), ?content_type, "{reason}");
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }
}

#[async_trait]
impl PageFetcher for WebContentFetcher {
    async fn fetch(&self, raw_url: &str) -> Result<PageContent> {
        let url = match Url::parse(raw_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => return Ok(PageContent::default()),
        };

        let Some(body) = self.fetch_body(&url).await? else {
            return Ok(PageContent::default());
        };

        Ok(page_from_html(&body, &url, self.config.content_max_length))
    }
}

/// Why a response body should not be read, if it shouldn't.
fn skip_reason(status: StatusCode, content_type: Option<&str>) -> Option<&'static str> {
    if !status.is_success() {
        return Some("non-success page status");
    }
    if !content_type.map_or(true, body_is_text) {
        return Some("skipping non-text content");
    }
    None
}

fn body_is_text(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("text") || content_type.contains("xml") || content_type.contains("json")
}

fn page_from_html(body: &str, url: &Url, max_len: usize) -> PageContent {
    let links = collect_links(body);
    let (title, text) = match readable_text(body, url) {
        Some((title, text)) if !text.is_empty() => (title, text),
        _ => (None, strip_tags(body)),
    };
    PageContent {
        title,
        text: truncate_chars(text, max_len),
        links,
    }
}

fn readable_text(body: &str, url: &Url) -> Option<(Option<String>, String)> {
    let smoothie_cfg = ReadabilityConfig {
        text_mode: TextMode::Formatted,
        ..Default::default()
    };

    let mut readability = match Readability::new(body, Some(url.as_str()), Some(smoothie_cfg)) {
        Ok(reader) => reader,
        Err(err) => {
            warn!(target: "web", error = %err, url = %url, "Readability init failed");
            return None;
        }
    };

    let article = match readability.parse() {
        Ok(article) => article,
        Err(err) => {
            warn!(target: "web", error = %err, url = %url, "Readability parse failed; stripping tags");
            return None;
        }
    };

    let title = clean_str(Some(article.title));
    Some((title, article.text_content.trim().to_string()))
}

fn strip_tags(body: &str) -> String {
    let without_scripts = SCRIPT_REGEX.replace_all(body, " ");
    let without_tags = TAG_REGEX.replace_all(&without_scripts, " ");
    SPACE_REGEX
        .replace_all(&without_tags, " ")
        .trim()
        .to_string()
}

fn collect_links(body: &str) -> Vec<String> {
    let body = body.replace("&amp;", "&");
    let mut links: Vec<String> = Vec::new();
    for found in LINK_REGEX.find_iter(&body) {
        let link = found.as_str().to_string();
        if !links.contains(&link) {
            links.push(link);
        }
    }
    links
}

fn truncate_chars(mut text: String, max_len: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max_len) {
        text.truncate(idx);
    }
    text
}

fn clean_str(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
