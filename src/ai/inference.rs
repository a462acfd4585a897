use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{ExtractedJob, ExtractionInput};

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const POST_CONTEXT_MAX_CHARS: usize = 8_000;

const SYSTEM_PROMPT: &str = r#"You extract job posting details from web pages. Return ONLY a JSON object with these fields, using null for any field that is not found:

{
  "company_name": "Company name",
  "open_role": "Job title",
  "job_type": "Full-time, Part-time, Contract or Internship",
  "location": "Location(s), semicolon-separated if multiple",
  "compensation_range": "Salary/comp range if listed",
  "link_to_apply": "Direct application URL if found in the page, otherwise null",
  "job_listed_date": "Date the job was posted in YYYY-MM-DD format, or null if not found"
}

Rules:
- For company_name, look at the job page, the social post and the chat message. Never answer "Unknown" if a company is mentioned anywhere.
- Default job_type to "Full-time" if the page does not say otherwise.
- Combine multiple locations with semicolons.
- Give compensation exactly as stated, including the full range.
- For job_listed_date, convert any posting date or "posted X days ago" to YYYY-MM-DD.
- Output the JSON object only, with no commentary."#;

static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```(?:json)?\s*").expect("valid fence regex"));
static FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*```$").expect("valid fence regex"));

pub fn build_prompt(input: &ExtractionInput) -> String {
    let mut prompt = format!("URL of the posting: {}\n\n", input.url);

    if !input.message_text.trim().is_empty() {
        prompt.push_str("Chat message that shared the link:\n");
        prompt.push_str(input.message_text.trim());
        prompt.push_str("\n\n---\n\n");
    }

    if let Some(context) = input.post_context.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push_str("Social post the link was found in (use it for the company name if the job page lacks one):\n");
        prompt.extend(context.chars().take(POST_CONTEXT_MAX_CHARS));
        prompt.push_str("\n\n---\n\n");
    }

    if !input.page_text.trim().is_empty() {
        if let Some(title) = input.page_title.as_deref() {
            prompt.push_str(&format!("Page title: {}\n\n", title.trim()));
        }
        prompt.push_str("Job page content:\n");
        prompt.push_str(&input.page_text);
    }
    prompt
}

pub fn build_request(model: String, max_tokens: u32, prompt: String) -> MessagesRequest {
    MessagesRequest {
        model,
        max_tokens,
        system: SYSTEM_PROMPT.into(),
        temperature: 0.0,
        messages: vec![Message {
            role: "user".into(),
            content: prompt,
        }],
    }
}

pub fn parse_response(response: MessagesResponse) -> Result<ExtractedJob> {
    let text = response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .context("Anthropic response did not contain a text block")?;

    parse_job_json(&text)
}

pub fn parse_job_json(raw: &str) -> Result<ExtractedJob> {
    let trimmed = raw.trim();
    let unfenced = FENCE_OPEN.replace(trimmed, "");
    let unfenced = FENCE_CLOSE.replace(&unfenced, "");
    let job: ExtractedJob = serde_json::from_str(unfenced.trim())
        .with_context(|| format!("model output is not a job object: {}", preview(trimmed)))?;
    Ok(job.normalized())
}

fn preview(text: &str) -> String {
    text.chars().take(120).collect()
}

#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub temperature: f32,
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}
