use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ChannelMessage, SlackTs};

// Message subtypes that are channel bookkeeping rather than posts.
const IGNORED_SUBTYPES: &[&str] = &["channel_join", "channel_leave", "channel_topic", "channel_purpose"];

/// A Web API call that came back with `"ok": false`.
#[derive(Debug, Error)]
#[error("slack {method} failed: {error}")]
pub struct SlackApiError {
    pub method: &'static str,
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    pub ok: bool,
    pub error: Option<String>,
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
    #[serde(default)]
    pub has_more: bool,
    pub response_metadata: Option<ResponseMetadata>,
}

impl HistoryResponse {
    pub fn next_cursor(&self) -> Option<&str> {
        if !self.has_more {
            return None;
        }
        self.response_metadata
            .as_ref()
            .and_then(|meta| meta.next_cursor.as_deref())
            .filter(|cursor| !cursor.is_empty())
    }
}

/// Flattens history pages into the messages newer than `oldest`, oldest first.
/// Slack treats `oldest` as inclusive and returns each page newest first.
pub fn merge_history(pages: Vec<HistoryResponse>, oldest: SlackTs) -> Vec<ChannelMessage> {
    let mut messages: Vec<ChannelMessage> = pages
        .into_iter()
        .flat_map(|page| page.messages)
        .filter(|msg| msg.ts > oldest && !msg.is_bookkeeping())
        .map(ChannelMessage::from)
        .collect();
    messages.sort_by_key(|msg| msg.ts);
    messages
}

#[derive(Debug, Deserialize)]
pub struct ResponseMetadata {
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryMessage {
    pub ts: SlackTs,
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    pub subtype: Option<String>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
}

impl HistoryMessage {
    fn is_bookkeeping(&self) -> bool {
        self.subtype
            .as_deref()
            .is_some_and(|subtype| IGNORED_SUBTYPES.contains(&subtype))
    }
}

#[derive(Debug, Deserialize)]
pub struct Reaction {
    pub name: String,
}

impl From<HistoryMessage> for ChannelMessage {
    fn from(msg: HistoryMessage) -> Self {
        Self {
            ts: msg.ts,
            user: msg.user,
            text: msg.text,
            reactions: msg.reactions.into_iter().map(|r| r.name).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddReactionRequest<'a> {
    pub channel: &'a str,
    pub timestamp: String,
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct AckResponse {
    pub ok: bool,
    pub error: Option<String>,
}

impl AckResponse {
    /// `already_reacted` means the reaction is in place, which is all a caller
    /// wants from `reactions.add`.
    pub fn into_result(self, method: &'static str) -> Result<(), SlackApiError> {
        match (self.ok, self.error) {
            (true, _) => Ok(()),
            (false, Some(error)) if error == "already_reacted" => Ok(()),
            (false, error) => Err(SlackApiError {
                method,
                error: error.unwrap_or_else(|| "unknown_error".to_string()),
            }),
        }
    }
}
