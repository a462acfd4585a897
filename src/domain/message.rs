use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Slack message timestamp, `"<unix seconds>.<microseconds>"`.
///
/// Slack uses it as the message id within a channel, so ordering on it is
/// the channel order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlackTs {
    secs: i64,
    micros: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed slack timestamp: {0:?}")]
pub struct SlackTsError(String);

impl SlackTs {
    pub const fn new(secs: i64, micros: u32) -> Self {
        Self {
            secs: secs + (micros / 1_000_000) as i64,
            micros: micros % 1_000_000,
        }
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self::new(at.timestamp(), at.timestamp_subsec_micros())
    }

    /// The watermark a fresh process starts from.
    pub fn now_minus(lookback: std::time::Duration) -> Self {
        let lookback = Duration::from_std(lookback).unwrap_or(Duration::zero());
        Self::from_datetime(Utc::now() - lookback)
    }

    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.secs, self.micros * 1_000).single()
    }

    pub fn calendar_date<Tz: TimeZone>(self, tz: &Tz) -> Option<NaiveDate> {
        self.to_datetime()
            .map(|at| at.with_timezone(tz).date_naive())
    }
}

impl FromStr for SlackTs {
    type Err = SlackTsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let err = || SlackTsError(raw.to_string());
        let (secs, frac) = raw.split_once('.').unwrap_or((raw, ""));
        if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        if frac.len() > 6 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let secs = secs.parse::<i64>().map_err(|_| err())?;
        let micros = if frac.is_empty() {
            0
        } else {
            // right-pad so "1.5" is half a second
            format!("{frac:0<6}").parse::<u32>().map_err(|_| err())?
        };
        Ok(Self { secs, micros })
    }
}

impl fmt::Display for SlackTs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.secs, self.micros)
    }
}

impl Serialize for SlackTs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlackTs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A message as read from the tracked channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    pub ts: SlackTs,
    pub user: Option<String>,
    pub text: String,
    pub reactions: Vec<String>,
}

impl ChannelMessage {
    pub fn has_reaction(&self, name: &str) -> bool {
        self.reactions.iter().any(|r| r == name)
    }
}
