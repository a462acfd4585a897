//! LinkedIn post helpers.
//!
//! Activity ids are snowflake-style: the high 41 bits hold the creation time
//! in milliseconds, the low 22 bits are a sequence/shard suffix.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

const SUFFIX_BITS: u32 = 22;
/// Offset from the Unix epoch to the network's id epoch. LinkedIn ids count
/// from the Unix epoch itself.
pub const LINKEDIN_EPOCH_OFFSET_MS: i64 = 0;
/// 2003-05-05, the network's launch. Nothing older can be a real post.
const EARLIEST_VALID_MS: i64 = 1_052_092_800_000;

static ACTIVITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:activity|ugcpost)(?::|-|%3a)(\d+)").expect("valid activity regex")
});

static JOB_BOARD_DOMAINS: &[&str] = &[
    "greenhouse.io",
    "lever.co",
    "ashbyhq.com",
    "workday.com",
    "myworkdayjobs.com",
    "smartrecruiters.com",
    "jobvite.com",
    "icims.com",
    "applytojob.com",
    "bamboohr.com",
    "recruitee.com",
    "workable.com",
    "breezy.hr",
    "jazz.co",
    "resumator.com",
    "wellfound.com",
    "linkedin.com/jobs/view",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActivityIdError {
    #[error("activity id is not an unsigned integer: {0:?}")]
    NotAnInteger(String),
    #[error("activity id decodes to {0} ms, outside the plausible range")]
    OutOfRange(i64),
}

/// Whether `raw` is a LinkedIn feed/post URL (as opposed to a job listing
/// hosted on LinkedIn).
pub fn is_post_url(raw: &str) -> bool {
    let Ok(url) = Url::parse(raw) else {
        return false;
    };
    if !is_linkedin_host(&url) {
        return false;
    }
    let path = url.path();
    path.starts_with("/feed/") || path.starts_with("/posts/") || ACTIVITY_REGEX.is_match(raw)
}

/// The raw activity id embedded in a LinkedIn URL, if there is one.
pub fn activity_id_from_url(raw: &str) -> Option<&str> {
    let url = Url::parse(raw).ok()?;
    if !is_linkedin_host(&url) {
        return None;
    }
    ACTIVITY_REGEX
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Creation time encoded in an activity id.
pub fn decode_activity_id(raw: &str) -> Result<DateTime<Utc>, ActivityIdError> {
    decode_activity_id_at(raw, Utc::now())
}

fn decode_activity_id_at(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ActivityIdError> {
    let id = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ActivityIdError::NotAnInteger(raw.to_string()))?;

    // u64 >> 22 always fits in i64
    let millis = (id >> SUFFIX_BITS) as i64 + LINKEDIN_EPOCH_OFFSET_MS;
    let latest = (now + Duration::days(1)).timestamp_millis();
    if !(EARLIEST_VALID_MS..=latest).contains(&millis) {
        return Err(ActivityIdError::OutOfRange(millis));
    }

    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(ActivityIdError::OutOfRange(millis))
}

/// Listed date for a post URL. Decoder failures are logged and read as
/// "no date".
pub fn activity_date(url: &str) -> Option<NaiveDate> {
    let id = activity_id_from_url(url)?;
    match decode_activity_id(id) {
        Ok(at) => Some(at.date_naive()),
        Err(err) => {
            tracing::warn!(target: "linkedin", url, error = %err, "ignoring undecodable activity id");
            None
        }
    }
}

/// Links inside a fetched post that point at a known job board, in document
/// order, without duplicates and without the post itself.
pub fn job_board_links(links: &[String], source_url: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for link in links {
        let link = link.trim_end_matches('.');
        if link == source_url || found.iter().any(|seen| seen == link) {
            continue;
        }
        if JOB_BOARD_DOMAINS.iter().any(|domain| link.contains(domain)) {
            found.push(link.to_string());
        }
    }
    found
}

fn is_linkedin_host(url: &Url) -> bool {
    url.host_str().is_some_and(|host| {
        let host = host.to_ascii_lowercase();
        host == "linkedin.com" || host.ends_with(".linkedin.com")
    })
}
