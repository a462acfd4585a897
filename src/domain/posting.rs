use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    #[default]
    Unknown,
}

impl EmploymentType {
    /// Lenient parse of whatever the model wrote ("Full-time", "full time",
    /// "FULLTIME", "Contractor", ...).
    pub fn from_free_text(raw: &str) -> Self {
        let squashed: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match squashed.as_str() {
            "fulltime" | "ft" | "permanent" => Self::FullTime,
            "parttime" | "pt" => Self::PartTime,
            "contract" | "contractor" | "freelance" | "temporary" | "temp" => Self::Contract,
            "internship" | "intern" => Self::Internship,
            _ => Self::Unknown,
        }
    }

    /// Select option name in the tracking database; `None` for Unknown.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::FullTime => Some("Full-time"),
            Self::PartTime => Some("Part-time"),
            Self::Contract => Some("Contract"),
            Self::Internship => Some("Internship"),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for EmploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().unwrap_or("Unknown"))
    }
}

/// Raw fields as returned by the extraction model. Every field is optional;
/// "unknown"-style markers are already normalised to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedJob {
    pub company_name: Option<String>,
    pub open_role: Option<String>,
    pub job_type: Option<String>,
    pub location: Option<String>,
    pub compensation_range: Option<String>,
    pub link_to_apply: Option<String>,
    pub job_listed_date: Option<String>,
}

impl ExtractedJob {
    pub fn normalized(self) -> Self {
        Self {
            company_name: known(self.company_name),
            open_role: known(self.open_role),
            job_type: known(self.job_type),
            location: known(self.location),
            compensation_range: known(self.compensation_range),
            link_to_apply: known(self.link_to_apply),
            job_listed_date: known(self.job_listed_date),
        }
    }

    pub fn listed_date(&self) -> Option<NaiveDate> {
        let raw = self.job_listed_date.as_deref()?.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }
}

fn known(value: Option<String>) -> Option<String> {
    let value = value?.trim().to_string();
    match value.to_ascii_lowercase().as_str() {
        "" | "unknown" | "null" | "none" | "n/a" | "na" | "not specified" | "not listed" => None,
        _ => Some(value),
    }
}

/// One row destined for the tracking database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPosting {
    pub company: String,
    pub role: String,
    pub employment_type: EmploymentType,
    pub location: String,
    pub compensation: Option<String>,
    pub listed_date: Option<NaiveDate>,
    /// The message URL this posting was found through.
    pub source_url: String,
    /// Where to apply: the model's link when it found one, else the page URL.
    pub apply_url: String,
}

impl JobPosting {
    pub fn from_extracted(
        job: ExtractedJob,
        page_url: &str,
        source_url: &str,
        listed_date: Option<NaiveDate>,
    ) -> Self {
        let unknown = || "Unknown".to_string();
        Self {
            company: job.company_name.unwrap_or_else(unknown),
            role: job.open_role.unwrap_or_else(unknown),
            employment_type: job
                .job_type
                .as_deref()
                .map(EmploymentType::from_free_text)
                .unwrap_or_default(),
            location: job.location.unwrap_or_else(unknown),
            compensation: job.compensation_range,
            listed_date,
            source_url: source_url.to_string(),
            apply_url: job
                .link_to_apply
                .unwrap_or_else(|| page_url.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Created,
    Duplicate,
}
