use serde_json::{json, Map, Value};

use crate::domain::JobPosting;

pub const COMPANY: &str = "Company Name";
pub const ROLE: &str = "Open Role";
pub const LOCATION: &str = "Location";
pub const COMPENSATION: &str = "Compensation Range";
pub const SOURCE: &str = "Source";
pub const APPLY_LINK: &str = "Link to Apply";
pub const JOB_TYPE: &str = "Job Type";
pub const LISTED_DATE: &str = "Job Listed Date";

// Notion caps a single rich text object at 2000 characters.
const TEXT_LIMIT: usize = 2_000;

/// Page properties for one posting. Absent values are left out rather than
/// written as empty cells.
pub fn page_properties(posting: &JobPosting) -> Value {
    let mut props = Map::new();
    props.insert(
        COMPANY.into(),
        json!({ "title": [{ "text": { "content": clip(&posting.company) } }] }),
    );

    let texts = [
        (ROLE, Some(posting.role.as_str())),
        (LOCATION, Some(posting.location.as_str())),
        (COMPENSATION, posting.compensation.as_deref()),
        (SOURCE, Some(posting.source_url.as_str())),
    ];
    for (name, value) in texts {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            props.insert(name.into(), rich_text(value));
        }
    }

    props.insert(APPLY_LINK.into(), json!({ "url": posting.apply_url }));

    if let Some(label) = posting.employment_type.label() {
        props.insert(JOB_TYPE.into(), json!({ "select": { "name": label } }));
    }
    if let Some(date) = posting.listed_date {
        props.insert(
            LISTED_DATE.into(),
            json!({ "date": { "start": date.format("%Y-%m-%d").to_string() } }),
        );
    }

    Value::Object(props)
}

pub fn create_page_body(database_id: &str, posting: &JobPosting) -> Value {
    json!({
        "parent": { "database_id": database_id },
        "properties": page_properties(posting),
    })
}

pub fn duplicate_query_body(apply_url: &str) -> Value {
    json!({
        "filter": { "property": APPLY_LINK, "url": { "equals": apply_url } },
        "page_size": 1,
    })
}

fn rich_text(value: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": clip(value) } }] })
}

fn clip(value: &str) -> String {
    value.chars().take(TEXT_LIMIT).collect()
}
