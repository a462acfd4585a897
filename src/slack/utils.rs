use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

// Either a Slack-wrapped link `<url>` / `<url|label>` or a bare URL. The
// scheme may be in any case.
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<(?P<wrapped>(?i:https?)://[^>|\s]+)(?:\|[^>]*)?>|(?P<bare>(?i:https?)://[^\s<>"]+)"#)
        .expect("valid url regex")
});

/// URLs in `text`, in order of appearance. Repeats are kept.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            if let Some(wrapped) = caps.name("wrapped") {
                Some(unescape_entities(wrapped.as_str()))
            } else {
                caps.name("bare")
                    .map(|bare| normalize_url(&unescape_entities(bare.as_str())))
            }
        })
        .filter(|url| is_valid_url(url))
        .collect()
}

fn is_valid_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some_and(|host| !host.is_empty())
        }
        Err(_) => false,
    }
}

// Slack escapes these three in message text, including inside links.
fn unescape_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

fn normalize_url(raw: &str) -> String {
    let mut cleaned = raw.trim_end_matches(char::is_whitespace).to_string();
    while let Some(last) = cleaned.chars().last() {
        let should_trim = match last {
            ')' => !cleaned.contains('('),
            ']' => !cleaned.contains('['),
            '}' => !cleaned.contains('{'),
            '\'' => count_char(&cleaned, '\'') % 2 == 1,
            ',' | '.' | '!' | '?' | ';' | ':' => true,
            _ => false,
        };
        if should_trim {
            cleaned.pop();
        } else {
            break;
        }
    }
    cleaned
}

fn count_char(value: &str, needle: char) -> usize {
    value.chars().filter(|ch| *ch == needle).count()
}
