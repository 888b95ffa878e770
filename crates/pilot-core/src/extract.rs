//! Best-effort annotations pulled out of free-text agent replies
//!
//! The agent does not report which page it is on or which file it wrote, so
//! the preview panel guesses from the wording of recent commands and replies.
//! These are approximations for display only: an empty result or a wrong
//! guess is normal and nothing should depend on them.

use once_cell::sync::Lazy;
use pilot_types::ChatMessage;
use regex::Regex;

/// How many recent messages are scanned for a URL
const URL_SCAN_DEPTH: usize = 3;

const SEARCH_ENDPOINT: &str = "https://www.google.com/search";

static EXPLICIT_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("valid regex"));

static BARE_WWW: Lazy<Regex> = Lazy::new(|| Regex::new(r"www\.[^\s]+").expect("valid regex"));

static NAVIGATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(?:访问|打开|浏览)\s*|\b(?:visit|open|browse)\s+)([^\s]+\.[^\s]+)")
        .expect("valid regex")
});

static SEARCH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:搜索\s*|\bsearch\s+(?:for\s+)?)([^\s]+)").expect("valid regex")
});

static FILE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)/[^\s]+\.[a-z]+").expect("valid regex"));

/// Guess the page the browser is showing from the last few successful
/// messages, newest first. The first pattern that matches wins.
pub fn extract_browser_url(log: &[ChatMessage]) -> Option<String> {
    log.iter()
        .rev()
        .take(URL_SCAN_DEPTH)
        .filter(|m| m.success && !(m.message.is_empty() && m.response.is_empty()))
        .find_map(|m| url_in_text(&format!("{} {}", m.message, m.response)))
}

/// Match one piece of text against the URL patterns, in priority order
pub fn url_in_text(text: &str) -> Option<String> {
    let text = text.to_lowercase();

    if let Some(m) = EXPLICIT_URL.find(&text) {
        return non_empty(trim_trailing(m.as_str())).map(str::to_string);
    }
    if let Some(m) = BARE_WWW.find(&text) {
        return non_empty(trim_trailing(m.as_str())).map(|domain| format!("https://{}", domain));
    }
    if let Some(caps) = NAVIGATE.captures(&text) {
        let domain = trim_trailing(&caps[1]);
        if domain.contains('.') {
            return Some(with_scheme(domain));
        }
    }
    if let Some(caps) = SEARCH.captures(&text) {
        return non_empty(trim_trailing(&caps[1])).and_then(search_url);
    }

    None
}

/// Whether a reply talks about a file at all. Case-sensitive: "File" alone
/// does not count.
pub fn mentions_file(response: &str) -> bool {
    response.contains("file")
}

/// First absolute path with an extension in a reply that mentions a file
pub fn file_path_in(response: &str) -> Option<String> {
    if !mentions_file(response) {
        return None;
    }
    FILE_PATH
        .find(response)
        .map(|m| trim_trailing(m.as_str()).to_string())
}

/// The file the latest message produced, if it succeeded and names one
pub fn extract_file_path(log: &[ChatMessage]) -> Option<String> {
    log.last()
        .filter(|m| m.success)
        .and_then(|m| file_path_in(&m.response))
}

fn search_url(term: &str) -> Option<String> {
    reqwest::Url::parse_with_params(SEARCH_ENDPOINT, &[("q", term)])
        .ok()
        .map(String::from)
}

fn with_scheme(domain: &str) -> String {
    if domain.starts_with("http") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    }
}

fn trim_trailing(s: &str) -> &str {
    s.trim_end_matches(|c: char| {
        matches!(
            c,
            '.' | ',' | ';' | ':' | '!' | '?' | ')' | ']' | '}' | '"' | '\'' | '。' | '，' | '！' | '？'
        )
    })
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}
