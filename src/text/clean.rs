// Headline normalization.
//
// Lowercase, strip ticker mentions ("$AAPL", "(NASDAQ:AAPL)") and URLs,
// keep letters only, collapse whitespace. "Letters" means Unicode
// alphabetic characters, so accented words survive whole. The output only
// contains lowercase letters and single spaces, so cleaning is idempotent.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Serialize;

static EXCHANGE_TICKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*[a-z][a-z0-9.\-]*\s*:\s*[a-z0-9][a-z0-9.\-]*\s*\)").expect("valid regex")
});
static CASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$[a-z][a-z0-9.\-]*").expect("valid regex"));
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:https?://|www\.)\S+").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalize a headline. Missing text cleans to the empty string.
pub fn clean_text(text: Option<&str>) -> String {
    let Some(text) = text else {
        return String::new();
    };
    let lowered = text.to_lowercase();
    let no_tickers = EXCHANGE_TICKER.replace_all(&lowered, " ");
    let no_cashtags = CASHTAG.replace_all(&no_tickers, " ");
    let no_urls = URL.replace_all(&no_cashtags, " ");
    // regex-lite has no Unicode classes
    let letters: String = no_urls
        .chars()
        .map(|c| if c.is_alphabetic() { c } else { ' ' })
        .collect();
    WHITESPACE.replace_all(&letters, " ").trim().to_string()
}

/// Character and whitespace-token counts for one headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeadlineLength {
    pub chars: usize,
    pub tokens: usize,
}

/// Length of each headline; missing headlines count as empty.
pub fn headline_length(headlines: &[Option<String>]) -> Vec<HeadlineLength> {
    headlines
        .iter()
        .map(|h| {
            let text = h.as_deref().unwrap_or("");
            HeadlineLength {
                chars: text.chars().count(),
                tokens: text.split_whitespace().count(),
            }
        })
        .collect()
}
