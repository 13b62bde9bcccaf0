// Publisher domain extraction.
//
// Publishers arrive as emails ("desk@reuters.com"), URLs, bare hosts, or
// plain names ("The Guardian"). Emails keep everything after the last '@';
// hosts are reduced to their registrable domain via the public suffix list.

use std::collections::HashMap;
use std::net::IpAddr;

use reqwest::Url;

/// Registrable domain for a publisher string.
///
/// - `"user@example.com"` → `"example.com"`
/// - `"https://www.ft.com/news/main"` → `"ft.com"`
/// - `"marketwatch"` → `"marketwatch"` (no recognized suffix)
/// - `"The Guardian"` → `"the guardian"` (not a host)
/// - missing → `""`
pub fn publisher_domain(publisher: Option<&str>) -> String {
    let Some(publisher) = publisher else {
        return String::new();
    };
    let publisher = publisher.trim();

    if let Some(at) = publisher.rfind('@') {
        return publisher[at + 1..].to_lowercase();
    }

    extract_host(publisher)
        .and_then(|host| registrable_domain(&host))
        .unwrap_or_else(|| publisher.to_lowercase())
}

/// Host part of a URL or bare hostname, lowercased.
fn extract_host(text: &str) -> Option<String> {
    let candidate = if text.contains("://") {
        text.to_string()
    } else {
        format!("http://{text}")
    };
    let url = Url::parse(&candidate).ok()?;
    let host = url.host_str()?.trim_end_matches('.');
    (!host.is_empty()).then(|| host.to_lowercase())
}

/// `domain.suffix` for a known suffix, the last label for an unknown one,
/// `None` when the host is nothing but a suffix.
fn registrable_domain(host: &str) -> Option<String> {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.parse::<IpAddr>().is_ok() {
        return Some(bare.to_string());
    }

    let suffix = psl::suffix(host.as_bytes())?;
    if suffix.is_known() {
        let domain = psl::domain(host.as_bytes())?;
        return Some(String::from_utf8_lossy(domain.as_bytes()).into_owned());
    }
    host.rsplit('.').next().map(str::to_string)
}

/// Domain frequencies, most common first (ties alphabetical), capped at
/// `top`. Missing publishers are skipped.
pub fn domain_counts(publishers: &[Option<String>], top: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for publisher in publishers.iter().flatten() {
        let domain = publisher_domain(Some(publisher));
        if !domain.is_empty() {
            *counts.entry(domain).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_keeps_part_after_last_at() {
        assert_eq!(publisher_domain(Some("user@example.com")), "example.com");
        assert_eq!(publisher_domain(Some("a@b@News.Example.org")), "news.example.org");
    }

    #[test]
    fn url_reduces_to_registrable_domain() {
        assert_eq!(publisher_domain(Some("https://www.ft.com/news/main")), "ft.com");
        assert_eq!(publisher_domain(Some("news.bbc.co.uk")), "bbc.co.uk");
        assert_eq!(publisher_domain(Some("bloomberg.com")), "bloomberg.com");
    }

    #[test]
    fn unknown_suffix_keeps_last_label() {
        assert_eq!(publisher_domain(Some("marketwatch")), "marketwatch");
    }

    #[test]
    fn plain_names_are_lowercased() {
        assert_eq!(publisher_domain(Some("The Guardian")), "the guardian");
    }

    #[test]
    fn missing_is_empty() {
        assert_eq!(publisher_domain(None), "");
        assert_eq!(publisher_domain(Some("")), "");
    }

    #[test]
    fn counts_rank_by_frequency() {
        let publishers = vec![
            Some("desk@reuters.com".to_string()),
            Some("https://www.reuters.com/markets".to_string()),
            None,
            Some("bloomberg.com".to_string()),
            Some("  ".to_string()),
        ];
        assert_eq!(
            domain_counts(&publishers, 5),
            vec![("reuters.com".to_string(), 2), ("bloomberg.com".to_string(), 1)]
        );
        assert_eq!(domain_counts(&publishers, 1).len(), 1);
    }
}
