use std::env;

use tracing::warn;

use crate::indicators::engine::TrimPolicy;
use crate::prices::yahoo::DEFAULT_PRICE_API_URL;
use crate::text::stopwords::StopwordSet;

/// Default seed for topic training.
pub const DEFAULT_LDA_SEED: u64 = 42;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default; unrecognized values fall back to it with a warning.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Chart API endpoint (TICKERTAPE_PRICE_API_URL).
    pub price_api_url: String,
    /// Stopword list for tokenization (TICKERTAPE_STOPWORDS: nltk | extended).
    pub stopwords: StopwordSet,
    /// Which columns gate the post-indicator trim
    /// (TICKERTAPE_TRIM_POLICY: indicators | any).
    pub trim_policy: TrimPolicy,
    /// Topic model seed (TICKERTAPE_LDA_SEED).
    pub lda_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            price_api_url: DEFAULT_PRICE_API_URL.to_string(),
            stopwords: StopwordSet::default(),
            trim_policy: TrimPolicy::default(),
            lda_seed: DEFAULT_LDA_SEED,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `load` reads the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let stopwords = match lookup("TICKERTAPE_STOPWORDS").as_deref().map(str::trim) {
            None | Some("nltk") => StopwordSet::Nltk,
            Some("extended") => StopwordSet::Extended,
            Some(other) => {
                warn!(value = other, "Unknown TICKERTAPE_STOPWORDS, using nltk");
                defaults.stopwords
            }
        };

        let trim_policy = match lookup("TICKERTAPE_TRIM_POLICY").as_deref().map(str::trim) {
            None | Some("indicators") => TrimPolicy::IndicatorColumns,
            Some("any") => TrimPolicy::AnyColumn,
            Some(other) => {
                warn!(value = other, "Unknown TICKERTAPE_TRIM_POLICY, using indicators");
                defaults.trim_policy
            }
        };

        let lda_seed = match lookup("TICKERTAPE_LDA_SEED") {
            None => defaults.lda_seed,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "TICKERTAPE_LDA_SEED is not a u64, using {DEFAULT_LDA_SEED}");
                defaults.lda_seed
            }),
        };

        let price_api_url = lookup("TICKERTAPE_PRICE_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(defaults.price_api_url);

        Self {
            price_api_url,
            stopwords,
            trim_policy,
            lda_seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config_from(&[]), Config::default());
    }

    #[test]
    fn recognized_values_are_applied() {
        let config = config_from(&[
            ("TICKERTAPE_STOPWORDS", "extended"),
            ("TICKERTAPE_TRIM_POLICY", "any"),
            ("TICKERTAPE_LDA_SEED", "7"),
            ("TICKERTAPE_PRICE_API_URL", "http://localhost:9000"),
        ]);
        assert_eq!(config.stopwords, StopwordSet::Extended);
        assert_eq!(config.trim_policy, TrimPolicy::AnyColumn);
        assert_eq!(config.lda_seed, 7);
        assert_eq!(config.price_api_url, "http://localhost:9000");
    }

    #[test]
    fn unrecognized_values_fall_back() {
        let config = config_from(&[
            ("TICKERTAPE_STOPWORDS", "klingon"),
            ("TICKERTAPE_TRIM_POLICY", "some"),
            ("TICKERTAPE_LDA_SEED", "-1"),
            ("TICKERTAPE_PRICE_API_URL", "  "),
        ]);
        assert_eq!(config, Config::default());
    }
}
