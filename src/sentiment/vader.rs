// VADER sentiment scorer.
//
// Wraps the `vader_sentiment` lexicon analyzer. The analyzer is built once
// and reused for every text.

use vader_sentiment::SentimentIntensityAnalyzer;

use super::traits::{SentimentScore, SentimentScorer};

pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentScorer for VaderScorer {
    fn score(&self, text: &str) -> SentimentScore {
        if text.trim().is_empty() {
            return SentimentScore::NEUTRAL;
        }
        let scores = self.analyzer.polarity_scores(text);
        let get = |key: &str| scores.get(key).copied().unwrap_or(0.0);
        SentimentScore {
            compound: get("compound"),
            positive: get("pos"),
            negative: get("neg"),
            neutral: get("neu"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::traits::mean_compound;

    #[test]
    fn positive_and_negative_headlines() {
        let scorer = VaderScorer::new();
        let good = scorer.score("Great earnings, investors are very happy");
        let bad = scorer.score("Terrible losses, a horrible crash for investors");
        assert!(good.compound > 0.0);
        assert!(bad.compound < 0.0);
        for s in [good, bad] {
            assert!((-1.0..=1.0).contains(&s.compound));
            assert!((s.positive + s.negative + s.neutral - 1.0).abs() < 0.01);
        }
    }

    #[test]
    fn blank_and_missing_are_neutral() {
        let scorer = VaderScorer::new();
        let scores = scorer.score_batch(&[None, Some("   ".to_string())]);
        assert_eq!(scores, vec![SentimentScore::NEUTRAL; 2]);
        assert_eq!(scorer.score(""), SentimentScore::NEUTRAL);
    }

    #[test]
    fn mean_of_batch() {
        assert_eq!(mean_compound(&[]), None);
        let scores = [
            SentimentScore { compound: 0.5, ..SentimentScore::NEUTRAL },
            SentimentScore { compound: -0.1, ..SentimentScore::NEUTRAL },
        ];
        assert!((mean_compound(&scores).unwrap() - 0.2).abs() < 1e-12);
    }
}
