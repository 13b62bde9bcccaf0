// Sentiment scorer trait: swap-ready abstraction.
//
// Scorers see raw text, not the cleaned corpus: punctuation, casing and
// emphasis all carry polarity for lexicon models.

use serde::Serialize;

/// Polarity of a single text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentScore {
    /// Normalized overall polarity in [-1, 1].
    pub compound: f64,
    /// Proportions in [0, 1].
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl SentimentScore {
    /// Score given to missing or blank text.
    pub const NEUTRAL: Self = Self {
        compound: 0.0,
        positive: 0.0,
        negative: 0.0,
        neutral: 1.0,
    };
}

/// Trait for scoring text polarity.
pub trait SentimentScorer: Send + Sync {
    /// Score one text.
    fn score(&self, text: &str) -> SentimentScore;

    /// Score every text in order. Missing or blank texts are neutral.
    fn score_batch(&self, texts: &[Option<String>]) -> Vec<SentimentScore> {
        texts
            .iter()
            .map(|t| match t.as_deref() {
                Some(text) if !text.trim().is_empty() => self.score(text),
                _ => SentimentScore::NEUTRAL,
            })
            .collect()
    }
}

/// Mean compound score, or `None` for an empty batch.
pub fn mean_compound(scores: &[SentimentScore]) -> Option<f64> {
    if scores.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = scores.len() as f64;
    Some(scores.iter().map(|s| s.compound).sum::<f64>() / n)
}
