// Corpus processor: raw headlines to tokens, dictionary, and bag-of-words.
//
// One processor owns one corpus. `prepare_corpus` must run before
// `lda_topics`; until then the derived state is absent.

use tracing::info;

use super::dictionary::{BowVector, Dictionary};
use super::lda::{GibbsLda, LdaParams, TopicModel, DEFAULT_TOPIC_WORDS};
use super::traits::TopicModelTrainer;
use crate::error::{AnalysisError, Result};
use crate::text::clean::clean_text;
use crate::text::stopwords::StopWords;

/// Shortest token kept.
const MIN_TOKEN_CHARS: usize = 3;

/// Dictionary pruning thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusParams {
    /// Minimum number of documents a token must appear in.
    pub no_below: usize,
    /// Maximum fraction of documents a token may appear in.
    pub no_above: f64,
    /// Vocabulary cap, most frequent first.
    pub keep_n: Option<usize>,
}

impl Default for CorpusParams {
    fn default() -> Self {
        Self {
            no_below: 5,
            no_above: 0.5,
            keep_n: Some(10_000),
        }
    }
}

impl CorpusParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.no_above) {
            return Err(AnalysisError::InvalidParameter(format!(
                "no_above must be within [0, 1], got {}",
                self.no_above
            )));
        }
        Ok(())
    }
}

pub struct CorpusProcessor {
    texts: Vec<Option<String>>,
    stopwords: StopWords,
    tokenized: Option<Vec<Vec<String>>>,
    dictionary: Option<Dictionary>,
    corpus: Option<Vec<BowVector>>,
}

impl CorpusProcessor {
    pub fn new(texts: Vec<Option<String>>, stopwords: StopWords) -> Self {
        Self {
            texts,
            stopwords,
            tokenized: None,
            dictionary: None,
            corpus: None,
        }
    }

    /// Clean, split on whitespace, drop stopwords and short tokens.
    pub fn tokenize(&self, text: Option<&str>) -> Vec<String> {
        clean_text(text)
            .split_whitespace()
            .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS && !self.stopwords.contains(t))
            .map(str::to_string)
            .collect()
    }

    /// Tokenize every text, build and prune the dictionary, vectorize.
    /// Running it again rebuilds everything from the raw texts.
    pub fn prepare_corpus(&mut self, params: &CorpusParams) -> Result<()> {
        params.validate()?;

        let tokenized: Vec<Vec<String>> =
            self.texts.iter().map(|t| self.tokenize(t.as_deref())).collect();
        let mut dictionary = Dictionary::from_documents(&tokenized);
        let before = dictionary.len();
        dictionary.filter_extremes(params.no_below, params.no_above, params.keep_n);
        let corpus: Vec<BowVector> = tokenized.iter().map(|doc| dictionary.doc2bow(doc)).collect();

        info!(
            docs = tokenized.len(),
            vocab_before = before,
            vocab = dictionary.len(),
            empty_docs = corpus.iter().filter(|bow| bow.is_empty()).count(),
            "Prepared corpus"
        );

        self.tokenized = Some(tokenized);
        self.dictionary = Some(dictionary);
        self.corpus = Some(corpus);
        Ok(())
    }

    /// Train a topic model and describe each topic by its top terms.
    pub fn lda_topics(&self, params: &LdaParams) -> Result<(TopicModel, Vec<String>)> {
        self.lda_topics_with(&GibbsLda::new(*params), &mut |_: usize, _: usize| {})
    }

    /// Like [`lda_topics`](Self::lda_topics) with any trainer and a sweep
    /// progress callback.
    pub fn lda_topics_with(
        &self,
        trainer: &dyn TopicModelTrainer,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<(TopicModel, Vec<String>)> {
        let (Some(dictionary), Some(corpus)) = (&self.dictionary, &self.corpus) else {
            return Err(AnalysisError::NotPrepared);
        };
        let model = trainer.train_with_progress(corpus, dictionary, progress)?;
        let topics = model.print_topics(DEFAULT_TOPIC_WORDS);
        Ok((model, topics))
    }

    pub fn texts(&self) -> &[Option<String>] {
        &self.texts
    }

    pub fn tokenized(&self) -> Option<&[Vec<String>]> {
        self.tokenized.as_deref()
    }

    pub fn dictionary(&self) -> Option<&Dictionary> {
        self.dictionary.as_ref()
    }

    pub fn corpus(&self) -> Option<&[BowVector]> {
        self.corpus.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor(texts: &[&str]) -> CorpusProcessor {
        CorpusProcessor::new(
            texts.iter().map(|t| Some(t.to_string())).collect(),
            StopWords::english(),
        )
    }

    #[test]
    fn tokenize_drops_stopwords_and_short_tokens() {
        let p = processor(&[]);
        assert_eq!(
            p.tokenize(Some("The $AAPL stock is UP 5% on strong iPhone sales")),
            vec!["stock", "strong", "iphone", "sales"]
        );
        assert!(p.tokenize(None).is_empty());
    }

    #[test]
    fn accessors_empty_until_prepared() {
        let mut p = processor(&["markets rally again", "markets slump"]);
        assert!(p.dictionary().is_none());
        assert!(p.corpus().is_none());
        assert!(p.tokenized().is_none());

        let params = CorpusParams {
            no_below: 1,
            no_above: 1.0,
            keep_n: None,
        };
        p.prepare_corpus(&params).unwrap();
        assert_eq!(p.tokenized().unwrap()[1], vec!["markets", "slump"]);
        assert_eq!(p.dictionary().unwrap().len(), 3);
        assert_eq!(p.corpus().unwrap().len(), 2);
    }

    #[test]
    fn lda_requires_preparation() {
        let p = processor(&["markets rally again"]);
        assert!(matches!(
            p.lda_topics(&LdaParams::default()),
            Err(AnalysisError::NotPrepared)
        ));
    }

    #[test]
    fn rejects_out_of_range_no_above() {
        let mut p = processor(&["markets rally"]);
        let params = CorpusParams {
            no_above: 1.5,
            ..CorpusParams::default()
        };
        assert!(matches!(
            p.prepare_corpus(&params),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }
}
