// Latent Dirichlet Allocation via collapsed Gibbs sampling.
//
// Symmetric priors alpha = eta = 1 / num_topics. Every token of every
// document is resampled once per sweep; training runs `passes × iterations`
// sweeps from a seeded RNG, so the same corpus and seed always produce the
// same model.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};

use super::dictionary::{BowVector, Dictionary};
use super::traits::TopicModelTrainer;
use crate::error::{AnalysisError, Result};

/// Number of terms shown per topic in printed summaries.
pub const DEFAULT_TOPIC_WORDS: usize = 10;

/// Training parameters for [`GibbsLda`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LdaParams {
    pub num_topics: usize,
    /// Outer training passes over the corpus.
    pub passes: usize,
    /// Gibbs sweeps per pass.
    pub iterations: usize,
    pub random_state: u64,
}

impl Default for LdaParams {
    fn default() -> Self {
        Self {
            num_topics: 6,
            passes: 6,
            iterations: 50,
            random_state: 42,
        }
    }
}

impl LdaParams {
    pub fn validate(&self) -> Result<()> {
        if self.num_topics == 0 {
            return Err(AnalysisError::InvalidParameter(
                "num_topics must be at least 1".to_string(),
            ));
        }
        if self.passes == 0 || self.iterations == 0 {
            return Err(AnalysisError::InvalidParameter(
                "passes and iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn total_sweeps(&self) -> usize {
        self.passes * self.iterations
    }
}

/// A weighted term within one topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicTerm {
    pub term: String,
    pub weight: f64,
}

/// A trained topic model: per-topic word distributions and per-document
/// topic mixtures.
#[derive(Debug, Clone, Serialize)]
pub struct TopicModel {
    vocabulary: Vec<String>,
    /// `num_topics × vocabulary` rows, each summing to 1.
    topic_word: Vec<Vec<f64>>,
    /// `num_docs × num_topics` rows, each summing to 1.
    doc_topic: Vec<Vec<f64>>,
}

impl TopicModel {
    pub fn num_topics(&self) -> usize {
        self.topic_word.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// The `n` heaviest terms of `topic`, heaviest first. Equal weights keep
    /// dictionary order.
    pub fn top_terms(&self, topic: usize, n: usize) -> Vec<TopicTerm> {
        let Some(weights) = self.topic_word.get(topic) else {
            return Vec::new();
        };
        let mut ranked: Vec<(usize, f64)> = weights.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
            .into_iter()
            .take(n)
            .map(|(id, weight)| TopicTerm {
                term: self.vocabulary[id].clone(),
                weight,
            })
            .collect()
    }

    /// One line per topic in index order:
    /// `Topic 0: 0.045*"stock" + 0.030*"price" + ...`
    pub fn print_topics(&self, num_words: usize) -> Vec<String> {
        (0..self.num_topics())
            .map(|k| {
                let terms: Vec<String> = self
                    .top_terms(k, num_words)
                    .iter()
                    .map(|t| format!("{:.3}*\"{}\"", t.weight, t.term))
                    .collect();
                format!("Topic {k}: {}", terms.join(" + "))
            })
            .collect()
    }

    /// Topic mixture of training document `doc`.
    pub fn document_topics(&self, doc: usize) -> Option<&[f64]> {
        self.doc_topic.get(doc).map(Vec::as_slice)
    }
}

/// Collapsed Gibbs sampler.
#[derive(Debug, Clone, Default)]
pub struct GibbsLda {
    pub params: LdaParams,
}

impl GibbsLda {
    pub fn new(params: LdaParams) -> Self {
        Self { params }
    }
}

/// Sampler state: topic assignment per token plus the three count tables.
struct Counts {
    /// Token ids per document, expanded from the bag-of-words counts.
    tokens: Vec<Vec<usize>>,
    assignments: Vec<Vec<usize>>,
    doc_topic: Vec<Vec<u32>>,
    topic_word: Vec<Vec<u32>>,
    topic_total: Vec<u32>,
}

impl Counts {
    fn init(corpus: &[BowVector], num_topics: usize, vocab: usize, rng: &mut StdRng) -> Self {
        let tokens: Vec<Vec<usize>> = corpus
            .iter()
            .map(|bow| {
                bow.iter()
                    .flat_map(|&(id, count)| std::iter::repeat_n(id as usize, count as usize))
                    .collect()
            })
            .collect();

        let mut counts = Self {
            assignments: Vec::with_capacity(tokens.len()),
            doc_topic: vec![vec![0; num_topics]; tokens.len()],
            topic_word: vec![vec![0; vocab]; num_topics],
            topic_total: vec![0; num_topics],
            tokens: Vec::new(),
        };
        for (d, doc) in tokens.iter().enumerate() {
            let mut doc_assignments = Vec::with_capacity(doc.len());
            for &w in doc {
                let k = rng.random_range(0..num_topics);
                counts.doc_topic[d][k] += 1;
                counts.topic_word[k][w] += 1;
                counts.topic_total[k] += 1;
                doc_assignments.push(k);
            }
            counts.assignments.push(doc_assignments);
        }
        counts.tokens = tokens;
        counts
    }

    fn sweep(&mut self, alpha: f64, eta: f64, rng: &mut StdRng, weights: &mut [f64]) {
        #[allow(clippy::cast_precision_loss)]
        let vocab_eta = self.topic_word.first().map_or(0, Vec::len) as f64 * eta;

        for d in 0..self.tokens.len() {
            for i in 0..self.tokens[d].len() {
                let w = self.tokens[d][i];
                let old = self.assignments[d][i];
                self.doc_topic[d][old] -= 1;
                self.topic_word[old][w] -= 1;
                self.topic_total[old] -= 1;

                let mut total = 0.0;
                for (k, weight) in weights.iter_mut().enumerate() {
                    let p = (f64::from(self.doc_topic[d][k]) + alpha)
                        * (f64::from(self.topic_word[k][w]) + eta)
                        / (f64::from(self.topic_total[k]) + vocab_eta);
                    total += p;
                    *weight = total;
                }
                let u = rng.random::<f64>() * total;
                let new = weights
                    .iter()
                    .position(|&cum| u < cum)
                    .unwrap_or(weights.len() - 1);

                self.doc_topic[d][new] += 1;
                self.topic_word[new][w] += 1;
                self.topic_total[new] += 1;
                self.assignments[d][i] = new;
            }
        }
    }
}

impl TopicModelTrainer for GibbsLda {
    fn train_with_progress(
        &self,
        corpus: &[BowVector],
        dictionary: &Dictionary,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<TopicModel> {
        self.params.validate()?;
        if dictionary.is_empty() {
            return Err(AnalysisError::EmptyVocabulary);
        }

        let num_topics = self.params.num_topics;
        let vocab = dictionary.len();
        #[allow(clippy::cast_precision_loss)]
        let prior = 1.0 / num_topics as f64;
        let (alpha, eta) = (prior, prior);

        let mut rng = StdRng::seed_from_u64(self.params.random_state);
        let mut counts = Counts::init(corpus, num_topics, vocab, &mut rng);
        let token_count: usize = counts.tokens.iter().map(Vec::len).sum();
        info!(
            docs = corpus.len(),
            vocab,
            tokens = token_count,
            num_topics,
            sweeps = self.params.total_sweeps(),
            "Training LDA"
        );

        let total = self.params.total_sweeps();
        let mut weights = vec![0.0; num_topics];
        for sweep in 1..=total {
            counts.sweep(alpha, eta, &mut rng, &mut weights);
            if sweep % self.params.iterations == 0 {
                debug!(pass = sweep / self.params.iterations, "LDA pass complete");
            }
            progress(sweep, total);
        }

        #[allow(clippy::cast_precision_loss)]
        let vocab_eta = vocab as f64 * eta;
        let topic_word = counts
            .topic_word
            .iter()
            .zip(&counts.topic_total)
            .map(|(row, &n_k)| {
                let denom = f64::from(n_k) + vocab_eta;
                row.iter().map(|&n| (f64::from(n) + eta) / denom).collect()
            })
            .collect();

        #[allow(clippy::cast_precision_loss)]
        let topics_alpha = num_topics as f64 * alpha;
        let doc_topic = counts
            .doc_topic
            .iter()
            .zip(&counts.tokens)
            .map(|(row, doc)| {
                #[allow(clippy::cast_precision_loss)]
                let denom = doc.len() as f64 + topics_alpha;
                row.iter().map(|&n| (f64::from(n) + alpha) / denom).collect()
            })
            .collect();

        let vocabulary = (0..vocab as u32)
            .map(|id| dictionary.token(id).unwrap_or_default().to_string())
            .collect();

        Ok(TopicModel {
            vocabulary,
            topic_word,
            doc_topic,
        })
    }
}
