// Topic model trainer trait: swap-ready abstraction.
//
// The corpus processor only needs "corpus + dictionary in, topic model out".
// The default trainer is collapsed Gibbs sampling LDA.

use super::dictionary::{BowVector, Dictionary};
use super::lda::TopicModel;
use crate::error::Result;

/// Trains a topic model over a bag-of-words corpus.
pub trait TopicModelTrainer {
    /// Train, reporting `(completed, total)` sweeps to `progress`.
    fn train_with_progress(
        &self,
        corpus: &[BowVector],
        dictionary: &Dictionary,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<TopicModel>;

    fn train(&self, corpus: &[BowVector], dictionary: &Dictionary) -> Result<TopicModel> {
        self.train_with_progress(corpus, dictionary, &mut |_: usize, _: usize| {})
    }
}
