// Token dictionary and bag-of-words vectorization.
//
// Ids are assigned per document in sorted token order as documents are
// added. Pruning keeps surviving tokens in their original id order and
// renumbers them densely from zero.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

/// Sparse per-document `(token_id, count)` pairs, sorted by id.
pub type BowVector = Vec<(u32, u32)>;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dictionary {
    token2id: HashMap<String, u32>,
    id2token: Vec<String>,
    /// Number of documents each token id appears in.
    dfs: Vec<usize>,
    num_docs: usize,
}

impl Dictionary {
    /// Build a dictionary from tokenized documents.
    pub fn from_documents<S: AsRef<str>>(documents: &[Vec<S>]) -> Self {
        let mut dictionary = Self::default();
        for document in documents {
            dictionary.add_document(document);
        }
        dictionary
    }

    fn add_document<S: AsRef<str>>(&mut self, document: &[S]) {
        let unique: BTreeSet<&str> = document.iter().map(AsRef::as_ref).collect();
        for token in unique {
            let id = match self.token2id.get(token) {
                Some(&id) => id,
                None => {
                    let id = self.id2token.len() as u32;
                    self.token2id.insert(token.to_string(), id);
                    self.id2token.push(token.to_string());
                    self.dfs.push(0);
                    id
                }
            };
            self.dfs[id as usize] += 1;
        }
        self.num_docs += 1;
    }

    /// Prune rare and overly common tokens, then cap the vocabulary.
    ///
    /// Keeps tokens appearing in at least `no_below` documents and in at
    /// most `no_above × num_docs` documents (truncated), then the `keep_n`
    /// highest document frequencies (ties keep earlier ids).
    pub fn filter_extremes(&mut self, no_below: usize, no_above: f64, keep_n: Option<usize>) {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let no_above_abs = (no_above * self.num_docs as f64) as usize;

        let mut good: Vec<usize> = (0..self.id2token.len())
            .filter(|&id| self.dfs[id] >= no_below && self.dfs[id] <= no_above_abs)
            .collect();
        if let Some(keep_n) = keep_n {
            // Stable sort: equal frequencies keep id order
            good.sort_by(|a, b| self.dfs[*b].cmp(&self.dfs[*a]));
            good.truncate(keep_n);
        }
        good.sort_unstable();

        let id2token: Vec<String> = good.iter().map(|&id| self.id2token[id].clone()).collect();
        let dfs: Vec<usize> = good.iter().map(|&id| self.dfs[id]).collect();
        self.token2id = id2token
            .iter()
            .enumerate()
            .map(|(id, token)| (token.clone(), id as u32))
            .collect();
        self.id2token = id2token;
        self.dfs = dfs;
    }

    /// Count known tokens in a document. Unknown tokens are skipped, so a
    /// document of pruned tokens yields an empty vector.
    pub fn doc2bow<S: AsRef<str>>(&self, document: &[S]) -> BowVector {
        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for token in document {
            if let Some(&id) = self.token2id.get(token.as_ref()) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.id2token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id2token.is_empty()
    }

    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    pub fn token_id(&self, token: &str) -> Option<u32> {
        self.token2id.get(token).copied()
    }

    pub fn token(&self, id: u32) -> Option<&str> {
        self.id2token.get(id as usize).map(String::as_str)
    }

    pub fn doc_frequency(&self, id: u32) -> Option<usize> {
        self.dfs.get(id as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<Vec<&'static str>> {
        vec![
            vec!["stock", "rally", "stock"],
            vec!["oil", "stock"],
            vec!["oil", "bond"],
            vec!["rally"],
        ]
    }

    #[test]
    fn ids_follow_sorted_first_appearance() {
        let dict = Dictionary::from_documents(&docs());
        assert_eq!(dict.token_id("rally"), Some(0));
        assert_eq!(dict.token_id("stock"), Some(1));
        assert_eq!(dict.token_id("oil"), Some(2));
        assert_eq!(dict.token_id("bond"), Some(3));
        assert_eq!(dict.doc_frequency(1), Some(2));
        assert_eq!(dict.num_docs(), 4);
    }

    #[test]
    fn doc2bow_counts_and_sorts() {
        let dict = Dictionary::from_documents(&docs());
        assert_eq!(dict.doc2bow(&["stock", "rally", "stock", "unknown"]), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn filter_extremes_prunes_and_renumbers() {
        let mut dict = Dictionary::from_documents(&docs());
        // no_above 0.5 of 4 docs → df <= 2; no_below 2 → df >= 2
        dict.filter_extremes(2, 0.5, None);
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.token_id("bond"), None);
        assert_eq!(dict.token_id("rally"), Some(0));
        assert_eq!(dict.token_id("oil"), Some(2));
    }

    #[test]
    fn keep_n_keeps_most_frequent() {
        let mut dict = Dictionary::from_documents(&[
            vec!["a", "b", "c"],
            vec!["b", "c"],
            vec!["c"],
        ]);
        dict.filter_extremes(1, 1.0, Some(2));
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.token_id("a"), None);
        assert_eq!(dict.token_id("b"), Some(0));
        assert_eq!(dict.token_id("c"), Some(1));
    }

    #[test]
    fn pruned_document_is_empty_vector() {
        let mut dict = Dictionary::from_documents(&docs());
        dict.filter_extremes(2, 0.5, None);
        assert!(dict.doc2bow(&["bond"]).is_empty());
    }
}
