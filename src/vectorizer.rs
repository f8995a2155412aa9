//! TF-IDF vectorizer: vocabulary selection and inverse-document-frequency weighting.
//!
//! Fitting follows the usual smoothed TF-IDF recipe:
//! - raw term counts per document (unigrams and bigrams by default)
//! - document-frequency pruning with `min_df` / `max_df`
//! - optional cap on vocabulary size by total corpus count
//! - `idf(t) = ln((1 + n) / (1 + df(t))) + 1`
//! - rows are `count × idf`, L2-normalized
//!
//! Columns are assigned in lexicographic term order, so a refit over the same
//! corpus always yields the same column space.

use crate::error::{Result, StoreError};
use crate::tokenizer;
use crate::vector::SparseVector;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A document-frequency bound, either absolute or relative to corpus size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DocFrequency {
    /// Absolute number of documents
    Count(usize),
    /// Fraction of the corpus, in `(0, 1]`
    Proportion(f64),
}

impl DocFrequency {
    /// Resolve the bound to a document count for a corpus of `n_docs`.
    pub fn resolve(&self, n_docs: usize) -> f64 {
        match *self {
            DocFrequency::Count(count) => count as f64,
            DocFrequency::Proportion(p) => p * n_docs as f64,
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if let DocFrequency::Proportion(p) = *self {
            if !(p > 0.0 && p <= 1.0) {
                return Err(StoreError::InvalidConfig {
                    reason: format!("{name} proportion must lie in (0, 1], got {p}"),
                });
            }
        }
        Ok(())
    }
}

/// Configuration for term selection and weighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Keep at most this many terms, by total corpus count.
    pub max_features: Option<usize>,
    /// Inclusive n-gram lengths to extract.
    pub ngram_range: (usize, usize),
    /// Drop terms seen in fewer documents than this.
    pub min_df: DocFrequency,
    /// Drop terms seen in more documents than this.
    pub max_df: DocFrequency,
    /// Case-fold text before tokenizing.
    pub lowercase: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            max_features: Some(10_000),
            ngram_range: (1, 2),
            min_df: DocFrequency::Count(1),
            max_df: DocFrequency::Proportion(0.99),
            lowercase: true,
        }
    }
}

impl VectorizerConfig {
    /// Check that the configuration describes a usable vectorizer.
    pub fn validate(&self) -> Result<()> {
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(StoreError::InvalidConfig {
                reason: format!("invalid ngram_range ({min_n}, {max_n})"),
            });
        }
        if self.max_features == Some(0) {
            return Err(StoreError::InvalidConfig {
                reason: "max_features must be positive".to_string(),
            });
        }
        self.min_df.validate("min_df")?;
        self.max_df.validate("max_df")?;
        Ok(())
    }
}

/// A TF-IDF model with a frozen vocabulary once fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: VectorizerConfig,
    /// term -> column
    vocabulary: HashMap<String, usize>,
    /// One weight per column; `None` until fitted.
    idf: Option<Array1<f32>>,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self {
            config: VectorizerConfig::default(),
            vocabulary: HashMap::new(),
            idf: None,
        }
    }
}

impl TfidfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: VectorizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            vocabulary: HashMap::new(),
            idf: None,
        })
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.idf.is_some()
    }

    /// Number of columns in the fitted space (0 when unfitted).
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    /// Column of a term, if it is in the vocabulary.
    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Terms in column order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = vec![String::new(); self.vocabulary.len()];
        for (term, &col) in &self.vocabulary {
            names[col] = term.clone();
        }
        names
    }

    /// Per-column idf weights, when fitted.
    pub fn idf(&self) -> Option<&Array1<f32>> {
        self.idf.as_ref()
    }

    /// Drop the fitted state, keeping the configuration.
    pub fn reset(&mut self) {
        self.vocabulary.clear();
        self.idf = None;
    }

    fn term_counts(&self, text: &str) -> HashMap<String, u32> {
        let mut counts = HashMap::new();
        for term in tokenizer::analyze(text, self.config.lowercase, self.config.ngram_range) {
            *counts.entry(term).or_insert(0) += 1;
        }
        counts
    }

    /// Learn vocabulary and idf from `documents` and return their weight rows.
    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Vec<SparseVector>> {
        let n_docs = documents.len();
        let doc_counts: Vec<HashMap<String, u32>> = documents
            .iter()
            .map(|d| self.term_counts(d.as_ref()))
            .collect();

        let mut df: HashMap<&str, usize> = HashMap::new();
        let mut totals: HashMap<&str, u64> = HashMap::new();
        for counts in &doc_counts {
            for (term, &count) in counts {
                *df.entry(term.as_str()).or_insert(0) += 1;
                *totals.entry(term.as_str()).or_insert(0) += u64::from(count);
            }
        }

        let min_doc_count = self.config.min_df.resolve(n_docs);
        let mut max_doc_count = self.config.max_df.resolve(n_docs);
        // A relative upper bound can fall below the lower bound on tiny corpora.
        if max_doc_count < min_doc_count {
            max_doc_count = n_docs as f64;
        }

        let mut kept: Vec<&str> = df
            .iter()
            .filter(|&(_, &d)| d as f64 >= min_doc_count && d as f64 <= max_doc_count)
            .map(|(&term, _)| term)
            .collect();
        kept.sort_unstable();

        if let Some(limit) = self.config.max_features {
            if kept.len() > limit {
                // Stable sort keeps lexicographic order among equal totals.
                kept.sort_by(|a, b| totals[b].cmp(&totals[a]));
                kept.truncate(limit);
                kept.sort_unstable();
            }
        }

        let n = n_docs as f64;
        let idf: Array1<f32> = kept
            .iter()
            .map(|term| (((1.0 + n) / (1.0 + df[term] as f64)).ln() + 1.0) as f32)
            .collect();

        self.vocabulary = kept
            .iter()
            .enumerate()
            .map(|(col, term)| (term.to_string(), col))
            .collect();
        self.idf = Some(idf);

        doc_counts.iter().map(|counts| self.weigh(counts)).collect()
    }

    /// Project text into the fitted column space. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> Result<SparseVector> {
        if !self.is_fitted() {
            return Err(StoreError::NotFitted);
        }
        self.weigh(&self.term_counts(text))
    }

    fn weigh(&self, counts: &HashMap<String, u32>) -> Result<SparseVector> {
        let idf = self.idf.as_ref().ok_or(StoreError::NotFitted)?;
        let pairs = counts
            .iter()
            .filter_map(|(term, &count)| {
                self.vocabulary
                    .get(term)
                    .map(|&col| (col as u32, count as f32))
            })
            .collect();
        let mut row = SparseVector::from_pairs(self.dimension(), pairs)?;
        row.scale_columns(idf)?;
        row.normalize();
        Ok(row)
    }
}
