//! Persistent document store with TF-IDF retrieval

use crate::document::{Document, IngestLimits, Metadata, Rejection};
use crate::error::Result;
use crate::flat_index::FlatIndex;
use crate::persistence::{SnapshotManager, StoreSnapshot};
use crate::vectorizer::{TfidfVectorizer, VectorizerConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default number of results for [`DocumentStore::search_default`].
pub const DEFAULT_MAX_RESULTS: usize = 5;
/// Default relevance floor for [`DocumentStore::search_default`].
pub const DEFAULT_MIN_SCORE: f32 = 0.1;

/// A search result containing a copy of the matched document and its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    /// Cosine similarity rounded to 3 decimal places
    pub score: f32,
}

/// Configuration for a [`DocumentStore`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreConfig {
    /// Term selection and weighting. Ignored when a persisted store is
    /// loaded, since the persisted vectorizer carries its own.
    pub vectorizer: VectorizerConfig,
    pub limits: IngestLimits,
}

/// Document store holding the corpus, the fitted vectorizer and the weight matrix.
///
/// Writes (`add_documents`, `append_documents`, `rebuild`, `clear`) take
/// `&mut self`; reads take `&self`. Callers sharing a store across threads
/// must put it behind a lock.
#[derive(Debug)]
pub struct DocumentStore {
    documents: Vec<Document>,
    vectorizer: TfidfVectorizer,
    matrix: FlatIndex,
    snapshots: SnapshotManager,
    limits: IngestLimits,
    /// Appended documents were projected into an old vocabulary.
    stale: bool,
    /// In-memory state has not reached disk.
    dirty: bool,
}

impl DocumentStore {
    /// Open the store persisted under `dir`, or start empty.
    ///
    /// A missing or unreadable snapshot is logged and treated as no snapshot.
    pub fn initialize(dir: impl AsRef<Path>) -> Self {
        Self::with_config(dir, StoreConfig::default())
    }

    /// Like [`initialize`](Self::initialize) with explicit configuration.
    ///
    /// An invalid vectorizer configuration falls back to the default one.
    pub fn with_config(dir: impl AsRef<Path>, config: StoreConfig) -> Self {
        let dir = dir.as_ref();
        match Self::open_strict(dir, config.clone()) {
            Ok(store) => store,
            Err(e) => {
                warn!("Error loading index from {}: {}", dir.display(), e);
                let vectorizer =
                    TfidfVectorizer::new(config.vectorizer).unwrap_or_default();
                Self::empty(SnapshotManager::new(dir), vectorizer, config.limits)
            }
        }
    }

    /// Open the store persisted under `dir`, returning any load error.
    pub fn open_strict(dir: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
        let snapshots = SnapshotManager::new(dir);
        let vectorizer = TfidfVectorizer::new(config.vectorizer)?;

        match snapshots.load()? {
            Some(snapshot) => {
                info!("Loaded {} documents from index", snapshot.documents.len());
                Ok(Self {
                    documents: snapshot.documents,
                    vectorizer: snapshot.vectorizer,
                    matrix: snapshot.matrix,
                    snapshots,
                    limits: config.limits,
                    stale: snapshot.stale,
                    dirty: false,
                })
            }
            None => Ok(Self::empty(snapshots, vectorizer, config.limits)),
        }
    }

    fn empty(snapshots: SnapshotManager, vectorizer: TfidfVectorizer, limits: IngestLimits) -> Self {
        Self {
            documents: Vec::new(),
            vectorizer,
            matrix: FlatIndex::new(0),
            snapshots,
            limits,
            stale: false,
            dirty: false,
        }
    }

    /// Ingest a batch of records, refit the whole model, and persist.
    ///
    /// Records that are not objects or whose `content` is missing or shorter
    /// than the configured minimum are skipped. Returns the number of
    /// documents added. If saving fails the documents stay in memory, the
    /// store is marked dirty, and the error is returned.
    pub fn add_documents(&mut self, records: &[Value], id_prefix: &str) -> Result<usize> {
        let added = self.ingest(records, id_prefix);
        if added > 0 {
            self.refit()?;
            self.persist()?;
        }
        info!("Added {} documents. Total: {}", added, self.documents.len());
        Ok(added)
    }

    /// Ingest a batch of records without refitting.
    ///
    /// New documents are projected into the current vocabulary with the
    /// current idf weights, so their scores are stale until [`rebuild`]
    /// runs. An unfitted store is fitted in full instead.
    ///
    /// [`rebuild`]: Self::rebuild
    pub fn append_documents(&mut self, records: &[Value], id_prefix: &str) -> Result<usize> {
        let first_new = self.documents.len();
        let added = self.ingest(records, id_prefix);
        if added == 0 {
            return Ok(0);
        }

        if self.vectorizer.is_fitted() {
            for doc in &self.documents[first_new..] {
                let row = self.vectorizer.transform(&doc.content)?;
                self.matrix.push(row)?;
            }
            self.stale = true;
        } else {
            self.refit()?;
        }
        self.persist()?;
        info!(
            "Appended {} documents without refit. Total: {}",
            added,
            self.documents.len()
        );
        Ok(added)
    }

    /// Refit vocabulary, idf and matrix over the whole corpus, and persist.
    pub fn rebuild(&mut self) -> Result<()> {
        if self.documents.is_empty() {
            return Ok(());
        }
        self.refit()?;
        self.persist()?;
        info!("Rebuilt index over {} documents", self.documents.len());
        Ok(())
    }

    fn ingest(&mut self, records: &[Value], id_prefix: &str) -> usize {
        let mut added = 0;
        for record in records {
            let id = format!("{}_{}", id_prefix, self.documents.len());
            match Document::from_record(id, record, &self.limits) {
                Ok(doc) => {
                    self.documents.push(doc);
                    added += 1;
                }
                Err(reason) => log_rejection(reason),
            }
        }
        added
    }

    fn refit(&mut self) -> Result<()> {
        let texts: Vec<&str> = self.documents.iter().map(|d| d.content.as_str()).collect();
        let rows = self.vectorizer.fit_transform(&texts)?;
        self.matrix = FlatIndex::from_rows(self.vectorizer.dimension(), rows)?;
        self.stale = false;
        debug!(
            "Fitted {} terms over {} documents",
            self.vectorizer.dimension(),
            self.documents.len()
        );
        Ok(())
    }

    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            documents: self.documents.clone(),
            vectorizer: self.vectorizer.clone(),
            matrix: self.matrix.clone(),
            stale: self.stale,
        }
    }

    fn persist(&mut self) -> Result<()> {
        match self.snapshots.save(&self.snapshot()) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                Err(e)
            }
        }
    }

    /// Save the store if a previous save failed.
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.persist()?;
        }
        Ok(())
    }

    /// Rank documents against `query`.
    ///
    /// Returns at most `max_results` results with score at least `min_score`,
    /// best first. An empty or unfitted store yields no results.
    pub fn search(&self, query: &str, max_results: usize, min_score: f32) -> Result<Vec<SearchResult>> {
        if self.documents.is_empty() || !self.vectorizer.is_fitted() {
            return Ok(vec![]);
        }

        let query_vec = self.vectorizer.transform(query)?;
        let ranked = self.matrix.search(&query_vec, max_results)?;

        let results = ranked
            .into_iter()
            .filter(|&(_, score)| score >= min_score)
            .filter_map(|(position, score)| {
                self.documents.get(position).map(|doc| SearchResult {
                    id: doc.id.clone(),
                    content: doc.content.clone(),
                    metadata: doc.metadata.clone(),
                    score: round_score(score),
                })
            })
            .collect();

        Ok(results)
    }

    /// Search with the default result count and relevance floor.
    pub fn search_default(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.search(query, DEFAULT_MAX_RESULTS, DEFAULT_MIN_SCORE)
    }

    /// Drop every document, unfit the vectorizer, and delete the snapshot file.
    pub fn clear(&mut self) -> Result<()> {
        self.documents.clear();
        self.vectorizer.reset();
        self.matrix = FlatIndex::new(0);
        self.stale = false;
        self.dirty = false;
        self.snapshots.remove()?;
        info!("Store cleared.");
        Ok(())
    }

    /// Get the number of documents in the store
    pub fn count(&self) -> usize {
        self.documents.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents in insertion order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// The fitted (or unfitted) vectorizer
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        self.snapshots.path()
    }

    /// Whether appended documents are waiting for a rebuild
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Whether in-memory state is ahead of the snapshot on disk
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

fn log_rejection(reason: Rejection) {
    match reason {
        Rejection::NotAnObject => debug!("Skipping record: not an object"),
        Rejection::MissingContent => debug!("Skipping record: missing content"),
        Rejection::ContentTooShort { chars } => {
            debug!("Skipping record: content too short ({} chars)", chars)
        }
    }
}

fn round_score(score: f32) -> f32 {
    ((f64::from(score) * 1000.0).round() / 1000.0) as f32
}
