//! # Passage Store
//!
//! A small TF-IDF retrieval engine for scraped public-service content.
//!
//! This library provides:
//! - Unicode word tokenization with unigram/bigram terms
//! - A TF-IDF vectorizer with a frozen, persisted vocabulary
//! - Exhaustive cosine-similarity ranking over a flat weight matrix
//! - A single-file snapshot format that reloads to identical results
//!
//! ## Example
//!
//! ```rust
//! use passage_store::DocumentStore;
//! use serde_json::json;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut store = DocumentStore::initialize(dir.path());
//!
//! store.add_documents(&[
//!     json!({"content": "đăng ký khai sinh cho trẻ em", "title": "Khai sinh"}),
//!     json!({"content": "thủ tục đăng ký kết hôn", "title": "Kết hôn"}),
//! ], "doc").unwrap();
//!
//! let results = store.search("khai sinh", 5, 0.1).unwrap();
//! assert_eq!(results[0].metadata.get("title"), Some("Khai sinh"));
//! ```

pub mod corpus;
pub mod distance;
pub mod document;
pub mod error;
pub mod flat_index;
pub mod persistence;
pub mod storage;
pub mod tokenizer;
pub mod vector;
pub mod vectorizer;

pub use document::{Document, IngestLimits, Metadata};
pub use error::{Result, StoreError};
pub use flat_index::FlatIndex;
pub use storage::{DocumentStore, SearchResult, StoreConfig};
pub use vector::SparseVector;
pub use vectorizer::{DocFrequency, TfidfVectorizer, VectorizerConfig};
