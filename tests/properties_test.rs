//! Property tests: ranking contracts that must hold for any corpus.

use passage_store::DocumentStore;
use proptest::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

const WORDS: &[&str] = &[
    "đăng", "ký", "khai", "sinh", "kết", "hôn", "thủ", "tục", "hộ", "tịch", "cư", "trú", "giấy",
    "tờ", "xã", "công", "dân", "chứng", "thực", "bản", "sao",
];

fn sentence() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 1..12).prop_map(|w| w.join(" "))
}

fn corpus() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(sentence(), 1..12)
}

fn to_records(texts: &[String]) -> Vec<Value> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| json!({"content": t, "title": format!("T{i}")}))
        .collect()
}

fn accepted(texts: &[String]) -> usize {
    texts.iter().filter(|t| t.chars().count() >= 20).count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn count_grows_by_accepted_records(first in corpus(), second in corpus()) {
        let dir = TempDir::new().unwrap();
        let mut store = DocumentStore::initialize(dir.path());

        let added = store.add_documents(&to_records(&first), "doc").unwrap();
        prop_assert_eq!(added, accepted(&first));
        prop_assert_eq!(store.count(), added);

        let before = store.count();
        let added = store.add_documents(&to_records(&second), "doc").unwrap();
        prop_assert_eq!(added, accepted(&second));
        prop_assert_eq!(store.count(), before + added);
    }

    #[test]
    fn results_respect_bounds_and_order(texts in corpus(), query in sentence(), k in 0usize..8, min_score in 0.0f32..1.0) {
        let dir = TempDir::new().unwrap();
        let mut store = DocumentStore::initialize(dir.path());
        store.add_documents(&to_records(&texts), "doc").unwrap();

        let results = store.search(&query, k, min_score).unwrap();
        prop_assert!(results.len() <= k);
        for r in &results {
            prop_assert!((0.0..=1.0).contains(&r.score));
            // Filtering uses the unrounded score.
            prop_assert!(r.score >= min_score - 0.0005 - 1e-6);
        }
        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn raising_min_score_never_adds_results(texts in corpus(), query in sentence(), low in 0.0f32..0.5, delta in 0.0f32..0.5) {
        let dir = TempDir::new().unwrap();
        let mut store = DocumentStore::initialize(dir.path());
        store.add_documents(&to_records(&texts), "doc").unwrap();

        let loose = store.search(&query, 10, low).unwrap();
        let strict = store.search(&query, 10, low + delta).unwrap();
        prop_assert!(strict.len() <= loose.len());
    }

    #[test]
    fn reload_preserves_results(texts in corpus(), queries in prop::collection::vec(sentence(), 1..5)) {
        let dir = TempDir::new().unwrap();
        let mut store = DocumentStore::initialize(dir.path());
        store.add_documents(&to_records(&texts), "doc").unwrap();

        let reloaded = DocumentStore::initialize(dir.path());
        prop_assert_eq!(reloaded.count(), store.count());
        for q in &queries {
            prop_assert_eq!(store.search(q, 20, 0.0).unwrap(), reloaded.search(q, 20, 0.0).unwrap());
        }
    }

    #[test]
    fn clear_always_empties(texts in corpus(), query in sentence()) {
        let dir = TempDir::new().unwrap();
        let mut store = DocumentStore::initialize(dir.path());
        store.add_documents(&to_records(&texts), "doc").unwrap();
        store.clear().unwrap();

        prop_assert_eq!(store.count(), 0);
        prop_assert!(store.search(&query, 5, 0.0).unwrap().is_empty());
        prop_assert!(!store.path().exists());
    }
}
