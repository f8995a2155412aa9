//! Benchmarks for index building and search

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use passage_store::{DocumentStore, TfidfVectorizer, VectorizerConfig};
use rand::seq::SliceRandom;
use serde_json::{json, Value};

const WORDS: &[&str] = &[
    "đăng", "ký", "khai", "sinh", "kết", "hôn", "thủ", "tục", "hộ", "tịch", "cư", "trú", "giấy",
    "tờ", "xã", "công", "dân", "chứng", "thực", "bản", "sao", "hồ", "sơ", "nộp", "ủy", "ban",
    "nhân", "lệ", "phí", "thời", "hạn", "giải", "quyết", "kết", "quả", "mẫu", "đơn",
];

fn random_texts(n: usize, words_per_doc: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|_| {
            (0..words_per_doc)
                .map(|_| *WORDS.choose(&mut rng).unwrap_or(&"xã"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn records(texts: &[String]) -> Vec<Value> {
    texts.iter().map(|t| json!({"content": t})).collect()
}

fn benchmark_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");

    for size in [100, 1000].iter() {
        let texts = random_texts(*size, 80);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut v = TfidfVectorizer::new(VectorizerConfig::default()).unwrap();
                v.fit_transform(black_box(&texts)).unwrap()
            });
        });
    }

    group.finish();
}

fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [100, 1000, 5000].iter() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DocumentStore::initialize(dir.path());
        store.add_documents(&records(&random_texts(*size, 80)), "doc").unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                store
                    .search(black_box("thủ tục đăng ký khai sinh"), black_box(5), 0.1)
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_fit, benchmark_search);
criterion_main!(benches);
