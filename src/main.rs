//! CLI interface for the passage store

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use passage_store::persistence::snapshot::FORMAT_VERSION;
use passage_store::{corpus, DocumentStore, SearchResult, StoreConfig};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "passage-store")]
#[command(about = "A TF-IDF passage retrieval store", long_about = None)]
struct Cli {
    /// Directory holding the persisted index
    #[arg(long, default_value = "./data/vector_store")]
    index_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the index from scraped JSON files
    Build {
        /// Directory containing the scraped JSON files
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },
    /// Add records from a JSON file (an array of objects with a "content" field)
    Ingest {
        /// Path to the JSON file
        file: PathBuf,
        /// Prefix for assigned document IDs
        #[arg(long, default_value = "doc")]
        prefix: String,
        /// Project into the existing vocabulary instead of refitting
        #[arg(long)]
        append: bool,
    },
    /// Refit the index over all stored documents
    Rebuild,
    /// Search for relevant passages
    Search {
        /// Free-text query
        query: String,
        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        k: usize,
        /// Minimum similarity score (0-1)
        #[arg(long, default_value = "0.1")]
        min_score: f32,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the number of indexed documents
    Count,
    /// Delete every document and the persisted index
    Clear,
    /// Load the index strictly and print a summary
    Inspect,
}

fn print_results(query: &str, results: &[SearchResult]) {
    if results.is_empty() {
        println!("No results found for: {}", query);
        return;
    }
    println!("Search results for: {}\n", query);
    for result in results {
        let title = result.metadata.get("title").unwrap_or("No title");
        println!("[{:.3}] {} ({})", result.score, truncate(title, 60), result.id);
        println!("    {}...", truncate(&result.content, 200));
        println!();
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

fn read_records(path: &Path) -> Result<Vec<Value>> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value =
        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))?;
    match value {
        Value::Array(records) => Ok(records),
        other => Ok(vec![other]),
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build { data_dir } => match corpus::build_index(&data_dir, &cli.index_dir)? {
            Some(store) => println!("Indexed {} documents into {}", store.count(), store.path().display()),
            None => println!("No documents found in {}. Run scrapers first.", data_dir.display()),
        },
        Commands::Ingest {
            file,
            prefix,
            append,
        } => {
            let records = read_records(&file)?;
            let mut store = DocumentStore::initialize(&cli.index_dir);
            let added = if append {
                store.append_documents(&records, &prefix)?
            } else {
                store.add_documents(&records, &prefix)?
            };
            println!("Added {} of {} records. Total: {}", added, records.len(), store.count());
        }
        Commands::Rebuild => {
            let mut store = DocumentStore::initialize(&cli.index_dir);
            store.rebuild()?;
            println!("Rebuilt index over {} documents", store.count());
        }
        Commands::Search {
            query,
            k,
            min_score,
            json,
        } => {
            let store = DocumentStore::initialize(&cli.index_dir);
            let results = store.search(&query, k, min_score)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&query, &results);
            }
        }
        Commands::Count => {
            let store = DocumentStore::initialize(&cli.index_dir);
            println!("{}", store.count());
        }
        Commands::Clear => {
            let mut store = DocumentStore::initialize(&cli.index_dir);
            store.clear()?;
            println!("Store cleared.");
        }
        Commands::Inspect => {
            let store = DocumentStore::open_strict(&cli.index_dir, StoreConfig::default())
                .with_context(|| format!("loading index from {}", cli.index_dir.display()))?;
            println!("Snapshot:    {} (format v{})", store.path().display(), FORMAT_VERSION);
            println!("Documents:   {}", store.count());
            let config = store.vectorizer().config();
            println!("Vocabulary:  {} terms", store.vectorizer().dimension());
            println!(
                "Config:      ngram_range={:?} min_df={:?} max_df={:?} max_features={:?} lowercase={}",
                config.ngram_range, config.min_df, config.max_df, config.max_features, config.lowercase
            );
            println!("Fitted:      {}", store.vectorizer().is_fitted());
            println!("Stale:       {}", store.is_stale());
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "passage_store=debug"
    } else {
        "passage_store=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(cli)
}
