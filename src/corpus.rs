//! Loading scraped site data into ingestion records

use crate::error::{Result, StoreError};
use crate::storage::DocumentStore;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tracing::info;

/// Scraped pages of the commune's main site.
pub const MAINSITE_FILE: &str = "diensanh_pages.json";
/// Scraped public-service procedures.
pub const PROCEDURES_FILE: &str = "dichvucong_procedures.json";

#[derive(Debug, Default, Deserialize)]
struct PagesFile {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Page {
    content: Option<String>,
    status: Option<String>,
    title: Option<String>,
    url: Option<String>,
    page_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ProceduresFile {
    #[serde(default)]
    procedures: Vec<Procedure>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Procedure {
    title: Option<String>,
    url: Option<String>,
    implementing: Option<String>,
    field: Option<String>,
    code: Option<String>,
    detail: Option<ProcedureDetail>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProcedureDetail {
    full_content: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    info!("Loading {}...", path.display());
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StoreError::SerializationError(format!("{}: {}", path.display(), e)))
}

fn page_record(page: &Page) -> Option<Value> {
    let content = non_empty(&page.content)?;
    if page.status.as_deref() != Some("success") {
        return None;
    }
    Some(json!({
        "content": content,
        "title": page.title.as_deref().unwrap_or(""),
        "url": page.url.as_deref().unwrap_or(""),
        "source": "main_site",
        "page_name": page.page_name.as_deref().unwrap_or(""),
    }))
}

fn procedure_record(procedure: &Procedure) -> Option<Value> {
    let mut parts = Vec::new();
    if let Some(title) = non_empty(&procedure.title) {
        parts.push(format!("Thủ tục: {title}"));
    }
    if let Some(implementing) = non_empty(&procedure.implementing) {
        parts.push(format!("Cơ quan thực hiện: {implementing}"));
    }
    if let Some(field) = non_empty(&procedure.field) {
        parts.push(format!("Lĩnh vực: {field}"));
    }
    if let Some(code) = non_empty(&procedure.code) {
        parts.push(format!("Mã thủ tục: {code}"));
    }
    if let Some(full) = procedure
        .detail
        .as_ref()
        .and_then(|detail| non_empty(&detail.full_content))
    {
        parts.push(full.to_string());
    }
    if parts.is_empty() {
        return None;
    }

    Some(json!({
        "content": parts.join("\n"),
        "title": procedure.title.as_deref().unwrap_or(""),
        "url": procedure.url.as_deref().unwrap_or(""),
        "source": "dichvucong",
        "procedure_type": "public_service",
    }))
}

/// Load every scraped file under `data_dir` into ingestion records.
///
/// Missing files are skipped; a file that is present but malformed is an error.
pub fn load_scraped_data(data_dir: impl AsRef<Path>) -> Result<Vec<Value>> {
    let data_dir = data_dir.as_ref();
    let mut records = Vec::new();

    if let Some(file) = read_json::<PagesFile>(&data_dir.join(MAINSITE_FILE))? {
        records.extend(file.pages.iter().filter_map(page_record));
    }
    if let Some(file) = read_json::<ProceduresFile>(&data_dir.join(PROCEDURES_FILE))? {
        records.extend(file.procedures.iter().filter_map(procedure_record));
    }

    info!("Loaded {} documents total", records.len());
    Ok(records)
}

/// Rebuild the store under `index_dir` from the scraped data in `data_dir`.
///
/// Returns `None` when there is nothing to index.
pub fn build_index(
    data_dir: impl AsRef<Path>,
    index_dir: impl AsRef<Path>,
) -> Result<Option<DocumentStore>> {
    let records = load_scraped_data(data_dir)?;
    if records.is_empty() {
        info!("No documents found. Run scrapers first.");
        return Ok(None);
    }

    let mut store = DocumentStore::initialize(index_dir);
    store.clear()?;
    store.add_documents(&records, "doc")?;
    Ok(Some(store))
}
