use std::path::Path;

use anyhow::{bail, Context, Result};
use kisan_knowledge::{EntryRecord, KnowledgeStore};
use serde_json::Value;

/// Load a corpus file: a JSON array of records, or a JSON/TOML document with
/// an `entries` array. Malformed and invalid records are skipped with a warning.
pub fn load(path: &Path) -> Result<KnowledgeStore> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read corpus file {}", path.display()))?;
    parse(&bytes).with_context(|| format!("Invalid corpus file {}", path.display()))
}

pub fn parse(bytes: &[u8]) -> Result<KnowledgeStore> {
    let value = kisan_text::document::parse_value(bytes)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("entries") {
            Some(Value::Array(items)) => items,
            Some(_) => bail!("`entries` must be an array"),
            None => bail!("Corpus document has no `entries` array"),
        },
        _ => bail!("Corpus must be an array of entries or a document with `entries`"),
    };

    let total = items.len();
    let records: Vec<EntryRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("Skipping malformed corpus record #{index}: {err}");
                None
            }
        })
        .collect();
    let malformed = total - records.len();

    let report = KnowledgeStore::load(records);
    if malformed + report.skipped.len() > 0 {
        log::warn!(
            "Corpus: {} of {total} records skipped",
            malformed + report.skipped.len()
        );
    }
    Ok(report.store)
}
