use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cloudflare::types::NewRecord;

/// Page size the record listing asks for; large enough that typical zones fit
/// in one response.
pub const DEFAULT_RECORDS_PER_PAGE: u32 = 5000;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub records_per_page: u32,
    /// Records created by a bulk add that does not name its own.
    pub bulk_template: Vec<NewRecord>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            records_per_page: DEFAULT_RECORDS_PER_PAGE,
            bulk_template: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BulkTemplateFile {
    #[serde(default)]
    records: Vec<NewRecord>,
}

/// Parse a bulk template: a list of `[[records]]` tables.
pub fn parse_bulk_template(content: &str) -> Result<Vec<NewRecord>> {
    let file: BulkTemplateFile = toml::from_str(content)?;
    Ok(file.records)
}

pub fn load_bulk_template<P: AsRef<Path>>(path: P) -> Result<Vec<NewRecord>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read bulk template: {}", path.display()))?;
    parse_bulk_template(&content)
        .with_context(|| format!("failed to parse bulk template: {}", path.display()))
}
