use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::CatalogError;

/// Columns every catalog source must provide. `image_url` is optional and
/// degrades to "no image" when the column or the value is absent.
pub const REQUIRED_COLUMNS: [&str; 6] =
    ["name", "category", "description", "fit_type", "stretch", "fit_advice"];

const IMAGE_COLUMN: &str = "image_url";

/// One garment row, immutable once loaded. Every textual field is trimmed
/// at load time; unstripped whitespace breaks substring matching and image
/// rendering downstream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub category: String,
    pub description: String,
    pub fit_type: String,
    pub stretch: String,
    pub fit_advice: String,
    pub image_url: Option<String>,
}

impl CatalogEntry {
    /// Lower-cased text the scorer searches. The name appears twice so
    /// title matches outrank body matches.
    pub fn searchable_text(&self) -> String {
        format!("{} {} {} {}", self.name, self.name, self.category, self.description)
            .to_lowercase()
    }
}

/// Read-only product catalog, loaded once per process lifetime.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Builds a catalog from already-parsed entries, applying the same
    /// dedupe rule as file loading: identical names are the same product,
    /// the last row wins, and the entry keeps its first position.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut deduped: Vec<CatalogEntry> = Vec::with_capacity(entries.len());
        let mut positions: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            if entry.name.is_empty() {
                continue;
            }
            match positions.get(&entry.name) {
                Some(&index) => deduped[index] = entry,
                None => {
                    positions.insert(entry.name.clone(), deduped.len());
                    deduped.push(entry);
                }
            }
        }

        Self { entries: deduped }
    }

    /// Loads a CSV catalog from disk. Fails only when the source cannot be
    /// read or is structurally invalid; an empty but well-formed source
    /// yields an empty, non-error catalog.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|source| CatalogError::Unavailable { path: path.to_path_buf(), source })?;
        Self::from_csv(reader, path)
    }

    /// Loads a CSV catalog from any reader. `source_label` is the path name
    /// used in error messages.
    pub fn from_reader(reader: impl Read, source_label: &str) -> Result<Self, CatalogError> {
        let csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        Self::from_csv(csv_reader, Path::new(source_label))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>, path: &Path) -> Result<Self, CatalogError> {
        let headers = reader
            .headers()
            .map_err(|source| CatalogError::Unavailable { path: path.to_path_buf(), source })?
            .clone();

        let mut columns: HashMap<&str, usize> = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            columns.entry(header).or_insert(index);
        }
        for column in REQUIRED_COLUMNS {
            if !columns.contains_key(column) {
                return Err(CatalogError::MissingColumn { path: path.to_path_buf(), column });
            }
        }
        let image_index = columns.get(IMAGE_COLUMN).copied();

        let mut entries = Vec::new();
        for (row_number, record) in reader.records().enumerate() {
            let record = record.map_err(|source| CatalogError::MalformedRow {
                path: path.to_path_buf(),
                message: format!("row {}: {source}", row_number + 1),
            })?;

            let field = |column: &str| -> String {
                columns
                    .get(column)
                    .and_then(|&index| record.get(index))
                    .unwrap_or_default()
                    .to_string()
            };

            let image_url = image_index
                .and_then(|index| record.get(index))
                .filter(|value| !value.is_empty())
                .map(str::to_string);

            entries.push(CatalogEntry {
                name: field("name"),
                category: field("category"),
                description: field("description"),
                fit_type: field("fit_type"),
                stretch: field("stretch"),
                fit_advice: field("fit_advice"),
                image_url,
            });
        }

        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn first(&self) -> Option<&CatalogEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
