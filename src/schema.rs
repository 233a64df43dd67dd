//! Schema documents and loading

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{CodegenError, Result};
use crate::guard::{assure, is, DocumentHeader, LexiconMarker, SerdeValidator};

/// A schema document identified by its namespaced id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Dotted identifier (e.g., "com.example.getThing")
    pub id: String,
    /// The full document as loaded
    pub body: Value,
}

impl SchemaDocument {
    pub fn new(id: impl Into<String>, body: Value) -> Self {
        Self { id: id.into(), body }
    }

    /// Build a document from its JSON, taking the id from the `id` field
    pub fn from_value(body: Value) -> Result<Self> {
        let header = assure(&SerdeValidator::<DocumentHeader>::new())(&body)?;
        Ok(Self::new(header.id, body))
    }
}

/// Load every lexicon document under `dir`.
///
/// Files are visited in file-name order so the result is stable across
/// platforms. JSON files without a `lexicon` field are skipped.
pub fn load_documents(dir: &Path, skip_prefixes: &[String]) -> Result<Vec<SchemaDocument>> {
    let marker = SerdeValidator::<LexiconMarker>::new();
    let header = SerdeValidator::<DocumentHeader>::new();
    let read_header = assure(&header);
    let mut docs = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }

        let relative = path.strip_prefix(dir).unwrap_or(path).to_string_lossy().replace('\\', "/");
        if skip_prefixes.iter().any(|p| relative.starts_with(p.as_str())) {
            continue;
        }

        let content = fs::read_to_string(path)?;
        let body: Value = serde_json::from_str(&content)
            .map_err(|e| CodegenError::InvalidFormat(format!("{}: {}", relative, e)))?;

        if !is(&body, &marker) {
            warn!(file = %relative, "skipping JSON without a lexicon version");
            continue;
        }

        let id = read_header(&body)
            .map_err(|failure| CodegenError::Validation(format!("{}: {}", relative, failure)))?
            .id;
        debug!(file = %relative, %id, "loaded document");
        docs.push(SchemaDocument::new(id, body));
    }

    Ok(docs)
}
