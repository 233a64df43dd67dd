//! Generation Orchestrator
//!
//! Runs one artifact through its lifecycle:
//!
//! ```text
//! SourceBuilder -> populate -> persist (temp file) -> read back -> format -> banner
//! ```
//!
//! Each call owns its buffer and temp file, so separate paths can be
//! generated in parallel. Errors from the populate step or the formatter are
//! returned unchanged and no artifact is produced.

use std::fs;
use std::io::Write;

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, debug_span};

use super::format::{format_source, BANNER};
use super::source::{SourceBuilder, SourceFile};
use crate::checksum::Checksum;
use crate::error::{CodegenError, Result};

/// A generated file, ready to be written by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub path: String,
    pub content: String,
}

impl GeneratedArtifact {
    /// SHA256 of the content
    pub fn checksum(&self) -> Checksum {
        Checksum::compute(&self.content)
    }
}

/// Generate one artifact at `path` from the declarations `populate` appends.
pub fn generate<F>(path: &str, populate: F) -> Result<GeneratedArtifact>
where
    F: FnOnce(&mut SourceBuilder) -> Result<()>,
{
    let span = debug_span!("generate", path);
    let _enter = span.enter();

    let mut builder = SourceBuilder::new(path);
    populate(&mut builder)?;
    debug!(declarations = builder.len(), "populated buffer");

    let buffer = PersistedBuffer::persist(&builder.finish())?;
    let source = buffer.read_back()?;
    let formatted = format_source(&source)?;
    debug!(bytes = formatted.len(), "formatted");

    Ok(GeneratedArtifact {
        path: path.to_string(),
        content: format!("{}{}", BANNER, formatted),
    })
}

// =============================================================================
// Persisted Buffer
// =============================================================================

/// Declarations written to a temp file; removed when dropped
struct PersistedBuffer {
    path: String,
    file: NamedTempFile,
}

impl PersistedBuffer {
    fn persist(source: &SourceFile) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("lexgen-")
            .suffix(".json")
            .tempfile()
            .map_err(|e| CodegenError::persistence(&source.path, e))?;
        serde_json::to_writer(&mut file, source)
            .map_err(|e| CodegenError::persistence(&source.path, e))?;
        file.flush()
            .map_err(|e| CodegenError::persistence(&source.path, e))?;

        debug!(buffer = %file.path().display(), "persisted buffer");
        Ok(Self {
            path: source.path.clone(),
            file,
        })
    }

    fn read_back(&self) -> Result<SourceFile> {
        let text = fs::read_to_string(self.file.path())
            .map_err(|e| CodegenError::persistence(&self.path, e))?;
        let source: SourceFile = serde_json::from_str(&text)
            .map_err(|e| CodegenError::persistence(&self.path, e))?;

        if source.path != self.path {
            return Err(CodegenError::persistence(
                &self.path,
                format!("buffer holds '{}'", source.path),
            ));
        }
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::source::{ConstDecl, Expr, Layout, ObjectEntry};
    use serde_json::json;

    fn source_file(path: &str) -> SourceFile {
        let mut builder = SourceBuilder::new(path);
        builder.add_verbatim("export const a = 1");
        builder.finish()
    }

    #[test]
    fn test_floats_survive_persisted_buffer() {
        let artifact = generate("x.ts", |b| {
            b.add_const(ConstDecl::exported(
                "x",
                Expr::Object {
                    entries: vec![ObjectEntry::new("A", json!({ "min": 1.9975728074381366e-21_f64 }))],
                    layout: Layout::Expanded,
                },
            ));
            Ok(())
        })
        .unwrap();

        assert!(artifact.content.contains("min: 1.9975728074381366e-21,"));
    }

    #[test]
    fn test_read_back_round_trips() {
        let file = source_file("x.ts");
        let buffer = PersistedBuffer::persist(&file).unwrap();
        assert_eq!(buffer.read_back().unwrap(), file);
    }

    #[test]
    fn test_corrupt_buffer_is_persistence_error() {
        let buffer = PersistedBuffer::persist(&source_file("x.ts")).unwrap();
        let temp_path = buffer.file.path().to_path_buf();
        fs::write(&temp_path, "not json").unwrap();

        match buffer.read_back() {
            Err(CodegenError::Persistence { path, .. }) => assert_eq!(path, "x.ts"),
            other => panic!("Expected Persistence error, got {:?}", other),
        }

        drop(buffer);
        assert!(!temp_path.exists());
    }

    #[test]
    fn test_buffer_for_other_path_is_persistence_error() {
        let buffer = PersistedBuffer::persist(&source_file("x.ts")).unwrap();
        let other = serde_json::to_string(&source_file("y.ts")).unwrap();
        fs::write(buffer.file.path(), other).unwrap();

        match buffer.read_back() {
            Err(CodegenError::Persistence { path, reason }) => {
                assert_eq!(path, "x.ts");
                assert!(reason.contains("y.ts"));
            }
            other => panic!("Expected Persistence error, got {:?}", other),
        }
    }

    #[test]
    fn test_generate_prepends_banner() {
        let artifact = generate("x.ts", |b| {
            b.add_const(ConstDecl::exported(
                "x",
                Expr::Object { entries: vec![ObjectEntry::new("A", json!(1))], layout: Layout::Fit },
            ));
            Ok(())
        })
        .unwrap();

        assert_eq!(artifact.path, "x.ts");
        assert_eq!(
            artifact.content,
            "/**\n * GENERATED CODE - DO NOT MODIFY\n */\nexport const x = { A: 1 }\n"
        );
    }

    #[test]
    fn test_populate_error_propagates_unchanged() {
        let result = generate("x.ts", |_| Err(CodegenError::Validation("bad input".into())));
        match result {
            Err(CodegenError::Validation(msg)) => assert_eq!(msg, "bad input"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_formatting_error_propagates() {
        let result = generate("x.ts", |b| {
            b.add_const(ConstDecl::exported("values", Expr::ObjectValues { source: "missing".into() }));
            Ok(())
        });
        assert!(matches!(result, Err(CodegenError::Formatting(_))));
    }

    #[test]
    fn test_checksum_tracks_content() {
        let a = generate("a.ts", |b| {
            b.add_verbatim("export const a = 1");
            Ok(())
        })
        .unwrap();
        let again = generate("a.ts", |b| {
            b.add_verbatim("export const a = 1");
            Ok(())
        })
        .unwrap();
        assert_eq!(a, again);
        assert_eq!(a.checksum(), again.checksum());
        assert!(a.checksum().verify(&a.content));
    }

    #[test]
    fn test_parallel_generation_is_independent() {
        let paths = ["one.ts", "two.ts", "three.ts"];
        let artifacts: Vec<GeneratedArtifact> = std::thread::scope(|scope| {
            let handles: Vec<_> = paths
                .iter()
                .map(|path| {
                    scope.spawn(move || {
                        generate(path, |b| {
                            b.add_verbatim(format!("export const path = '{}'", path));
                            Ok(())
                        })
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect()
        });

        for (artifact, path) in artifacts.iter().zip(paths) {
            assert_eq!(artifact.path, path);
            assert!(artifact.content.ends_with(&format!("export const path = '{}'\n", path)));
        }
    }
}
