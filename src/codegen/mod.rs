//! Code Generation
//!
//! Generates the TypeScript lexicon registry from schema documents.
//!
//! Architecture:
//! - names: identifier -> symbol normalization and the per-run SymbolTable
//! - source: declaration model and the append-only SourceBuilder
//! - assemble: fills a SourceBuilder with the lexicons.ts / util.ts declarations
//! - format: renders declarations under the fixed STYLE policy
//! - generate: per-artifact lifecycle (populate, persist, read back, format)
//!
//! The key constraint: assemblers never produce text. Every file goes through
//! the formatter, so banner and style are identical across artifacts.

pub mod assemble;
pub mod format;
pub mod generate;
pub mod names;
pub mod source;

use tracing::info;

use crate::error::Result;
use crate::schema::SchemaDocument;

pub use assemble::{assemble_lexicons, assemble_util, LEXICON_MODULE};
pub use format::{format_source, StylePolicy, BANNER, STYLE};
pub use generate::{generate, GeneratedArtifact};
pub use names::{nsid_to_symbol, SymbolTable};
pub use source::{ConstDecl, Declaration, Expr, ImportName, Layout, ObjectEntry, SourceBuilder, SourceFile};

/// Path of the registry artifact
pub const LEXICONS_PATH: &str = "lexicons.ts";

/// Path of the helper artifact
pub const UTIL_PATH: &str = "util.ts";

// =============================================================================
// Public API
// =============================================================================

/// Generate `lexicons.ts` for an ordered document list
pub fn generate_lexicons(docs: &[SchemaDocument]) -> Result<GeneratedArtifact> {
    generate(LEXICONS_PATH, |builder| assemble_lexicons(docs, builder))
}

/// Generate the static `util.ts`
pub fn generate_util() -> Result<GeneratedArtifact> {
    generate(UTIL_PATH, assemble_util)
}

/// Generate every TypeScript artifact for `docs` (util first)
pub fn generate_typescript(docs: &[SchemaDocument]) -> Result<Vec<GeneratedArtifact>> {
    let artifacts = vec![generate_util()?, generate_lexicons(docs)?];

    for artifact in &artifacts {
        let checksum = artifact.checksum();
        info!(
            path = %artifact.path,
            bytes = artifact.content.len(),
            checksum = %checksum.short(),
            "generated artifact"
        );
    }

    Ok(artifacts)
}
