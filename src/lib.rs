//! Lexicon Code Generator
//!
//! Turns namespaced lexicon schema documents (`com.example.getThing`) into a
//! TypeScript registry module, byte-for-byte reproducible across runs.
//!
//! ## Features
//!
//! - **Deterministic Output**: Same ordered input, same bytes
//! - **Collision Safety**: Identifiers that normalize to one symbol are rejected
//! - **Single Style Policy**: Every file is rendered by one formatter with a banner
//! - **Type Guards**: `is` / `assure` over any `Validator`
//!
//! ## Architecture
//!
//! ```text
//! lexicons/*.json
//!     │  schema::load_documents
//!     ▼
//! Vec<SchemaDocument>
//!     │  codegen::generate_typescript
//!     │    names → assemble → SourceBuilder → persist → format → banner
//!     ▼
//! Vec<GeneratedArtifact> { util.ts, lexicons.ts }
//!     │  output::write_artifacts / output::check_artifacts
//!     ▼
//! src/lexicon/
//! ```

pub mod checksum;
pub mod codegen;
pub mod config;
pub mod error;
pub mod guard;
pub mod output;
pub mod schema;

pub use checksum::Checksum;
pub use codegen::{generate, generate_typescript, nsid_to_symbol, GeneratedArtifact, SymbolTable};
pub use config::LexgenConfig;
pub use error::{CodegenError, Result};
pub use guard::{assure, is, JsonSchemaValidator, SerdeValidator, ValidationFailure, Validator};
pub use schema::{load_documents, SchemaDocument};
