//! Lexicon Codegen CLI
//!
//! Generates `lexicons.ts` and `util.ts` from a directory of lexicon documents.
//!
//! Usage:
//!   lexgen generate --input ./lexicons --output ./src/lexicon
//!   lexgen generate --check          # fail if generated files are stale
//!   lexgen ids --input ./lexicons    # print the symbol table
//!   lexgen init                      # write a default lexgen.toml

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use lexicon_codegen::output::{check_artifacts, write_artifacts, DriftKind};
use lexicon_codegen::{
    assure, generate_typescript, load_documents, JsonSchemaValidator, LexgenConfig, SchemaDocument,
    SymbolTable,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lexgen")]
#[command(about = "Generate TypeScript lexicon registries from schema documents")]
#[command(version)]
struct Cli {
    /// Config file (in addition to lexgen.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate lexicons.ts and util.ts
    Generate {
        /// Directory containing lexicon JSON files
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory to write generated files to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON Schema every document must satisfy
        #[arg(long)]
        meta_schema: Option<PathBuf>,

        /// Compare with existing files instead of writing
        #[arg(long)]
        check: bool,
    },

    /// Print the symbol assigned to each document
    Ids {
        /// Directory containing lexicon JSON files
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Write the effective configuration to a file
    Init {
        #[arg(default_value = "lexgen.toml")]
        path: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = LexgenConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Generate { input, output, meta_schema, check } => {
            let input = input.unwrap_or_else(|| config.input.dir.clone());
            let output = output.unwrap_or_else(|| config.output.dir.clone());
            let check = check || config.output.check;

            let docs = load(&input, &config)?;

            if let Some(path) = meta_schema.or_else(|| config.validation.meta_schema.clone()) {
                validate_documents(&path, &docs)?;
                println!("✅ {} documents satisfy {}", docs.len(), path.display());
            }

            let artifacts = generate_typescript(&docs)?;

            if check {
                let drift = check_artifacts(&output, &artifacts)?;
                if drift.is_empty() {
                    println!("✅ {} artifacts up to date in {}", artifacts.len(), output.display());
                    return Ok(());
                }
                for d in &drift {
                    match d.kind {
                        DriftKind::Missing => println!("❌ missing: {}", d.path.display()),
                        DriftKind::Stale => println!("❌ stale: {}", d.path.display()),
                    }
                    println!("{}", d.diff);
                }
                bail!("{} generated file(s) out of date", drift.len());
            }

            for (path, artifact) in write_artifacts(&output, &artifacts)?.iter().zip(&artifacts) {
                println!("📝 {} ({})", path.display(), artifact.checksum().short());
            }
            Ok(())
        }

        Commands::Ids { input } => {
            let input = input.unwrap_or_else(|| config.input.dir.clone());
            let docs = load(&input, &config)?;
            let table = SymbolTable::build(docs.iter().map(|d| d.id.as_str()))?;

            let width = table.iter().map(|(_, symbol)| symbol.len()).max().unwrap_or(0);
            for (id, symbol) in table.iter() {
                println!("{:width$}  {}", symbol, id, width = width);
            }
            Ok(())
        }

        Commands::Init { path } => {
            if Path::new(&path).exists() {
                bail!("{} already exists", path);
            }
            config.save(&path)?;
            println!("📝 Wrote {}", path);
            Ok(())
        }
    }
}

fn load(input: &Path, config: &LexgenConfig) -> anyhow::Result<Vec<SchemaDocument>> {
    let docs = load_documents(input, &config.input.skip_prefixes)
        .with_context(|| format!("loading documents from {}", input.display()))?;
    println!("📂 Loaded {} documents from {}", docs.len(), input.display());
    Ok(docs)
}

fn validate_documents(meta_schema: &Path, docs: &[SchemaDocument]) -> anyhow::Result<()> {
    let text = fs::read_to_string(meta_schema)
        .with_context(|| format!("reading {}", meta_schema.display()))?;
    let schema: serde_json::Value = serde_json::from_str(&text)?;
    let validator = JsonSchemaValidator::compile(&schema)?;
    let check = assure(&validator);

    for doc in docs {
        check(&doc.body).with_context(|| format!("{} does not satisfy the meta-schema", doc.id))?;
    }
    Ok(())
}
