//! Artifact Assembly
//!
//! Turns an ordered document list into the declarations of `lexicons.ts`:
//!
//! ```text
//! import { type LexiconDoc, Lexicons } from '@atproto/lexicon'
//! export const schemaDict = { <Symbol>: <document>, ... } as const satisfies Record<string, LexiconDoc>
//! export const schemas = Object.values(schemaDict) satisfies LexiconDoc[]
//! export const lexicons: Lexicons = new Lexicons(schemas)
//! export const ids = { <Symbol>: '<identifier>', ... }
//! ```
//!
//! Entries follow input order in every declaration so regenerated files
//! diff cleanly.

use serde_json::Value;
use tracing::debug;

use super::names::SymbolTable;
use super::source::{ConstDecl, Expr, ImportName, Layout, ObjectEntry, SourceBuilder};
use crate::error::Result;
use crate::schema::SchemaDocument;

/// Module providing `LexiconDoc` and `Lexicons`
pub const LEXICON_MODULE: &str = "@atproto/lexicon";

const IS_OBJ: &str = "
export function isObj(v: unknown): v is Record<string, unknown> {
  return typeof v === 'object' && v !== null
}
";

const HAS_PROP: &str = "
export function hasProp<T extends object, K extends PropertyKey>(
  data: T,
  prop: K,
): data is T & Record<K, unknown> {
  return prop in data
}
";

/// Append the `lexicons.ts` declarations for `docs` to `builder`.
///
/// Symbols are resolved before anything is appended, so a collision leaves
/// the builder untouched.
pub fn assemble_lexicons(docs: &[SchemaDocument], builder: &mut SourceBuilder) -> Result<()> {
    let table = SymbolTable::build(docs.iter().map(|doc| doc.id.as_str()))?;
    debug!(documents = docs.len(), "resolved symbols");

    let schema_entries: Vec<ObjectEntry> = docs
        .iter()
        .zip(table.iter())
        .map(|(doc, (_, symbol))| ObjectEntry::new(symbol, doc.body.clone()))
        .collect();

    let id_entries: Vec<ObjectEntry> = table
        .iter()
        .map(|(id, symbol)| ObjectEntry::new(symbol, Value::String(id.to_string())))
        .collect();

    builder
        .add_import(
            LEXICON_MODULE,
            [ImportName::type_only("LexiconDoc"), ImportName::value("Lexicons")],
        )
        .add_const(
            ConstDecl::exported(
                "schemaDict",
                Expr::Object { entries: schema_entries, layout: Layout::Expanded },
            )
            .as_const()
            .satisfies("Record<string, LexiconDoc>"),
        )
        .add_const(
            ConstDecl::exported("schemas", Expr::ObjectValues { source: "schemaDict".into() })
                .satisfies("LexiconDoc[]"),
        )
        .add_const(
            ConstDecl::exported(
                "lexicons",
                Expr::New { class: "Lexicons".into(), args: vec!["schemas".into()] },
            )
            .with_type("Lexicons"),
        )
        .add_const(ConstDecl::exported(
            "ids",
            Expr::Object { entries: id_entries, layout: Layout::Fit },
        ));

    Ok(())
}

/// Append the static `util.ts` helpers to `builder`.
pub fn assemble_util(builder: &mut SourceBuilder) -> Result<()> {
    builder.add_verbatim(IS_OBJ).add_verbatim(HAS_PROP);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::source::Declaration;
    use crate::error::CodegenError;
    use serde_json::json;

    fn doc(id: &str) -> SchemaDocument {
        SchemaDocument::new(id, json!({ "lexicon": 1, "id": id }))
    }

    fn const_names(builder: &SourceBuilder) -> Vec<&str> {
        builder
            .declarations()
            .iter()
            .filter_map(|d| match d {
                Declaration::Const(c) => Some(c.name.as_str()),
                _ => None,
            })
            .collect()
    }

    fn object_keys<'a>(builder: &'a SourceBuilder, name: &str) -> Vec<&'a str> {
        builder
            .declarations()
            .iter()
            .find_map(|d| match d {
                Declaration::Const(c) if c.name == name => match &c.init {
                    Expr::Object { entries, .. } => {
                        Some(entries.iter().map(|e| e.key.as_str()).collect())
                    }
                    _ => None,
                },
                _ => None,
            })
            .unwrap_or_default()
    }

    #[test]
    fn test_declaration_order() {
        let mut builder = SourceBuilder::new("lexicons.ts");
        assemble_lexicons(&[doc("com.example.a")], &mut builder).unwrap();

        assert!(matches!(builder.declarations()[0], Declaration::Import(_)));
        assert_eq!(const_names(&builder), vec!["schemaDict", "schemas", "lexicons", "ids"]);
    }

    #[test]
    fn test_entries_follow_input_order() {
        let mut builder = SourceBuilder::new("lexicons.ts");
        let docs = [doc("com.example.zeta"), doc("com.example.alpha")];
        assemble_lexicons(&docs, &mut builder).unwrap();

        assert_eq!(object_keys(&builder, "schemaDict"), vec!["ComExampleZeta", "ComExampleAlpha"]);
        assert_eq!(object_keys(&builder, "ids"), vec!["ComExampleZeta", "ComExampleAlpha"]);
    }

    #[test]
    fn test_collision_leaves_builder_empty() {
        let mut builder = SourceBuilder::new("lexicons.ts");
        let err = assemble_lexicons(&[doc("a.b"), doc("a.B")], &mut builder).unwrap_err();

        assert!(matches!(err, CodegenError::SymbolCollision { .. }));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_util_is_static() {
        let mut builder = SourceBuilder::new("util.ts");
        assemble_util(&mut builder).unwrap();
        assert_eq!(builder.len(), 2);
    }
}
