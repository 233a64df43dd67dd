//! Declaration Model
//!
//! Generated files are assembled as a list of declarations in an append-only
//! [`SourceBuilder`]. The builder never renders text itself; rendering is the
//! formatter's job, so every file goes through the same style policy.
//!
//! The model is serde-serializable because the orchestrator persists the
//! buffer and reads it back before formatting.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Declarations
// =============================================================================

/// A top-level statement in a generated file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    /// `import { a, type B } from 'module'`
    Import(ImportDecl),
    /// `export const name: Type = <init>`
    Const(ConstDecl),
    /// Static text emitted as-is (after whitespace normalization)
    Verbatim { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub module: String,
    pub names: Vec<ImportName>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportName {
    pub name: String,
    #[serde(default)]
    pub type_only: bool,
}

impl ImportName {
    pub fn value(name: impl Into<String>) -> Self {
        Self { name: name.into(), type_only: false }
    }

    pub fn type_only(name: impl Into<String>) -> Self {
        Self { name: name.into(), type_only: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstDecl {
    pub name: String,
    pub exported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_annotation: Option<String>,
    pub init: Expr,
    /// Append `as const`
    #[serde(default)]
    pub as_const: bool,
    /// Append `satisfies <type>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfies: Option<String>,
}

impl ConstDecl {
    /// An exported `const` with no annotations
    pub fn exported(name: impl Into<String>, init: Expr) -> Self {
        Self {
            name: name.into(),
            exported: true,
            type_annotation: None,
            init,
            as_const: false,
            satisfies: None,
        }
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.type_annotation = Some(ty.into());
        self
    }

    pub fn as_const(mut self) -> Self {
        self.as_const = true;
        self
    }

    pub fn satisfies(mut self, ty: impl Into<String>) -> Self {
        self.satisfies = Some(ty.into());
        self
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// Initializer expressions supported by the formatter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// Object literal keyed by symbol, entries in insertion order
    Object { entries: Vec<ObjectEntry>, layout: Layout },
    /// `Object.values(<source>)`
    ObjectValues { source: String },
    /// `new <class>(<args>)`
    New { class: String, args: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: String,
    pub value: Value,
}

impl ObjectEntry {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self { key: key.into(), value }
    }
}

/// How object literals are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Every non-empty object is broken one entry per line
    Expanded,
    /// Stay on one line when it fits the print width
    Fit,
}

// =============================================================================
// Builder
// =============================================================================

/// The declarations of one generated file, as persisted between steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    pub declarations: Vec<Declaration>,
}

/// Append-only declaration buffer bound to a target path
#[derive(Debug)]
pub struct SourceBuilder {
    path: String,
    declarations: Vec<Declaration>,
}

impl SourceBuilder {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            declarations: Vec::new(),
        }
    }

    /// Target path of the file being built
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn add_import(
        &mut self,
        module: impl Into<String>,
        names: impl IntoIterator<Item = ImportName>,
    ) -> &mut Self {
        self.declarations.push(Declaration::Import(ImportDecl {
            module: module.into(),
            names: names.into_iter().collect(),
        }));
        self
    }

    pub fn add_const(&mut self, decl: ConstDecl) -> &mut Self {
        self.declarations.push(Declaration::Const(decl));
        self
    }

    pub fn add_verbatim(&mut self, text: impl Into<String>) -> &mut Self {
        self.declarations.push(Declaration::Verbatim { text: text.into() });
        self
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn finish(self) -> SourceFile {
        SourceFile {
            path: self.path,
            declarations: self.declarations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_appends_in_order() {
        let mut builder = SourceBuilder::new("lexicons.ts");
        builder
            .add_import("@atproto/lexicon", [ImportName::value("Lexicons")])
            .add_const(ConstDecl::exported(
                "lexicons",
                Expr::New { class: "Lexicons".into(), args: vec![] },
            ));

        assert_eq!(builder.len(), 2);
        let file = builder.finish();
        assert_eq!(file.path, "lexicons.ts");
        assert!(matches!(file.declarations[0], Declaration::Import(_)));
        assert!(matches!(file.declarations[1], Declaration::Const(_)));
    }

    #[test]
    fn test_persisted_form_keeps_key_order() {
        let file = SourceFile {
            path: "x.ts".into(),
            declarations: vec![Declaration::Const(ConstDecl::exported(
                "dict",
                Expr::Object {
                    entries: vec![ObjectEntry::new("Z", json!({ "zeta": 1, "alpha": 2 }))],
                    layout: Layout::Expanded,
                },
            ))],
        };

        let text = serde_json::to_string(&file).unwrap();
        let back: SourceFile = serde_json::from_str(&text).unwrap();
        assert_eq!(back, file);

        let Declaration::Const(decl) = &back.declarations[0] else {
            panic!("Expected Const");
        };
        let Expr::Object { entries, .. } = &decl.init else {
            panic!("Expected Object");
        };
        let keys: Vec<_> = entries[0].value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }
}
