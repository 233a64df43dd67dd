//! Formatter
//!
//! Renders a [`SourceFile`] into canonical TypeScript text under the fixed
//! [`STYLE`] policy. Output depends only on the declarations: key order comes
//! from the input, never from hashing, so identical input yields identical
//! bytes across runs and processes.
//!
//! The formatter also checks that the declarations hang together (names are
//! identifiers, references point at earlier declarations). A failure here
//! means the assembler produced something broken, not that user input was bad.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Number, Value};

use super::source::{ConstDecl, Declaration, Expr, ImportDecl, Layout, SourceFile};
use crate::error::{CodegenError, Result};

/// Leading comment on every generated file
pub const BANNER: &str = "/**\n * GENERATED CODE - DO NOT MODIFY\n */\n";

// =============================================================================
// Style Policy
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Single,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingComma {
    /// After the last entry of every multi-line list
    All,
    None,
}

/// Layout rules shared by every generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StylePolicy {
    pub indent_width: usize,
    pub print_width: usize,
    /// Preferred quote; the other one is used when it needs fewer escapes
    pub quote: QuoteStyle,
    pub trailing_comma: TrailingComma,
    pub semicolons: bool,
}

/// The one style policy used for all output
pub const STYLE: StylePolicy = StylePolicy {
    indent_width: 2,
    print_width: 80,
    quote: QuoteStyle::Single,
    trailing_comma: TrailingComma::All,
    semicolons: false,
};

// =============================================================================
// Public API
// =============================================================================

/// Validate and render a source file with [`STYLE`].
pub fn format_source(file: &SourceFile) -> Result<String> {
    validate(file)?;
    Ok(Printer::new(&STYLE).print(file))
}

/// True for names usable as bare identifiers and object keys
pub fn is_identifier(name: &str) -> bool {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT
        .get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier regex"))
        .is_match(name)
}

// =============================================================================
// Structural Validation
// =============================================================================

fn validate(file: &SourceFile) -> Result<()> {
    let invalid = |msg: String| CodegenError::Formatting(format!("{}: {}", file.path, msg));
    let mut declared: HashSet<&str> = HashSet::new();

    for decl in &file.declarations {
        match decl {
            Declaration::Import(import) => {
                if import.module.is_empty() {
                    return Err(invalid("import with empty module specifier".into()));
                }
                if import.names.is_empty() {
                    return Err(invalid(format!("import from '{}' names nothing", import.module)));
                }
                for name in &import.names {
                    declare(&mut declared, &name.name).map_err(invalid)?;
                }
            }
            Declaration::Const(decl) => {
                validate_const(decl, &declared).map_err(invalid)?;
                declare(&mut declared, &decl.name).map_err(invalid)?;
            }
            Declaration::Verbatim { text } => {
                if text.trim().is_empty() {
                    return Err(invalid("empty verbatim block".into()));
                }
            }
        }
    }

    Ok(())
}

fn declare<'a>(declared: &mut HashSet<&'a str>, name: &'a str) -> std::result::Result<(), String> {
    if !is_identifier(name) {
        return Err(format!("'{}' is not a valid identifier", name));
    }
    if !declared.insert(name) {
        return Err(format!("'{}' is declared twice", name));
    }
    Ok(())
}

fn validate_const(decl: &ConstDecl, declared: &HashSet<&str>) -> std::result::Result<(), String> {
    for ty in [&decl.type_annotation, &decl.satisfies].into_iter().flatten() {
        if ty.trim().is_empty() {
            return Err(format!("empty type on '{}'", decl.name));
        }
    }

    let require = |name: &str| {
        if declared.contains(name) {
            Ok(())
        } else {
            Err(format!("'{}' references undeclared '{}'", decl.name, name))
        }
    };

    match &decl.init {
        Expr::Object { entries, .. } => {
            let mut keys = HashSet::new();
            for entry in entries {
                if !keys.insert(entry.key.as_str()) {
                    return Err(format!("duplicate key '{}' in '{}'", entry.key, decl.name));
                }
            }
            Ok(())
        }
        Expr::ObjectValues { source } => require(source.as_str()),
        Expr::New { class, args } => {
            require(class.as_str())?;
            args.iter().try_for_each(|arg| require(arg.as_str()))
        }
    }
}

// =============================================================================
// Printer
// =============================================================================

struct Printer<'a> {
    style: &'a StylePolicy,
}

impl<'a> Printer<'a> {
    fn new(style: &'a StylePolicy) -> Self {
        Self { style }
    }

    fn print(&self, file: &SourceFile) -> String {
        let mut out = String::new();
        let mut prev_import = None;

        for decl in &file.declarations {
            let is_import = matches!(decl, Declaration::Import(_));
            match prev_import {
                Some(true) if is_import => out.push('\n'),
                Some(_) => out.push_str("\n\n"),
                None => {}
            }
            prev_import = Some(is_import);

            match decl {
                Declaration::Import(import) => out.push_str(&self.import(import)),
                Declaration::Const(decl) => out.push_str(&self.constant(decl)),
                Declaration::Verbatim { text } => out.push_str(&self.verbatim(text)),
            }
        }

        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    fn terminator(&self) -> &'static str {
        if self.style.semicolons {
            ";"
        } else {
            ""
        }
    }

    fn separator(&self, last: bool) -> &'static str {
        if !last || self.style.trailing_comma == TrailingComma::All {
            ","
        } else {
            ""
        }
    }

    fn pad(&self, level: usize) -> String {
        " ".repeat(level * self.style.indent_width)
    }

    fn import(&self, import: &ImportDecl) -> String {
        let names: Vec<String> = import
            .names
            .iter()
            .map(|n| if n.type_only { format!("type {}", n.name) } else { n.name.clone() })
            .collect();
        let module = self.string(&import.module);
        let term = self.terminator();

        let flat = format!("import {{ {} }} from {}{}", names.join(", "), module, term);
        if width(&flat) <= self.style.print_width {
            return flat;
        }

        let pad = self.pad(1);
        let mut out = String::from("import {\n");
        for (i, name) in names.iter().enumerate() {
            out.push_str(&pad);
            out.push_str(name);
            out.push_str(self.separator(i + 1 == names.len()));
            out.push('\n');
        }
        out.push_str(&format!("}} from {}{}", module, term));
        out
    }

    fn constant(&self, decl: &ConstDecl) -> String {
        let mut head = String::new();
        if decl.exported {
            head.push_str("export ");
        }
        head.push_str("const ");
        head.push_str(&decl.name);
        if let Some(ty) = &decl.type_annotation {
            head.push_str(": ");
            head.push_str(ty);
        }
        head.push_str(" = ");

        let mut tail = String::new();
        if decl.as_const {
            tail.push_str(" as const");
        }
        if let Some(ty) = &decl.satisfies {
            tail.push_str(" satisfies ");
            tail.push_str(ty);
        }
        tail.push_str(self.terminator());

        let body = match &decl.init {
            Expr::Object { entries, layout } => {
                let entries: Vec<(&str, &Value)> =
                    entries.iter().map(|e| (e.key.as_str(), &e.value)).collect();
                self.object(&entries, 0, width(&head), width(&tail), *layout)
            }
            Expr::ObjectValues { source } => format!("Object.values({})", source),
            Expr::New { class, args } => format!("new {}({})", class, args.join(", ")),
        };

        format!("{}{}{}", head, body, tail)
    }

    /// Normalize static text: LF endings, no trailing whitespace, leading tabs
    /// expanded, no leading/trailing blank lines, at most one blank line in a row.
    fn verbatim(&self, text: &str) -> String {
        let mut lines: Vec<String> = Vec::new();
        for raw in text.replace("\r\n", "\n").lines() {
            let tabs = raw.len() - raw.trim_start_matches('\t').len();
            let line = format!("{}{}", self.pad(tabs), &raw[tabs..]);
            let line = line.trim_end().to_string();
            if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
                continue;
            }
            lines.push(line);
        }
        while lines.last().map_or(false, |l| l.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }

    // -------------------------------------------------------------------------
    // Values
    // -------------------------------------------------------------------------

    /// `used` is the width already on the current line, `trailing` the width
    /// that will follow the value on its last line.
    fn value(&self, value: &Value, indent: usize, used: usize, trailing: usize, layout: Layout) -> String {
        match value {
            Value::Object(map) => {
                let entries: Vec<(&str, &Value)> = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
                self.object(&entries, indent, used, trailing, layout)
            }
            Value::Array(items) => self.array(items, indent, used, trailing, layout),
            scalar => self.flat(scalar),
        }
    }

    fn object(
        &self,
        entries: &[(&str, &Value)],
        indent: usize,
        used: usize,
        trailing: usize,
        layout: Layout,
    ) -> String {
        if entries.is_empty() {
            return "{}".to_string();
        }

        if layout == Layout::Fit {
            let flat = self.flat_object(entries);
            if used + width(&flat) + trailing <= self.style.print_width {
                return flat;
            }
        }

        let pad = self.pad(indent + 1);
        let mut out = String::from("{\n");
        for (i, (key, value)) in entries.iter().enumerate() {
            let key = self.key(key);
            let sep = self.separator(i + 1 == entries.len());
            let used = width(&pad) + width(&key) + 2;
            out.push_str(&pad);
            out.push_str(&key);
            out.push_str(": ");
            out.push_str(&self.value(value, indent + 1, used, sep.len(), layout));
            out.push_str(sep);
            out.push('\n');
        }
        out.push_str(&self.pad(indent));
        out.push('}');
        out
    }

    fn array(&self, items: &[Value], indent: usize, used: usize, trailing: usize, layout: Layout) -> String {
        if items.is_empty() {
            return "[]".to_string();
        }

        if !items.iter().any(|item| forces_break(item, layout)) {
            let flat = self.flat_array(items);
            if used + width(&flat) + trailing <= self.style.print_width {
                return flat;
            }
        }

        let pad = self.pad(indent + 1);
        let mut out = String::from("[\n");
        for (i, item) in items.iter().enumerate() {
            let sep = self.separator(i + 1 == items.len());
            out.push_str(&pad);
            out.push_str(&self.value(item, indent + 1, width(&pad), sep.len(), layout));
            out.push_str(sep);
            out.push('\n');
        }
        out.push_str(&self.pad(indent));
        out.push(']');
        out
    }

    fn flat(&self, value: &Value) -> String {
        match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number(n),
            Value::String(s) => self.string(s),
            Value::Array(items) => self.flat_array(items),
            Value::Object(map) => {
                let entries: Vec<(&str, &Value)> = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
                self.flat_object(&entries)
            }
        }
    }

    fn flat_object(&self, entries: &[(&str, &Value)]) -> String {
        if entries.is_empty() {
            return "{}".to_string();
        }
        let body: Vec<String> = entries
            .iter()
            .map(|(k, v)| format!("{}: {}", self.key(k), self.flat(v)))
            .collect();
        format!("{{ {} }}", body.join(", "))
    }

    fn flat_array(&self, items: &[Value]) -> String {
        let body: Vec<String> = items.iter().map(|v| self.flat(v)).collect();
        format!("[{}]", body.join(", "))
    }

    fn key(&self, key: &str) -> String {
        if is_identifier(key) {
            key.to_string()
        } else {
            self.string(key)
        }
    }

    fn string(&self, s: &str) -> String {
        let singles = s.matches('\'').count();
        let doubles = s.matches('"').count();
        let quote = match self.style.quote {
            QuoteStyle::Single if singles > doubles => '"',
            QuoteStyle::Single => '\'',
            QuoteStyle::Double if doubles > singles => '\'',
            QuoteStyle::Double => '"',
        };

        let mut out = String::with_capacity(s.len() + 2);
        out.push(quote);
        for c in s.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{8}' => out.push_str("\\b"),
                '\u{c}' => out.push_str("\\f"),
                c if c == quote => {
                    out.push('\\');
                    out.push(c);
                }
                c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => out.push(c),
            }
        }
        out.push(quote);
        out
    }
}

/// Largest integer an f64 holds exactly (`Number.MAX_SAFE_INTEGER`)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Integral floats print without a fraction (`1.0` -> `1`, `-0.0` -> `0`)
fn number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// Whether a value can never be printed on one line under `layout`
fn forces_break(value: &Value, layout: Layout) -> bool {
    if layout != Layout::Expanded {
        return false;
    }
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => items.iter().any(|item| forces_break(item, layout)),
        _ => false,
    }
}

/// Columns used by `s`, one per char. Wide glyphs (CJK, emoji) count as one.
fn width(s: &str) -> usize {
    s.chars().count()
}
