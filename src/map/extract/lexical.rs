//! Regex-Based Lexical Extraction
//!
//! Per-language pattern sets for declarations, relative imports and exports.
//! Single-pass scanning over the raw text: malformed or partial files simply
//! produce fewer matches.
//!
//! @module map/extract/lexical

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Extraction, Language};
use crate::core::config::MAX_SIGNATURES;
use crate::map::types::Exports;

// =============================================================================
// SCRIPT (JavaScript / TypeScript) PATTERNS
// =============================================================================

static SCRIPT_DECLARATIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // function name( / export default async function* name(
        Regex::new(r"(?m)^[\t ]*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*[<(]").unwrap(),
        // class Name
        Regex::new(r"(?m)^[\t ]*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)").unwrap(),
        // const name = (args) => / const name = arg =>
        Regex::new(r"(?m)^[\t ]*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=\n]+)?=\s*(?:async\s+)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*(?::[^=\n]+?)?\s*=>").unwrap(),
        // const name = function
        Regex::new(r"(?m)^[\t ]*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?function\b").unwrap(),
        // interface Name
        Regex::new(r"(?m)^[\t ]*(?:export\s+)?(?:declare\s+)?interface\s+([A-Za-z_$][\w$]*)").unwrap(),
        // type Name =
        Regex::new(r"(?m)^[\t ]*(?:export\s+)?(?:declare\s+)?type\s+([A-Za-z_$][\w$]*)\s*(?:<[^>]*>)?\s*=").unwrap(),
        // enum Name
        Regex::new(r"(?m)^[\t ]*(?:export\s+)?(?:declare\s+)?(?:const\s+)?enum\s+([A-Za-z_$][\w$]*)").unwrap(),
    ]
});

static SCRIPT_IMPORTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // import x from './a' / import { a } from './a' / import './a'
        Regex::new(r#"(?m)^[\t ]*import\s+(?:type\s+)?(?:[^'";]*?\s*from\s*)?['"]([^'"\n]+)['"]"#).unwrap(),
        // export { a } from './a' / export * from './a'
        Regex::new(r#"(?m)^[\t ]*export\s+(?:type\s+)?(?:\*(?:\s+as\s+[\w$]+)?|\{[^}]*\})\s*from\s*['"]([^'"\n]+)['"]"#).unwrap(),
        // require('./a')
        Regex::new(r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).unwrap(),
        // import('./a')
        Regex::new(r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).unwrap(),
    ]
});

/// export function|class|const|... name
static SCRIPT_EXPORT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[\t ]*export\s+(?:declare\s+)?(?:async\s+)?(?:function\s*\*?|(?:abstract\s+)?class|const\s+enum|const|let|var|interface|type|enum)\s+([A-Za-z_$][\w$]*)").unwrap()
});

/// export { a, b as c } (optionally followed by `from`)
static SCRIPT_EXPORT_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[\t ]*export\s+(?:type\s+)?\{([^}]*)\}").unwrap());

/// export * as ns from './a'
static SCRIPT_EXPORT_NAMESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[\t ]*export\s+\*\s+as\s+([A-Za-z_$][\w$]*)").unwrap());

/// export default <expr>
static SCRIPT_EXPORT_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[\t ]*export\s+default\s+").unwrap());

/// module.exports = <expr>
static COMMONJS_EXPORT_ASSIGN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[\t ]*module\.exports\s*=\s*").unwrap());

/// exports.name = / module.exports.name =
static COMMONJS_EXPORT_PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[\t ]*(?:module\.)?exports\.([A-Za-z_$][\w$]*)\s*=[^=]").unwrap()
});

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][\w$]*").unwrap());

// =============================================================================
// PYTHON PATTERNS
// =============================================================================

static PYTHON_DECLARATIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?m)^(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(").unwrap(),
        Regex::new(r"(?m)^class\s+([A-Za-z_]\w*)").unwrap(),
    ]
});

/// from .mod import a, b / from .. import (a, b)
static PYTHON_RELATIVE_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[\t ]*from\s+(\.+)([\w.]*)\s+import\s+(\([^)]*\)|[^\n#]+)").unwrap()
});

static PYTHON_ALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^__all__\s*=\s*[\[(]([^\])]*)[\])]").unwrap());

static QUOTED_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r#"['"](\w+)['"]"#).unwrap());

// =============================================================================
// RUST / GO PATTERNS
// =============================================================================

static RUST_DECLARATIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?m)^[\t ]*(?:pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?fn\s+([A-Za-z_]\w*)").unwrap(),
        Regex::new(r"(?m)^[\t ]*(?:pub(?:\([^)]*\))?\s+)?(?:struct|enum|trait|union|type)\s+([A-Za-z_]\w*)").unwrap(),
    ]
});

static RUST_EXPORTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^pub\s+(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:fn|struct|enum|trait|union|type|const|static|mod)\s+([A-Za-z_]\w*)").unwrap()
});

static GO_DECLARATIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?m)^func\s+(?:\([^)]*\)\s*)?([A-Za-z_]\w*)\s*[\[(]").unwrap(),
        Regex::new(r"(?m)^type\s+([A-Za-z_]\w*)\s").unwrap(),
    ]
});

// =============================================================================
// MAIN EXTRACTION FUNCTION
// =============================================================================

/// Extract signatures, relative imports and exports for `language`
pub fn extract(content: &str, language: Language) -> Extraction {
    match language {
        Language::JavaScript | Language::TypeScript => Extraction {
            signatures: declarations(content, &SCRIPT_DECLARATIONS, language),
            imports: relative_only(scan(content, &SCRIPT_IMPORTS)),
            exports: script_exports(content),
        },
        Language::Python => {
            let signatures = declarations(content, &PYTHON_DECLARATIONS, language);
            let exports = python_exports(content, &signatures);
            Extraction {
                signatures,
                imports: relative_only(python_imports(content)),
                exports,
            }
        }
        Language::Rust => Extraction {
            signatures: declarations(content, &RUST_DECLARATIONS, language),
            imports: Vec::new(),
            exports: Exports {
                named: RUST_EXPORTS
                    .captures_iter(content)
                    .filter_map(|c| c.get(1))
                    .map(|m| m.as_str().to_string())
                    .collect(),
                default: None,
            },
        },
        Language::Go => {
            let signatures = declarations(content, &GO_DECLARATIONS, language);
            let named = signatures
                .iter()
                .filter(|name| name.chars().next().is_some_and(|c| c.is_ascii_uppercase()))
                .cloned()
                .collect();
            Extraction {
                signatures,
                imports: Vec::new(),
                exports: Exports {
                    named,
                    default: None,
                },
            }
        }
        Language::Unknown => Extraction::default(),
    }
}

// =============================================================================
// SCANNING HELPERS
// =============================================================================

/// Capture group 1 of every pattern, in order of first appearance, deduplicated
fn scan(content: &str, patterns: &[Regex]) -> Vec<String> {
    let mut hits: Vec<(usize, &str)> = patterns
        .iter()
        .flat_map(|pattern| {
            pattern
                .captures_iter(content)
                .filter_map(|caps| caps.get(1))
                .map(|m| (m.start(), m.as_str()))
        })
        .collect();
    hits.sort_by_key(|(offset, _)| *offset);

    let mut seen = BTreeSet::new();
    hits.into_iter()
        .filter(|(_, name)| seen.insert(*name))
        .map(|(_, name)| name.to_string())
        .collect()
}

fn declarations(content: &str, patterns: &[Regex], language: Language) -> Vec<String> {
    scan(content, patterns)
        .into_iter()
        .filter(|name| !is_keyword(name, language))
        .take(MAX_SIGNATURES)
        .collect()
}

/// Keep `.`-prefixed specifiers, normalized to forward slashes
fn relative_only(specifiers: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    specifiers
        .into_iter()
        .map(|s| s.trim().replace('\\', "/"))
        .filter(|s| s.starts_with('.'))
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

// =============================================================================
// SCRIPT EXPORTS
// =============================================================================

fn script_exports(content: &str) -> Exports {
    let mut exports = Exports::default();

    for caps in SCRIPT_EXPORT_DECL.captures_iter(content) {
        if let Some(name) = caps.get(1) {
            exports.named.insert(name.as_str().to_string());
        }
    }

    for caps in SCRIPT_EXPORT_NAMESPACE.captures_iter(content) {
        if let Some(name) = caps.get(1) {
            exports.named.insert(name.as_str().to_string());
        }
    }

    for caps in SCRIPT_EXPORT_LIST.captures_iter(content) {
        let Some(list) = caps.get(1) else { continue };
        for item in list.as_str().split(',') {
            let item = item.trim().trim_start_matches("type ").trim();
            if item.is_empty() {
                continue;
            }
            let (local, exported) = match item.split_once(" as ") {
                Some((local, exported)) => (local.trim(), exported.trim()),
                None => (item, item),
            };
            if exported == "default" {
                exports.default = Some(local.to_string());
            } else if IDENTIFIER.is_match(exported) {
                exports.named.insert(exported.to_string());
            }
        }
    }

    for m in SCRIPT_EXPORT_DEFAULT.find_iter(content) {
        exports.default = Some(default_name(&content[m.end()..]));
    }

    for m in COMMONJS_EXPORT_ASSIGN.find_iter(content) {
        let rest = &content[m.end()..];
        if let Some(body) = rest.strip_prefix('{') {
            let body = body.split('}').next().unwrap_or("");
            for key in body.split(',') {
                let key = key.trim();
                if let Some(ident) = IDENTIFIER.find(key) {
                    exports.named.insert(ident.as_str().to_string());
                }
            }
        } else {
            exports.default = Some(default_name(rest));
        }
    }

    for caps in COMMONJS_EXPORT_PROPERTY.captures_iter(content) {
        if let Some(name) = caps.get(1) {
            exports.named.insert(name.as_str().to_string());
        }
    }

    exports
}

/// Name of a default-exported expression, `"default"` when anonymous
fn default_name(expr: &str) -> String {
    let expr = expr.trim_start();
    let expr = expr.strip_prefix("async ").map(str::trim_start).unwrap_or(expr);

    let rest = if let Some(rest) = strip_keyword(expr, "function") {
        Some(rest.trim_start().trim_start_matches('*').trim_start())
    } else if let Some(rest) = strip_keyword(expr, "abstract class") {
        Some(rest.trim_start())
    } else {
        strip_keyword(expr, "class").map(str::trim_start)
    };

    let candidate = rest.unwrap_or(expr);
    match IDENTIFIER.find(candidate) {
        Some(m) if !is_keyword(m.as_str(), Language::JavaScript) && (rest.is_some() || ends_expression(&candidate[m.end()..])) => {
            m.as_str().to_string()
        }
        _ => "default".to_string(),
    }
}

/// Strip a leading keyword that is not the prefix of a longer identifier
fn strip_keyword<'a>(expr: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = expr.strip_prefix(keyword)?;
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' || c == '$' => None,
        _ => Some(rest),
    }
}

/// True when a bare identifier is the whole exported expression
fn ends_expression(rest: &str) -> bool {
    let rest = rest.trim_start_matches([' ', '\t']);
    rest.is_empty() || rest.starts_with(';') || rest.starts_with('\n') || rest.starts_with('\r')
}

// =============================================================================
// PYTHON HELPERS
// =============================================================================

fn python_imports(content: &str) -> Vec<String> {
    let mut hits: Vec<(usize, String)> = Vec::new();

    for caps in PYTHON_RELATIVE_IMPORT.captures_iter(content) {
        let (Some(dots), Some(names)) = (caps.get(1), caps.get(3)) else {
            continue;
        };
        let module = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let prefix = match dots.as_str().len() {
            1 => "./".to_string(),
            n => "../".repeat(n - 1),
        };

        if !module.is_empty() {
            hits.push((dots.start(), format!("{}{}", prefix, module.replace('.', "/"))));
            continue;
        }

        let names = names.as_str().trim().trim_start_matches('(').trim_end_matches(')');
        for name in names.split(',') {
            let name = name.split(" as ").next().unwrap_or("").trim();
            if name.is_empty() || name == "*" {
                continue;
            }
            hits.push((dots.start(), format!("{}{}", prefix, name)));
        }
    }

    hits.into_iter().map(|(_, spec)| spec).collect()
}

fn python_exports(content: &str, signatures: &[String]) -> Exports {
    let named = match PYTHON_ALL.captures(content).and_then(|c| c.get(1)) {
        Some(list) => QUOTED_NAME
            .captures_iter(list.as_str())
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect(),
        None => signatures
            .iter()
            .filter(|name| !name.starts_with('_'))
            .cloned()
            .collect(),
    };

    Exports {
        named,
        default: None,
    }
}

// =============================================================================
// KEYWORDS
// =============================================================================

/// Check if a captured name is a reserved word of `language` rather than a
/// declaration
fn is_keyword(name: &str, language: Language) -> bool {
    match language {
        Language::JavaScript | Language::TypeScript => matches!(
            name,
            "if" | "else" | "for" | "while" | "do" | "switch" | "case" | "default"
                | "break" | "continue" | "return" | "throw" | "try" | "catch" | "finally"
                | "var" | "let" | "const" | "function" | "class" | "extends" | "implements"
                | "import" | "export" | "new" | "typeof" | "instanceof" | "in" | "delete"
                | "async" | "await" | "yield" | "with" | "debugger" | "enum" | "undefined"
                | "true" | "false" | "null" | "void" | "this" | "super"
        ),
        Language::Python => matches!(
            name,
            "if" | "elif" | "else" | "for" | "while" | "break" | "continue" | "return"
                | "def" | "class" | "lambda" | "with" | "pass" | "raise" | "try" | "except"
                | "finally" | "import" | "from" | "as" | "global" | "nonlocal" | "del"
                | "assert" | "async" | "await" | "yield" | "in" | "is" | "not" | "and" | "or"
                | "None" | "True" | "False"
        ),
        Language::Rust => matches!(
            name,
            "fn" | "pub" | "mod" | "use" | "crate" | "impl" | "where" | "match" | "if"
                | "else" | "for" | "while" | "loop" | "return" | "let" | "const" | "static"
                | "struct" | "enum" | "trait" | "type" | "union" | "unsafe" | "async" | "await"
                | "self" | "Self" | "super" | "move" | "ref" | "mut" | "dyn" | "as" | "in"
                | "true" | "false"
        ),
        Language::Go => matches!(
            name,
            "func" | "package" | "import" | "go" | "defer" | "if" | "else" | "for" | "range"
                | "switch" | "case" | "default" | "select" | "return" | "break" | "continue"
                | "var" | "const" | "type" | "struct" | "interface" | "map" | "chan"
                | "fallthrough" | "goto"
        ),
        Language::Unknown => false,
    }
}

// =============================================================================
// TESTS
// =============================================================================
