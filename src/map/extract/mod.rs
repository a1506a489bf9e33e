//! Lexical Extractor
//!
//! Turns one file's text into its declared signatures, relative import
//! specifiers and exported names. The default [`RegexExtractor`] is a
//! best-effort lexical scanner; the [`Extractor`] trait is the seam where a
//! stricter, AST-backed extractor can be substituted per language without
//! touching the builder or the graph queries.
//!
//! @module map/extract

pub mod lexical;

use std::path::Path;

use crate::map::types::Exports;

// =============================================================================
// EXTRACTED DATA
// =============================================================================

/// Structural data extracted from one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Declaration names, first-seen order, capped
    pub signatures: Vec<String>,
    /// Relative import specifiers, deduplicated
    pub imports: Vec<String>,
    pub exports: Exports,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty() && self.imports.is_empty() && self.exports.is_empty()
    }
}

// =============================================================================
// LANGUAGE DETECTION
// =============================================================================

/// Pattern family selected for a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Rust,
    Go,
    Unknown,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Unknown => "unknown",
        }
    }
}

/// Detect language from file path extension
pub fn detect_language(path: &str) -> Language {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| match ext.to_lowercase().as_str() {
            "js" | "jsx" | "mjs" | "cjs" | "vue" | "svelte" => Language::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "py" | "pyi" => Language::Python,
            "rs" => Language::Rust,
            "go" => Language::Go,
            _ => Language::Unknown,
        })
        .unwrap_or(Language::Unknown)
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// Extracts structural data from a file's (already size-truncated) content.
///
/// Implementations must not fail: unparseable input yields empty collections.
pub trait Extractor: Send + Sync {
    fn extract(&self, path: &str, content: &str) -> Extraction;
}

/// Regex pattern sets per language
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexExtractor;

impl Extractor for RegexExtractor {
    fn extract(&self, path: &str, content: &str) -> Extraction {
        if content.trim().is_empty() {
            return Extraction::default();
        }
        lexical::extract(content, detect_language(path))
    }
}

/// Extract with the default regex extractor
pub fn extract_file(path: &str, content: &str) -> Extraction {
    RegexExtractor.extract(path, content)
}

// =============================================================================
// TESTS
// =============================================================================
