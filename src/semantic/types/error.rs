//! Error types for linking and metamodel construction.
//!
//! Everything here is accumulated into per-document diagnostics, never
//! propagated across the public API as a failure — a document with broken
//! references still builds to a queryable (partially linked) model.

use smol_str::SmolStr;
use thiserror::Error;

use crate::syntax::SyntaxKind;

/// The kind of element a reference role expects its final target to be.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExpectedKind {
    Namespace,
    Type,
    Classifier,
    Feature,
    Element,
}

impl ExpectedKind {
    /// Whether a concrete syntax kind satisfies this expectation.
    pub fn matches(self, kind: SyntaxKind) -> bool {
        match self {
            ExpectedKind::Namespace => kind.is_a(SyntaxKind::Namespace),
            ExpectedKind::Type => kind.is_a(SyntaxKind::Type),
            ExpectedKind::Classifier => kind.is_a(SyntaxKind::Classifier),
            ExpectedKind::Feature => kind.is_a(SyntaxKind::Feature),
            ExpectedKind::Element => true,
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            ExpectedKind::Namespace => "a namespace",
            ExpectedKind::Type => "a type",
            ExpectedKind::Classifier => "a classifier",
            ExpectedKind::Feature => "a feature",
            ExpectedKind::Element => "an element",
        }
    }
}

/// A reference chain segment failed to resolve.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LinkError {
    /// No candidate found for a segment. `path` is the partial path of the
    /// segments that did resolve.
    #[error("could not resolve '{segment}'{}", partial_path_suffix(.path))]
    UnresolvedSegment {
        segment: SmolStr,
        index: usize,
        path: String,
    },

    /// A candidate resolved but has the wrong kind for the reference role.
    #[error(
        "'{found_name}' is {} ({found_kind:?}), expected {}",
        .found_kind.display(),
        .expected.display()
    )]
    WrongKind {
        found_name: String,
        found_kind: SyntaxKind,
        expected: ExpectedKind,
    },

    /// The alias visiting guard closed a cycle.
    #[error("circular alias chain through '{alias}'")]
    CircularAlias { alias: SmolStr },

    /// A resolved import target cannot actually be imported from.
    #[error("import target '{path}' is not a namespace")]
    InvalidImport { path: String },
}

fn partial_path_suffix(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" in '{path}'")
    }
}

/// A non-reference-resolution problem discovered during construction.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SemanticError {
    /// An implicit-synthesis lookup expected a standard-library element
    /// that is not loaded. Non-fatal; the build continues.
    #[error("standard library element '{qualified_name}' not found")]
    MissingLibraryElement { qualified_name: SmolStr },

    /// Evaluation of a metadata expression failed.
    #[error("could not evaluate metadata expression: {message}")]
    MetadataEvaluation { message: String },

    /// An internal fault downgraded at the outer boundary.
    #[error("internal: {message}")]
    Internal { message: String },
}

/// Failure of a whole build pass. The only variant the public build API
/// ever returns is cancellation; everything else degrades to diagnostics.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("build cancelled")]
    Cancelled,
}
