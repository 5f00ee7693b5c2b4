//! Diagnostics — accumulated semantic error reporting.

use std::sync::Arc;

use crate::base::{DocumentId, Span};

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic message attached to a source range.
///
/// Nodes without a concrete position fall back to [`Span::ZERO`].
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub document: DocumentId,
    pub span: Span,
    pub severity: Severity,
    /// Diagnostic code (e.g. "link-unresolved").
    pub code: Option<&'static str>,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(document: DocumentId, span: Option<Span>, message: impl Into<Arc<str>>) -> Self {
        Self {
            document,
            span: span.unwrap_or(Span::ZERO),
            severity: Severity::Error,
            code: None,
            message: message.into(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(document: DocumentId, span: Option<Span>, message: impl Into<Arc<str>>) -> Self {
        Self {
            document,
            span: span.unwrap_or(Span::ZERO),
            severity: Severity::Warning,
            code: None,
            message: message.into(),
        }
    }

    /// Attach a diagnostic code.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_span_falls_back_to_zero() {
        let d = Diagnostic::error(DocumentId::new(0), None, "boom");
        assert!(d.span.is_zero());
        assert_eq!(d.severity.to_lsp(), 1);
    }
}
