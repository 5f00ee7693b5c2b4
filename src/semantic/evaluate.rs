//! Expression evaluation seam.
//!
//! The builder needs metadata expression values (a metadata usage's
//! arguments) during construction, but evaluation itself lives outside this
//! crate. Embedders plug an evaluator into the workspace; without one,
//! metadata usages build structurally and their values stay unknown.

use thiserror::Error;

use crate::semantic::element::{ElementId, Model};
use smol_str::SmolStr;

/// An evaluated model-level value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Rational(f64),
    Text(SmolStr),
    /// A reference to another element (e.g. an enum member).
    Reference(ElementId),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    #[error("expression is not evaluable: {0}")]
    NotEvaluable(String),
    #[error("unresolved reference in expression")]
    Unresolved,
}

/// Evaluates expression elements against a (partially) linked model.
///
/// Implementations must tolerate unresolved references inside the
/// expression; construction continues regardless of evaluation failures.
pub trait Evaluate {
    fn evaluate(
        &self,
        model: &Model,
        expression: ElementId,
        context: ElementId,
    ) -> Result<Vec<Value>, EvalError>;
}
