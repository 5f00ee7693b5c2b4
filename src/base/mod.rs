//! Foundation types for the sylink toolchain.
//!
//! This module provides fundamental types used throughout the core:
//! - [`DocumentId`] - Interned document identifiers
//! - [`Position`], [`Span`] - Line/column positions for syntax nodes
//!
//! This module has NO dependencies on other sylink modules.

mod document_id;
mod span;

pub use document_id::DocumentId;
pub use span::{Position, Span};
