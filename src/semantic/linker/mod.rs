//! Reference linker — resolves qualified reference chains against the scope
//! engine, follows aliases, and classifies link failures.

mod reference;
mod resolve;

pub use reference::{ChainOutcome, ElementReference, SegmentState};

pub(crate) use resolve::{resolve_alias, resolve_reference};
