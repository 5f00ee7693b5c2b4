//! Scope engine — lazily composed views of owned, inherited, and imported
//! members, with visibility and depth filtering.

mod engine;
mod visibility;

pub use engine::{AliasPolicy, ScopeOptions};
pub use visibility::VisibilityPolicy;

pub(crate) use engine::{all_visible_from, all_visible_in, lookup_from, lookup_in};
