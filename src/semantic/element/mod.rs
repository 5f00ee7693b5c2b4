//! Semantic element model — per-node meta objects, relationships, and the
//! arena that owns them.

mod element;
mod model;
mod relationship;

pub use element::{Element, ElementId, MemberDescription, SetupState};
pub use model::Model;
pub use relationship::{Relationship, RelationshipKind};
