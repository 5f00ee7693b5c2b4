//! The shared mutable state threaded through one build pass.

use rustc_hash::FxHashSet;

use super::registry::SetupRegistry;
use crate::semantic::element::{ElementId, Model};
use crate::semantic::evaluate::Evaluate;
use crate::semantic::types::BuildOptions;
use crate::semantic::workspace::{Documents, GlobalIndex};

/// Split borrows of the workspace, passed through every scope, linker, and
/// builder call of one pass.
///
/// Construction, lookup, and linking are mutually recursive; routing them
/// all through one context keeps the borrow surface to a single `&mut` and
/// gives the recursion guards (`alias_visiting`, `depth`) one home.
pub struct BuildCtx<'a> {
    pub model: &'a mut Model,
    pub documents: &'a mut Documents,
    pub index: &'a mut GlobalIndex,
    pub options: &'a BuildOptions,
    pub registry: &'a SetupRegistry,
    pub evaluator: Option<&'a dyn Evaluate>,
    /// Alias elements currently being resolved higher up the stack.
    pub alias_visiting: FxHashSet<ElementId>,
    /// Current ensure-setup nesting depth, for trace indentation and the
    /// runaway-recursion warning.
    pub depth: usize,
}
