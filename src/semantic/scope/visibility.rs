//! Visibility filtering for scope traversal.

use crate::syntax::Visibility;

/// Depth-bounded visibility filter carried through a scope traversal.
///
/// `tier` is the strictest member visibility currently admitted (ordered
/// `Public < Protected < Private`). Non-public tiers are only honored down
/// to `depth` more traversal levels; past that the stricter `next` tier
/// takes over. This models the rule that private/protected members are
/// visible one level into a nested scope but must not leak transitively
/// through stacked inheritance or import layers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VisibilityPolicy {
    pub tier: Visibility,
    pub depth: u32,
    pub next: Visibility,
}

impl VisibilityPolicy {
    /// The view from inside the scope itself: everything is admissible at
    /// this level, protected members one level further down.
    pub const INSIDE: VisibilityPolicy = VisibilityPolicy {
        tier: Visibility::Private,
        depth: 1,
        next: Visibility::Protected,
    };

    /// The view from outside: public members only.
    pub const OUTSIDE: VisibilityPolicy = VisibilityPolicy {
        tier: Visibility::Public,
        depth: 0,
        next: Visibility::Public,
    };

    /// Whether a member with declared visibility `v` passes this filter.
    pub fn allows(&self, v: Visibility) -> bool {
        v <= self.tier
    }

    /// The policy one traversal level further down, additionally capped at
    /// `cap` (inherited scopes cap at `Protected`, imported scopes at
    /// `Public`).
    pub fn descend(&self, cap: Visibility) -> VisibilityPolicy {
        let tier = if self.depth > 0 { self.tier } else { self.next };
        VisibilityPolicy {
            tier: tier.min(cap),
            depth: self.depth.saturating_sub(1),
            next: self.next.min(cap),
        }
    }
}
