//! Positional parameter redefinition.
//!
//! An invocable type's directed features are its parameters, in declaration
//! order. Each parameter implicitly redefines the parameter at the same
//! position in the first supertype that has one, unless the user already
//! wrote an explicit redefinition on it.

use tracing::trace;

use super::context::BuildCtx;
use crate::semantic::element::{ElementId, Relationship, RelationshipKind};
use crate::syntax::SyntaxKind;

/// Directed, non-reference features of a type, in declaration order.
fn positional_parameters(ctx: &BuildCtx<'_>, ty: ElementId) -> Vec<ElementId> {
    ctx.model
        .get(ty)
        .children
        .values()
        .filter(|d| !d.is_alias)
        .map(|d| d.element)
        .filter(|&e| {
            let el = ctx.model.get(e);
            el.direction.is_some() && !el.is(SyntaxKind::ReferenceUsage)
        })
        .collect()
}

/// Behavior/step rule: pair own parameters with inherited ones by position.
pub(super) fn setup_parameter_redefinitions(ctx: &mut BuildCtx<'_>, element: ElementId) {
    let own = positional_parameters(ctx, element);
    if own.is_empty() {
        return;
    }

    // Direct supertypes only; their own parameter redefinitions chain the
    // positions further up once they are set up.
    let supertypes = ctx.model.supertypes(element);
    for supertype in &supertypes {
        super::ensure_setup(ctx, *supertype);
    }

    for supertype in supertypes {
        let inherited = positional_parameters(ctx, supertype);
        for (position, &parameter) in own.iter().enumerate() {
            let Some(&redefined) = inherited.get(position) else {
                break;
            };
            if parameter == redefined {
                continue;
            }
            if ctx
                .model
                .has_explicit(parameter, RelationshipKind::Redefinition)
            {
                continue;
            }
            if ctx
                .model
                .add_relationship(
                    parameter,
                    Relationship::implied(RelationshipKind::Redefinition, redefined),
                )
            {
                trace!(
                    "[BUILD] parameter {} redefines {} (position {})",
                    ctx.model.display_name(parameter),
                    ctx.model.display_name(redefined),
                    position
                );
            }
        }
    }
}
