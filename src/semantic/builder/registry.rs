//! The setup registry — construction behavior registered per syntax kind.
//!
//! Rules registered against an abstract kind apply to every subtype; the
//! rules for a concrete kind are the merge of its whole ancestry, ordered
//! by priority. This is how "every type links its specializations" is
//! stated once instead of per definition kind.

use rustc_hash::FxHashMap;

use super::context::BuildCtx;
use super::{implicit, redefine, setup};
use crate::semantic::element::ElementId;
use crate::syntax::SyntaxKind;

/// One setup step for one element.
pub type SetupFn = fn(&mut BuildCtx<'_>, ElementId);

/// A registered construction rule.
pub struct SetupRule {
    pub kind: SyntaxKind,
    /// Lower runs earlier within one element's setup.
    pub priority: u32,
    /// Stable label for traces.
    pub name: &'static str,
    pub run: SetupFn,
}

/// Kind-indexed rule table, fixed at workspace construction.
#[derive(Default)]
pub struct SetupRegistry {
    rules: FxHashMap<SyntaxKind, Vec<SetupRule>>,
}

impl SetupRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard rule set covering namespaces, types, invocable
    /// features, and metadata.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(SetupRule {
            kind: SyntaxKind::Namespace,
            priority: 10,
            name: "resolve-imports",
            run: setup::setup_namespace_imports,
        });
        registry.register(SetupRule {
            kind: SyntaxKind::Type,
            priority: 20,
            name: "link-generalizations",
            run: setup::setup_type_generalizations,
        });
        registry.register(SetupRule {
            kind: SyntaxKind::Type,
            priority: 30,
            name: "implicit-library-relations",
            run: implicit::setup_implicit_relations,
        });
        registry.register(SetupRule {
            kind: SyntaxKind::Behavior,
            priority: 40,
            name: "positional-parameter-redefinitions",
            run: redefine::setup_parameter_redefinitions,
        });
        registry.register(SetupRule {
            kind: SyntaxKind::Step,
            priority: 40,
            name: "positional-parameter-redefinitions",
            run: redefine::setup_parameter_redefinitions,
        });
        registry.register(SetupRule {
            kind: SyntaxKind::ActionUsage,
            priority: 40,
            name: "positional-parameter-redefinitions",
            run: redefine::setup_parameter_redefinitions,
        });
        registry.register(SetupRule {
            kind: SyntaxKind::MetadataUsage,
            priority: 50,
            name: "evaluate-metadata",
            run: setup::setup_metadata_evaluation,
        });
        registry
    }

    pub fn register(&mut self, rule: SetupRule) {
        self.rules.entry(rule.kind).or_default().push(rule);
    }

    /// All rules applying to a concrete kind: its own plus everything
    /// registered on its ancestors, stably sorted by priority so rules of
    /// equal priority keep registration order (ancestor-first).
    pub fn rules_for(&self, kind: SyntaxKind) -> Vec<&SetupRule> {
        let mut ancestry: Vec<SyntaxKind> = kind.ancestry().collect();
        ancestry.reverse();
        let mut merged: Vec<&SetupRule> = ancestry
            .into_iter()
            .filter_map(|k| self.rules.get(&k))
            .flatten()
            .collect();
        merged.sort_by_key(|r| r.priority);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_merge_along_ancestry() {
        let registry = SetupRegistry::standard();

        // A package is a namespace but not a type
        let package_rules: Vec<_> = registry
            .rules_for(SyntaxKind::Package)
            .iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(package_rules, vec!["resolve-imports"]);

        // A part definition inherits namespace and type rules in order
        let part_rules: Vec<_> = registry
            .rules_for(SyntaxKind::PartDefinition)
            .iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(
            part_rules,
            vec![
                "resolve-imports",
                "link-generalizations",
                "implicit-library-relations"
            ]
        );
    }

    #[test]
    fn test_state_usage_gets_parameter_rule_once_per_registration() {
        let registry = SetupRegistry::standard();
        let names: Vec<_> = registry
            .rules_for(SyntaxKind::StateUsage)
            .iter()
            .map(|r| r.name)
            .collect();
        // StateUsage is an ActionUsage but not a Step or Behavior, so
        // exactly one parameter rule applies.
        assert_eq!(
            names
                .iter()
                .filter(|n| **n == "positional-parameter-redefinitions")
                .count(),
            1
        );
    }
}
