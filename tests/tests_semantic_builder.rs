#![allow(clippy::unwrap_used)]
//! Builder passes: implicit library relationships, positional parameter
//! redefinition, metadata evaluation, and cancellation.

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use helpers::{build, mini_stdlib};
use sylink::semantic::{
    BuildError, BuildOptions, BuildState, EvalError, Evaluate, ElementId, Model,
    RelationshipKind, StdlibMode, Value, Workspace,
};
use sylink::syntax::{Direction, ReferenceRole, SyntaxKind, TreeBuilder};
use tokio_util::sync::CancellationToken;

#[test]
fn test_part_definition_gets_implied_specialization() {
    let mut ws = Workspace::new(BuildOptions::default());
    ws.add_document("stdlib.kerml", "kerml", mini_stdlib());

    let mut b = TreeBuilder::new();
    let pkg = b.add_named(b.root(), SyntaxKind::Package, "M");
    let vehicle = b.add_named(pkg, SyntaxKind::PartDefinition, "Vehicle");
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let vehicle_el = ws.model().element_for_node(doc, vehicle).unwrap();
    let base = ws.find_element("Parts::Part").unwrap();
    assert_eq!(ws.model().supertypes(vehicle_el), vec![base]);
    let rel = &ws.model().get(vehicle_el).relationships[0];
    assert!(rel.is_implied);
    assert_eq!(rel.kind, RelationshipKind::Specialization);
}

#[test]
fn test_usage_gets_implied_subsetting() {
    let mut ws = Workspace::new(BuildOptions::default());
    ws.add_document("stdlib.kerml", "kerml", mini_stdlib());

    let mut b = TreeBuilder::new();
    let pkg = b.add_named(b.root(), SyntaxKind::Package, "M");
    let wheels = b.add_named(pkg, SyntaxKind::PartUsage, "wheels");
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let wheels_el = ws.model().element_for_node(doc, wheels).unwrap();
    let base = ws.find_element("Parts::parts").unwrap();
    assert_eq!(
        ws.model().targets_of(wheels_el, RelationshipKind::Subsetting),
        vec![base]
    );
}

#[test]
fn test_explicit_specialization_suppresses_implied() {
    let mut ws = Workspace::new(BuildOptions::default());
    ws.add_document("stdlib.kerml", "kerml", mini_stdlib());

    let mut b = TreeBuilder::new();
    let pkg = b.add_named(b.root(), SyntaxKind::Package, "M");
    let vehicle = b.add_named(pkg, SyntaxKind::PartDefinition, "Vehicle");
    let car = b.add_named(pkg, SyntaxKind::PartDefinition, "Car");
    b.add_reference(car, ReferenceRole::Specialization, &["Vehicle"]);
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let vehicle_el = ws.model().element_for_node(doc, vehicle).unwrap();
    let car_el = ws.model().element_for_node(doc, car).unwrap();
    // Car got only its explicit supertype; Vehicle got the library base
    assert_eq!(ws.model().supertypes(car_el), vec![vehicle_el]);
    assert_eq!(ws.model().supertypes(vehicle_el).len(), 1);
}

#[test]
fn test_library_base_has_no_self_edge() {
    let mut ws = Workspace::new(BuildOptions::default());
    let stdlib = ws.add_document("stdlib.kerml", "kerml", mini_stdlib());
    build(&mut ws);

    let part = ws.find_element("Parts::Part").unwrap();
    assert!(ws.model().supertypes(part).is_empty());
    assert!(ws.diagnostics(stdlib).is_empty());
}

#[test]
fn test_missing_library_element_diagnosed_in_full_mode() {
    let mut ws = Workspace::new(BuildOptions::default());
    let mut b = TreeBuilder::new();
    b.add_named(b.root(), SyntaxKind::PartDefinition, "Lonely");
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    assert!(
        ws.diagnostics(doc)
            .iter()
            .any(|d| d.code == Some("stdlib-missing")),
        "expected a missing-library diagnostic"
    );
}

#[test]
fn test_missing_library_element_tolerated_in_local_only_mode() {
    let mut ws = Workspace::new(BuildOptions {
        stdlib: StdlibMode::LocalOnly,
        ..Default::default()
    });
    let mut b = TreeBuilder::new();
    b.add_named(b.root(), SyntaxKind::PartDefinition, "Lonely");
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    assert!(ws.diagnostics(doc).is_empty());
}

#[test]
fn test_positional_parameters_redefine_in_order() {
    // action def Go { in a; in b; }
    // action def Fast :> Go { in x; in y; }
    let mut b = TreeBuilder::new();
    let pkg = b.add_named(b.root(), SyntaxKind::Package, "M");
    let go = b.add_named(pkg, SyntaxKind::ActionDefinition, "Go");
    let a = b.add_named(go, SyntaxKind::AttributeUsage, "a");
    b.set_direction(a, Direction::In);
    let bb = b.add_named(go, SyntaxKind::AttributeUsage, "b");
    b.set_direction(bb, Direction::In);
    let fast = b.add_named(pkg, SyntaxKind::ActionDefinition, "Fast");
    b.add_reference(fast, ReferenceRole::Specialization, &["Go"]);
    let x = b.add_named(fast, SyntaxKind::AttributeUsage, "x");
    b.set_direction(x, Direction::In);
    let y = b.add_named(fast, SyntaxKind::AttributeUsage, "y");
    b.set_direction(y, Direction::In);

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let get = |n| ws.model().element_for_node(doc, n).unwrap();
    assert_eq!(
        ws.model().targets_of(get(x), RelationshipKind::Redefinition),
        vec![get(a)]
    );
    assert_eq!(
        ws.model().targets_of(get(y), RelationshipKind::Redefinition),
        vec![get(bb)]
    );
}

#[test]
fn test_explicit_redefinition_wins_over_positional() {
    // action def Fast :> Go { in x :>> b; } pairs x with b, not a
    let mut b = TreeBuilder::new();
    let pkg = b.add_named(b.root(), SyntaxKind::Package, "M");
    let go = b.add_named(pkg, SyntaxKind::ActionDefinition, "Go");
    let a = b.add_named(go, SyntaxKind::AttributeUsage, "a");
    b.set_direction(a, Direction::In);
    let bb = b.add_named(go, SyntaxKind::AttributeUsage, "b");
    b.set_direction(bb, Direction::In);
    let fast = b.add_named(pkg, SyntaxKind::ActionDefinition, "Fast");
    b.add_reference(fast, ReferenceRole::Specialization, &["Go"]);
    let x = b.add_named(fast, SyntaxKind::AttributeUsage, "x");
    b.set_direction(x, Direction::In);
    b.add_reference(x, ReferenceRole::Redefinition, &["b"]);

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let x_el = ws.model().element_for_node(doc, x).unwrap();
    let b_el = ws.model().element_for_node(doc, bb).unwrap();
    assert_eq!(
        ws.model().targets_of(x_el, RelationshipKind::Redefinition),
        vec![b_el]
    );
}

#[test]
fn test_undirected_features_are_not_parameters() {
    let mut b = TreeBuilder::new();
    let pkg = b.add_named(b.root(), SyntaxKind::Package, "M");
    let go = b.add_named(pkg, SyntaxKind::ActionDefinition, "Go");
    let a = b.add_named(go, SyntaxKind::AttributeUsage, "a");
    b.set_direction(a, Direction::In);
    let fast = b.add_named(pkg, SyntaxKind::ActionDefinition, "Fast");
    b.add_reference(fast, ReferenceRole::Specialization, &["Go"]);
    // Plain member, no direction: must not pair with Go::a
    let plain = b.add_named(fast, SyntaxKind::AttributeUsage, "plain");

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let plain_el = ws.model().element_for_node(doc, plain).unwrap();
    assert!(
        ws.model()
            .targets_of(plain_el, RelationshipKind::Redefinition)
            .is_empty()
    );
}

#[test]
fn test_nested_feature_is_featured_by_its_type() {
    let mut b = TreeBuilder::new();
    let pkg = b.add_named(b.root(), SyntaxKind::Package, "M");
    let vehicle = b.add_named(pkg, SyntaxKind::PartDefinition, "Vehicle");
    let wheel = b.add_named(vehicle, SyntaxKind::PartUsage, "wheel");

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let vehicle_el = ws.model().element_for_node(doc, vehicle).unwrap();
    let wheel_el = ws.model().element_for_node(doc, wheel).unwrap();
    assert_eq!(
        ws.model().targets_of(wheel_el, RelationshipKind::Featuring),
        vec![vehicle_el]
    );
    // Package-owned definitions have no featuring context
    assert!(
        ws.model()
            .targets_of(vehicle_el, RelationshipKind::Featuring)
            .is_empty()
    );
}

struct CountingEvaluator {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl Evaluate for CountingEvaluator {
    fn evaluate(
        &self,
        _model: &Model,
        _expression: ElementId,
        _context: ElementId,
    ) -> Result<Vec<Value>, EvalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(EvalError::NotEvaluable("no literal".into()))
        } else {
            Ok(vec![Value::Integer(42)])
        }
    }
}

fn metadata_tree() -> sylink::syntax::SyntaxTree {
    let mut b = TreeBuilder::new();
    let pkg = b.add_named(b.root(), SyntaxKind::Package, "M");
    let meta = b.add_named(pkg, SyntaxKind::MetadataUsage, "safety");
    b.add_named(meta, SyntaxKind::LiteralExpression, "level");
    b.finish()
}

#[test]
fn test_metadata_expressions_reach_the_evaluator() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    ws.set_evaluator(Box::new(CountingEvaluator {
        calls: calls.clone(),
        fail: false,
    }));
    let doc = ws.add_document("m.sysml", "sysml", metadata_tree());
    build(&mut ws);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(ws.diagnostics(doc).is_empty());
}

#[test]
fn test_metadata_evaluation_failure_is_a_warning() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    ws.set_evaluator(Box::new(CountingEvaluator { calls, fail: true }));
    let doc = ws.add_document("m.sysml", "sysml", metadata_tree());
    build(&mut ws);

    let diags = ws.diagnostics(doc);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, Some("metadata-eval"));
    assert_eq!(diags[0].severity.to_lsp(), 2);
}

#[test]
fn test_without_evaluator_metadata_builds_silently() {
    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", metadata_tree());
    build(&mut ws);
    assert!(ws.diagnostics(doc).is_empty());
}

#[test]
fn test_cancellation_leaves_resumable_state() {
    let mut b = TreeBuilder::new();
    let pkg = b.add_named(b.root(), SyntaxKind::Package, "M");
    let a = b.add_named(pkg, SyntaxKind::PartDefinition, "A");
    let c = b.add_named(pkg, SyntaxKind::PartDefinition, "C");
    let r = b.add_reference(c, ReferenceRole::Specialization, &["A"]);

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());

    let cancelled = CancellationToken::new();
    cancelled.cancel();
    assert_eq!(ws.build_all(&cancelled), Err(BuildError::Cancelled));
    assert_eq!(ws.document(doc).unwrap().state, BuildState::Parsed);

    // The next build picks up where the cancelled one stopped
    build(&mut ws);
    assert_eq!(ws.document(doc).unwrap().state, BuildState::Linked);
    let a_el = ws.model().element_for_node(doc, a).unwrap();
    assert_eq!(ws.resolved_target(doc, r), Some(a_el));
}

#[test]
fn test_setup_runs_once_per_element() {
    // Two references into the same namespace must not duplicate implied
    // relationships or member tables.
    let mut ws = Workspace::new(BuildOptions::default());
    ws.add_document("stdlib.kerml", "kerml", mini_stdlib());

    let mut b = TreeBuilder::new();
    let pkg = b.add_named(b.root(), SyntaxKind::Package, "M");
    let vehicle = b.add_named(pkg, SyntaxKind::PartDefinition, "Vehicle");
    let car = b.add_named(pkg, SyntaxKind::PartDefinition, "Car");
    b.add_reference(car, ReferenceRole::Specialization, &["Vehicle"]);
    let bus = b.add_named(pkg, SyntaxKind::PartDefinition, "Bus");
    b.add_reference(bus, ReferenceRole::Specialization, &["Vehicle"]);
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);
    build(&mut ws);

    let vehicle_el = ws.model().element_for_node(doc, vehicle).unwrap();
    assert_eq!(ws.model().get(vehicle_el).relationships.len(), 1);
}
