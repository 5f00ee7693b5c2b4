#![allow(clippy::unwrap_used)]
//! Import kinds, import visibility, and re-export behavior.

mod helpers;

use helpers::build;
use rstest::rstest;
use sylink::semantic::{BuildOptions, RelationshipKind, Workspace};
use sylink::syntax::{ImportKind, ReferenceRole, SyntaxKind, TreeBuilder, Visibility};

/// `package P { package Q { part def R { part def S; } } }`
fn nested_packages(b: &mut TreeBuilder) {
    let p = b.add_named(b.root(), SyntaxKind::Package, "P");
    let q = b.add_named(p, SyntaxKind::Package, "Q");
    let r = b.add_named(q, SyntaxKind::PartDefinition, "R");
    b.add_named(r, SyntaxKind::PartDefinition, "S");
}

#[rstest]
// import P::Q; brings exactly Q
#[case(ImportKind::Specific, &["P", "Q"], "Q", true)]
#[case(ImportKind::Specific, &["P", "Q"], "R", false)]
// import P::Q::*; brings Q's members but not Q
#[case(ImportKind::Wildcard, &["P", "Q"], "R", true)]
#[case(ImportKind::Wildcard, &["P", "Q"], "Q", false)]
#[case(ImportKind::Wildcard, &["P", "Q"], "S", false)]
// import P::Q::**; brings Q and its closure
#[case(ImportKind::Recursive, &["P", "Q"], "Q", true)]
#[case(ImportKind::Recursive, &["P", "Q"], "R", true)]
#[case(ImportKind::Recursive, &["P", "Q"], "S", true)]
// import P::Q::*::**; brings the closure but not Q itself
#[case(ImportKind::RecursiveExclusive, &["P", "Q"], "Q", false)]
#[case(ImportKind::RecursiveExclusive, &["P", "Q"], "R", true)]
#[case(ImportKind::RecursiveExclusive, &["P", "Q"], "S", true)]
fn test_import_kind_shapes(
    #[case] kind: ImportKind,
    #[case] path: &[&str],
    #[case] name: &str,
    #[case] visible: bool,
) {
    let mut b = TreeBuilder::new();
    nested_packages(&mut b);
    let w = b.add_named(b.root(), SyntaxKind::Package, "W");
    b.add_import(w, kind, path, Visibility::Private);

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let w_el = ws.model().element_for_node(doc, w).unwrap();
    assert_eq!(
        ws.lookup(w_el, name).is_some(),
        visible,
        "{kind:?} import of {path:?}: '{name}' visibility"
    );
}

#[test]
fn test_private_import_not_reexported() {
    // V imports R privately; W importing V::* must not see R
    let mut b = TreeBuilder::new();
    nested_packages(&mut b);
    let v = b.add_named(b.root(), SyntaxKind::Package, "V");
    b.add_import(v, ImportKind::Wildcard, &["P", "Q"], Visibility::Private);
    let w = b.add_named(b.root(), SyntaxKind::Package, "W");
    b.add_import(w, ImportKind::Wildcard, &["V"], Visibility::Private);

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let v_el = ws.model().element_for_node(doc, v).unwrap();
    let w_el = ws.model().element_for_node(doc, w).unwrap();
    // Visible inside the importing namespace itself
    assert!(ws.lookup(v_el, "R").is_some());
    // Not re-exported through it
    assert_eq!(ws.lookup(w_el, "R"), None);
}

#[test]
fn test_public_import_reexports() {
    let mut b = TreeBuilder::new();
    nested_packages(&mut b);
    let v = b.add_named(b.root(), SyntaxKind::Package, "V");
    b.add_import(v, ImportKind::Wildcard, &["P", "Q"], Visibility::Public);
    let w = b.add_named(b.root(), SyntaxKind::Package, "W");
    b.add_import(w, ImportKind::Wildcard, &["V"], Visibility::Private);

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let w_el = ws.model().element_for_node(doc, w).unwrap();
    assert!(ws.lookup(w_el, "R").is_some());
}

#[test]
fn test_import_does_not_leak_private_members() {
    let mut b = TreeBuilder::new();
    let p = b.add_named(b.root(), SyntaxKind::Package, "P");
    let secret = b.add_named(p, SyntaxKind::PartDefinition, "Secret");
    b.set_visibility(secret, Visibility::Private);
    b.add_named(p, SyntaxKind::PartDefinition, "Open");
    let w = b.add_named(b.root(), SyntaxKind::Package, "W");
    b.add_import(w, ImportKind::Wildcard, &["P"], Visibility::Private);

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let w_el = ws.model().element_for_node(doc, w).unwrap();
    assert!(ws.lookup(w_el, "Open").is_some());
    assert_eq!(ws.lookup(w_el, "Secret"), None);
}

#[test]
fn test_wildcard_import_of_non_namespace_diagnosed() {
    // A named member that is not a namespace cannot be wildcard-imported
    // from. Parser adapters can produce such members from malformed source.
    let mut b = TreeBuilder::new();
    let p = b.add_named(b.root(), SyntaxKind::Package, "P");
    let x = b.add_named(p, SyntaxKind::Import, "x");
    b.set_visibility(x, Visibility::Public);
    let w = b.add_named(b.root(), SyntaxKind::Package, "W");
    b.add_import(w, ImportKind::Wildcard, &["P", "x"], Visibility::Private);

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    assert!(
        ws.diagnostics(doc)
            .iter()
            .any(|d| d.code == Some("link-import")),
        "expected an invalid-import diagnostic"
    );
}

#[test]
fn test_expose_brings_members_into_view_scope() {
    // expose P::Q::* behaves like a wildcard import inside the view
    let mut b = TreeBuilder::new();
    nested_packages(&mut b);
    let view = b.add_named(b.root(), SyntaxKind::Package, "V");
    b.add_expose(view, ImportKind::Wildcard, &["P", "Q"], Visibility::Private);

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let view_el = ws.model().element_for_node(doc, view).unwrap();
    assert!(ws.lookup(view_el, "R").is_some());
    assert_eq!(ws.lookup(view_el, "S"), None);
    // The edge kind is Expose, not Import
    assert_eq!(
        ws.model().targets_of(view_el, RelationshipKind::Expose).len(),
        1
    );
    assert!(ws.model().targets_of(view_el, RelationshipKind::Import).is_empty());
}

#[test]
fn test_recursive_import_target_hidden_by_redefinition() {
    // part def Base { import Parts::wheel::**; }
    // part def Derived :> Base { part front :>> wheel; }
    // Once redefined, "wheel" stays hidden from Derived even though the
    // recursive import can name its own target.
    let mut b = TreeBuilder::new();
    let parts = b.add_named(b.root(), SyntaxKind::Package, "Parts");
    let wheel = b.add_named(parts, SyntaxKind::PartUsage, "wheel");
    let base = b.add_named(b.root(), SyntaxKind::PartDefinition, "Base");
    b.add_import(base, ImportKind::Recursive, &["Parts", "wheel"], Visibility::Public);
    let derived = b.add_named(b.root(), SyntaxKind::PartDefinition, "Derived");
    b.add_reference(derived, ReferenceRole::Specialization, &["Base"]);
    let front = b.add_named(derived, SyntaxKind::PartUsage, "front");
    let rr = b.add_reference(front, ReferenceRole::Redefinition, &["wheel"]);

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let wheel_el = ws.model().element_for_node(doc, wheel).unwrap();
    let derived_el = ws.model().element_for_node(doc, derived).unwrap();
    // The redefinition itself linked through the import
    assert_eq!(ws.resolved_target(doc, rr), Some(wheel_el));
    // But the redefined target is no longer nameable from Derived
    assert_eq!(ws.lookup(derived_el, "wheel"), None);
    assert!(ws.lookup(derived_el, "front").is_some());
}

#[test]
fn test_import_cycle_terminates() {
    // A imports B::*, B imports A::* — lookups terminate and still find
    // members on either side.
    let mut b = TreeBuilder::new();
    let a = b.add_named(b.root(), SyntaxKind::Package, "A");
    b.add_named(a, SyntaxKind::PartDefinition, "InA");
    b.add_import(a, ImportKind::Wildcard, &["B"], Visibility::Private);
    let bb = b.add_named(b.root(), SyntaxKind::Package, "B");
    b.add_named(bb, SyntaxKind::PartDefinition, "InB");
    b.add_import(bb, ImportKind::Wildcard, &["A"], Visibility::Private);

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let a_el = ws.model().element_for_node(doc, a).unwrap();
    let in_b = ws.model().element_for_node(doc, bb).unwrap();
    assert!(ws.lookup(a_el, "InB").is_some());
    assert!(ws.lookup(in_b, "InA").is_some());
    assert_eq!(ws.lookup(a_el, "Nowhere"), None);
}

#[test]
fn test_specific_import_usable_as_supertype() {
    let mut b = TreeBuilder::new();
    nested_packages(&mut b);
    let w = b.add_named(b.root(), SyntaxKind::Package, "W");
    b.add_import(w, ImportKind::Specific, &["P", "Q", "R"], Visibility::Private);
    let car = b.add_named(w, SyntaxKind::PartDefinition, "Car");
    let r = b.add_reference(car, ReferenceRole::Specialization, &["R"]);

    let mut ws = Workspace::new(BuildOptions::standalone_tests());
    let doc = ws.add_document("m.sysml", "sysml", b.finish());
    build(&mut ws);

    let target = ws.resolved_target(doc, r).unwrap();
    assert_eq!(
        ws.model().compute_qualified_name(target).unwrap(),
        "P::Q::R"
    );
}
