//! Syntax node kinds and the is-a hierarchy between them.
//!
//! The external parser tags every node with a [`SyntaxKind`]. Kinds form a
//! single-parent hierarchy (`PartUsage` is-a `ItemUsage` is-a `Usage` is-a
//! `Feature` is-a `Type` ...) that drives two things in the semantic layer:
//! generic `is(kind)` predicates on elements, and the inheritance-merge of
//! registered setup functions in the metamodel builder.

/// The kind tag of a raw syntax node.
///
/// Abstract categories (`Namespace`, `Type`, `Classifier`, `Feature`,
/// `Usage`) never appear on parsed nodes directly but participate in the
/// hierarchy so behavior can be registered against them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyntaxKind {
    // Abstract categories
    Element,
    Namespace,
    Type,
    Classifier,
    Feature,
    Usage,

    // Kernel namespaces
    RootNamespace,
    Package,
    LibraryPackage,

    // Kernel classifiers
    DataType,
    Class,
    Structure,
    Association,
    Behavior,
    Function,
    Predicate,
    Metaclass,

    // Kernel features
    Step,
    Connector,
    BindingConnector,
    Succession,
    Expression,
    InvocationExpression,
    FeatureChainExpression,
    FeatureReferenceExpression,
    MetadataAccessExpression,
    LiteralExpression,

    // Definitions
    ItemDefinition,
    PartDefinition,
    AttributeDefinition,
    PortDefinition,
    ActionDefinition,
    StateDefinition,
    ConstraintDefinition,
    RequirementDefinition,
    ConnectionDefinition,
    InterfaceDefinition,
    MetadataDefinition,

    // Usages
    ItemUsage,
    PartUsage,
    AttributeUsage,
    PortUsage,
    ActionUsage,
    StateUsage,
    TransitionUsage,
    ConstraintUsage,
    RequirementUsage,
    ConnectionUsage,
    InterfaceUsage,
    ReferenceUsage,
    MetadataUsage,

    // Memberships and annotations
    Import,
    Alias,
    Documentation,
    Comment,

    // A qualified reference chain
    Reference,
}

impl SyntaxKind {
    /// The direct supertype of this kind, or `None` for `Element`.
    pub fn parent(self) -> Option<SyntaxKind> {
        use SyntaxKind::*;
        Some(match self {
            Element => return None,
            Namespace | Import | Alias | Documentation | Comment | Reference => Element,
            Type | RootNamespace | Package => Namespace,
            LibraryPackage => Package,
            Classifier | Feature => Type,

            DataType | Class | Association | Behavior | Metaclass => Classifier,
            Structure => Class,
            Function | Predicate => Behavior,

            Usage | Step | Connector => Feature,
            BindingConnector | Succession => Connector,
            Expression => Step,
            InvocationExpression | FeatureChainExpression | FeatureReferenceExpression
            | MetadataAccessExpression | LiteralExpression => Expression,

            ItemDefinition | PortDefinition => Structure,
            PartDefinition => ItemDefinition,
            AttributeDefinition => DataType,
            ActionDefinition => Behavior,
            StateDefinition => ActionDefinition,
            ConstraintDefinition => Predicate,
            RequirementDefinition => ConstraintDefinition,
            ConnectionDefinition => Association,
            InterfaceDefinition => ConnectionDefinition,
            MetadataDefinition => Metaclass,

            ItemUsage | AttributeUsage | PortUsage | ActionUsage | ConstraintUsage
            | ReferenceUsage | MetadataUsage => Usage,
            PartUsage => ItemUsage,
            StateUsage | TransitionUsage => ActionUsage,
            RequirementUsage => ConstraintUsage,
            ConnectionUsage => Connector,
            InterfaceUsage => ConnectionUsage,
        })
    }

    /// Whether this kind is the given kind or a transitive subtype of it.
    pub fn is_a(self, ancestor: SyntaxKind) -> bool {
        let mut current = self;
        loop {
            if current == ancestor {
                return true;
            }
            match current.parent() {
                Some(p) => current = p,
                None => return false,
            }
        }
    }

    /// The chain of kinds from `self` up to `Element`, self first.
    pub fn ancestry(self) -> impl Iterator<Item = SyntaxKind> {
        std::iter::successors(Some(self), |k| k.parent())
    }

    /// Whether nodes of this kind own a member scope.
    pub fn is_namespace(self) -> bool {
        self.is_a(SyntaxKind::Namespace)
    }

    /// Whether nodes of this kind participate in the type graph.
    pub fn is_type(self) -> bool {
        self.is_a(SyntaxKind::Type)
    }

    /// Human-readable label for diagnostics.
    pub fn display(self) -> &'static str {
        use SyntaxKind::*;
        match self {
            Element => "element",
            Namespace => "namespace",
            Type => "type",
            Classifier => "classifier",
            Feature => "feature",
            Usage => "usage",
            RootNamespace => "root namespace",
            Package => "package",
            LibraryPackage => "library package",
            DataType => "datatype",
            Class => "class",
            Structure => "structure",
            Association => "association",
            Behavior => "behavior",
            Function => "function",
            Predicate => "predicate",
            Metaclass => "metaclass",
            Step => "step",
            Connector => "connector",
            BindingConnector => "binding connector",
            Succession => "succession",
            Expression => "expression",
            InvocationExpression => "invocation expression",
            FeatureChainExpression => "feature chain expression",
            FeatureReferenceExpression => "feature reference expression",
            MetadataAccessExpression => "metadata access expression",
            LiteralExpression => "literal expression",
            ItemDefinition => "item def",
            PartDefinition => "part def",
            AttributeDefinition => "attribute def",
            PortDefinition => "port def",
            ActionDefinition => "action def",
            StateDefinition => "state def",
            ConstraintDefinition => "constraint def",
            RequirementDefinition => "requirement def",
            ConnectionDefinition => "connection def",
            InterfaceDefinition => "interface def",
            MetadataDefinition => "metadata def",
            ItemUsage => "item",
            PartUsage => "part",
            AttributeUsage => "attribute",
            PortUsage => "port",
            ActionUsage => "action",
            StateUsage => "state",
            TransitionUsage => "transition",
            ConstraintUsage => "constraint",
            RequirementUsage => "requirement",
            ConnectionUsage => "connection",
            InterfaceUsage => "interface",
            ReferenceUsage => "ref",
            MetadataUsage => "metadata",
            Import => "import",
            Alias => "alias",
            Documentation => "doc",
            Comment => "comment",
            Reference => "reference",
        }
    }
}

/// Feature direction modifier (`in` / `out` / `inout`).
///
/// Directed features are the positional parameters paired up by the
/// builder's redefinition synthesis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
    InOut,
}
