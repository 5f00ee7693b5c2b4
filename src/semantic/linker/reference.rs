//! Reference chains and their resolution state.

use smol_str::SmolStr;

use crate::base::Span;
use crate::semantic::element::ElementId;
use crate::semantic::types::LinkError;
use crate::syntax::{ImportKind, NodeId, RawReference, ReferenceRole};

/// Final outcome of a whole chain. Once the chain leaves `Unresolved` it is
/// idempotently cached: further resolution attempts are pure reads.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ChainOutcome {
    #[default]
    Unresolved,
    Resolved(ElementId),
    Failed(LinkError),
}

/// One name segment with its resolution cell. A segment's cell also seeds
/// the scope for the next segment, so partial progress stays inspectable by
/// completion and diagnostics tooling.
#[derive(Clone, Debug)]
pub struct SegmentState {
    pub text: SmolStr,
    pub span: Option<Span>,
    pub resolved: Option<ElementId>,
}

/// Resolution state of one reference chain node.
#[derive(Clone, Debug)]
pub struct ElementReference {
    pub node: NodeId,
    pub role: ReferenceRole,
    pub import_kind: Option<ImportKind>,
    pub argument_name: Option<SmolStr>,
    pub segments: Vec<SegmentState>,
    pub outcome: ChainOutcome,
}

impl ElementReference {
    pub fn from_raw(node: NodeId, raw: &RawReference) -> Self {
        Self {
            node,
            role: raw.role,
            import_kind: raw.import_kind,
            argument_name: raw.argument_name.clone(),
            segments: raw
                .segments
                .iter()
                .map(|s| SegmentState {
                    text: s.text.clone(),
                    span: s.span,
                    resolved: None,
                })
                .collect(),
            outcome: ChainOutcome::Unresolved,
        }
    }

    /// The resolved final target, if linking succeeded.
    pub fn target(&self) -> Option<ElementId> {
        match self.outcome {
            ChainOutcome::Resolved(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.outcome != ChainOutcome::Unresolved
    }

    /// The dotted partial path of segments resolved so far, for error
    /// messages.
    pub fn partial_path(&self, upto: usize) -> String {
        self.segments[..upto]
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("::")
    }

    /// The span of one segment, falling back to the whole chain's first
    /// available span.
    pub fn segment_span(&self, index: usize) -> Option<Span> {
        self.segments
            .get(index)
            .and_then(|s| s.span)
            .or_else(|| self.segments.iter().find_map(|s| s.span))
    }
}
