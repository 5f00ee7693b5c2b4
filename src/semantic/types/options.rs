//! Build configuration consumed by the metamodel builder and workspace.

/// How much of the standard library the build may rely on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum StdlibMode {
    /// Full standard library loaded into the workspace; implicit
    /// relationship synthesis enabled.
    #[default]
    Full,
    /// Only library documents the embedder chose to load; synthesis runs
    /// but missing elements are tolerated silently.
    LocalOnly,
    /// No standard library at all (isolated unit tests). Implicit synthesis
    /// and library lookups are skipped entirely.
    None,
}

/// Options fixed at workspace construction.
///
/// The debug toggles affect diagnostic verbosity only, never functional
/// behavior.
#[derive(Clone, Debug, Default)]
pub struct BuildOptions {
    pub stdlib: StdlibMode,
    /// Log indentation-based setup traces via `tracing`.
    pub trace_setup: bool,
    /// Dump scope contents when a reference fails to resolve.
    pub dump_scope_on_error: bool,
}

impl BuildOptions {
    /// Options for isolated unit tests: no standard library.
    pub fn standalone_tests() -> Self {
        Self {
            stdlib: StdlibMode::None,
            ..Self::default()
        }
    }

    pub fn implicits_enabled(&self) -> bool {
        self.stdlib != StdlibMode::None
    }
}
