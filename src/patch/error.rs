use crate::directive::DirectiveError;
use crate::surface::SurfaceError;
use crate::vnode::NodeKind;

/// Errors raised while reconciling a tree.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// A node was patched against a node of a different kind.
    #[error("cannot patch a {expected} node with a {found} node")]
    KindMismatch { expected: NodeKind, found: NodeKind },

    /// The tree being patched is not live (never mounted, already detached,
    /// or re-entered while rendering).
    #[error("reconciliation impossible: {0}")]
    ReconciliationImpossible(String),

    /// A tag was mounted as a component but nothing is registered under it.
    #[error("no component registered as `{0}`")]
    UnknownComponent(String),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Directive(#[from] DirectiveError),
}
