use crate::view::ViewId;
use thiserror::Error;

/// Errors that may occur when operating on the view tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TreeError {
    #[error("no such view: {0:?}")]
    NoSuchView(ViewId),

    #[error("view {0:?} cannot become a descendant of itself")]
    Cycle(ViewId),

    #[error("views {0:?} and {1:?} are not in the same hierarchy")]
    Disjoint(ViewId, ViewId),

    #[error("transform of view {0:?} is not invertible")]
    Singular(ViewId),
}
