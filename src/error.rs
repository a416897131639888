use perch_core::{TreeError, ViewId};
use thiserror::Error;

/// Errors that may occur when creating a popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PopupError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("content view {0:?} is or contains the container")]
    ContentIsContainer(ViewId),
}
