use thiserror::Error;

use crate::model::KeyError;

/// Top-level error for fallible core operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Key(#[from] KeyError),
}
