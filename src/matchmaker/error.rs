use std::time::Duration;

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum MatchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("store operation timed out after {0:?}")]
    OpTimedOut(Duration),
}
