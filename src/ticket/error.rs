use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum TicketError {
    #[error("invalid ticket parameters: {0}")]
    InvalidParameters(&'static str),

    #[error("no ticket found for player")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}
