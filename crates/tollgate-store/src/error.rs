//! Store error types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}
