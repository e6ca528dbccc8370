//! Core shared errors (renderer-agnostic).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("cell ({row}, {col}) is outside the {size}x{size} board")]
    CellOutOfRange { row: usize, col: usize, size: usize },
}

pub type CoreResult<T> = Result<T, CoreError>;
