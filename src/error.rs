//! Error types for grid construction and training setup

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("layout has no rows")]
    EmptyLayout,

    #[error("layout row {row} has {got} cells, expected {expected}")]
    RaggedLayout {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid cell '{symbol}' at row {row}, column {col}")]
    InvalidCell { symbol: char, row: usize, col: usize },

    #[error("layout has no empty cell to start an episode from")]
    NoEmptyCell,

    #[error("{name} must be in (0, 1], got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
