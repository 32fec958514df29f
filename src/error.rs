use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrendError {
    /// The picked path is missing or not a directory.
    #[error("not a directory: {}", .0.display())]
    InvalidInput(PathBuf),

    #[error("failed to read price data: {0}")]
    DataRead(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrendError>;
