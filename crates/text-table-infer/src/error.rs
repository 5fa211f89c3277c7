use std::io;

use thiserror::Error;

/// Failures outside the inference itself. An input that is not a table is
/// reported through `Inference::NotTabular`, never through this type.
#[derive(Debug, Error)]
pub enum InferError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid utf-8 csv output: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}
