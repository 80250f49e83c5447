use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuantizeError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid palette: {0}")]
    InvalidPalette(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("pixel buffer length {len} is not a multiple of 4")]
    InvalidBuffer { len: usize },

    #[error("cannot quantize an empty pixel buffer")]
    EmptyBuffer,

    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),
}

pub type Result<T> = std::result::Result<T, QuantizeError>;
