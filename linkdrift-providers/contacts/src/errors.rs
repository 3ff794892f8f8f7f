use thiserror::Error;

/// Errors raised while reading a contact log.
#[derive(Debug, Error)]
pub enum ContactLogError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line} is missing the `{field}` field")]
    MissingField { line: usize, field: &'static str },
    #[error("line {line} has invalid `{field}` value `{value}`")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("contact log contains no usable events")]
    EmptyInput,
}
