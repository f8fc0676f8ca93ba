use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("buffer too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
}

#[derive(Debug, Error)]
#[error("cannot determine dump layout: no revision hint supplied and dumps carry no version marker")]
pub struct UnresolvedFormat;

#[derive(Debug, Error)]
#[error("unknown layout '{0}' (expected v1, v2, v3, or v4)")]
pub struct ParseLayoutError(pub String);
