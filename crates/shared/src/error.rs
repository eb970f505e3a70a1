use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field '{input}' (expected name, email or password)")]
pub struct FieldParseError {
    pub input: String,
}
