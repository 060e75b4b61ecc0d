/// Errors produced while building or interpreting a control message.
///
/// None of these are fatal to a session: an inbound message that fails to
/// parse is dropped and reported.
#[derive(Debug, thiserror::Error)]
pub enum ControlMessageError {
    /// A required field is absent.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A field is present with the wrong JSON type.
    #[error("field '{field}' must be {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },

    /// A field has the right type but an unrecognized value.
    #[error("field '{field}' has unsupported value '{value}'")]
    InvalidValue { field: &'static str, value: String },

    /// The text is not JSON at all.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ControlMessageError>;
