//! Internal-error primitives shared across the Quartz crates.

/// Result type for operations that can only fail on a Quartz bug.
///
/// User-facing construction and emission errors have their own typed error
/// enums in the crates that produce them; `QuartzResult` is reserved for
/// registry and cast failures that should never happen with a well-formed
/// IR.
pub type QuartzResult<T> = Result<T, InternalError>;

/// An internal error: a bug in Quartz, not a problem with the user's design.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of what went wrong.
    pub message: String,
}

impl InternalError {
    /// Creates an internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message() {
        let err = InternalError::new("statement arena index out of range");
        assert_eq!(
            err.to_string(),
            "internal error: statement arena index out of range"
        );
    }

    #[test]
    fn from_string() {
        let err: InternalError = "bad registry state".to_string().into();
        assert_eq!(err.message, "bad registry state");
    }

    #[test]
    fn result_alias() {
        let ok: QuartzResult<u32> = Ok(7);
        assert_eq!(ok.unwrap(), 7);
    }
}
