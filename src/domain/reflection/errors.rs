//! Error types for the reflection domain.

/// Driver-boundary errors.
///
/// Stage-internal failures never surface here; they are absorbed into
/// `DialogueState::error_message` and a terminal transition. This enum only
/// covers calls the driver must reject outright.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ReflectionError {
    #[error("Session already concluded; no further input expected")]
    SessionConcluded,

    #[error("No question pending; user input cannot be routed")]
    NoPendingQuestion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_concluded_display() {
        let err = ReflectionError::SessionConcluded;
        assert!(err.to_string().contains("already concluded"));
    }

    #[test]
    fn test_no_pending_question_display() {
        let err = ReflectionError::NoPendingQuestion;
        assert!(err.to_string().contains("No question pending"));
    }
}
