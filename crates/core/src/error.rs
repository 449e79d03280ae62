use thiserror::Error;

pub type PassdeskResult<T> = Result<T, PassdeskError>;

#[derive(Error, Debug)]
pub enum PassdeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl PassdeskError {
    /// Stable machine-readable code, surfaced in API error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            PassdeskError::Config(_) => "config_error",
            PassdeskError::Validation(_) => "validation_failed",
            PassdeskError::NotFound(_) => "not_found",
            PassdeskError::Unauthorized(_) => "unauthorized",
            PassdeskError::Serialization(_) => "serialization_error",
            PassdeskError::Io(_) => "io_error",
            PassdeskError::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(PassdeskError::NotFound("member".into()).code(), "not_found");
        assert_eq!(
            PassdeskError::Validation("bad".into()).to_string(),
            "Validation error: bad"
        );
    }
}
