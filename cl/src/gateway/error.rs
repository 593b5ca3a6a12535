//! Gateway error types

use thiserror::Error;

use crate::llm::LlmError;

/// Every way a gateway call can fail
///
/// Stages do not distinguish between these; they all surface as one
/// upstream failure with this error attached as the cause.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed to render template '{name}': {message}")]
    Template { name: String, message: String },

    #[error("Model returned no output")]
    EmptyOutput,

    #[error("Model output is not a JSON object: {message}")]
    MalformedOutput { message: String },

    #[error("Model output is missing field '{field}'")]
    MissingField { field: String },

    #[error("Model output field '{field}' is not a {expected}")]
    WrongFieldType { field: String, expected: String },

    #[error("Model output field '{field}' is empty")]
    EmptyField { field: String },
}

impl GatewayError {
    /// True when the response arrived but did not match the schema
    pub fn is_schema_violation(&self) -> bool {
        matches!(
            self,
            GatewayError::MalformedOutput { .. }
                | GatewayError::MissingField { .. }
                | GatewayError::WrongFieldType { .. }
                | GatewayError::EmptyField { .. }
        )
    }
}
