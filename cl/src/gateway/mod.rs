//! Model Call Gateway
//!
//! The single capability every stage depends on: send a structured request
//! (instructions template, input fields, output schema) and get back a
//! mapping that conforms to the schema, or fail.
//!
//! - [`ModelGateway`] - the trait stages are written against
//! - [`LlmGateway`] - backend that renders the template and drives an [`LlmClient`](crate::llm::LlmClient)

mod error;
mod llm_gateway;
mod request;

#[cfg(test)]
pub mod mock;

pub use error::GatewayError;
pub use llm_gateway::LlmGateway;
pub use request::{FieldSpec, FieldType, InputValue, ModelRequest, ModelResponse, OutputSchema};

use async_trait::async_trait;

/// Structured model call capability
///
/// Implementations may retry internally; callers never do.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn call(&self, request: ModelRequest) -> Result<ModelResponse, GatewayError>;
}
