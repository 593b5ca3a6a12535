//! Call-recording gateway for unit tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::debug;

use super::{GatewayError, ModelGateway, ModelRequest, ModelResponse};
use crate::llm::LlmError;

type Responder = Box<dyn Fn(usize, &ModelRequest) -> Result<ModelResponse, GatewayError> + Send + Sync>;

/// Gateway stub that records every request
///
/// Replies are produced by a responder given the 1-based call number and
/// the request.
pub struct MockGateway {
    responder: Responder,
    call_count: AtomicUsize,
    requests: Mutex<Vec<ModelRequest>>,
}

impl MockGateway {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(usize, &ModelRequest) -> Result<ModelResponse, GatewayError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fill the first schema field with "<prefix>-<call number>"
    pub fn labeled(prefix: &'static str) -> Self {
        Self::new(move |n, request| Ok(fill_first_field(request, format!("{}-{}", prefix, n))))
    }

    /// Labeled replies, except call number `fail_on` fails
    pub fn failing_on(prefix: &'static str, fail_on: usize) -> Self {
        Self::new(move |n, request| {
            if n == fail_on {
                Err(GatewayError::Llm(LlmError::InvalidResponse(format!("injected failure on call {}", n))))
            } else {
                Ok(fill_first_field(request, format!("{}-{}", prefix, n)))
            }
        })
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("mock request log poisoned").clone()
    }
}

/// Response carrying `value` in the request's first declared field
pub fn fill_first_field(request: &ModelRequest, value: String) -> ModelResponse {
    let field = request
        .output_schema
        .fields
        .first()
        .map(|f| f.name.clone())
        .unwrap_or_default();
    ModelResponse::from_fields([(field, value)])
}

#[async_trait]
impl ModelGateway for MockGateway {
    async fn call(&self, request: ModelRequest) -> Result<ModelResponse, GatewayError> {
        let n = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(%n, name = %request.name, "MockGateway::call: called");
        let result = (self.responder)(n, &request);
        self.requests.lock().expect("mock request log poisoned").push(request);
        result
    }
}
