//! Shared test helpers

use std::sync::Mutex;

use async_trait::async_trait;
use collablab::gateway::{GatewayError, ModelGateway, ModelRequest, ModelResponse};
use collablab::llm::LlmError;

/// Gateway stub with canned, labeled replies
///
/// Replies are `"<label>-<n>"` where the label depends on the prompt name
/// and `n` counts calls of that prompt. Every request is recorded.
pub struct StubGateway {
    fail_on_call: Option<usize>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self {
            fail_on_call: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail the `n`th call overall (1-based)
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on_call: Some(n),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn calls_named(&self, name: &str) -> Vec<ModelRequest> {
        self.requests().into_iter().filter(|r| r.name == name).collect()
    }
}

#[async_trait]
impl ModelGateway for StubGateway {
    async fn call(&self, request: ModelRequest) -> Result<ModelResponse, GatewayError> {
        let mut requests = self.requests.lock().unwrap();
        let same_name = requests.iter().filter(|r| r.name == request.name).count() + 1;
        requests.push(request.clone());
        if Some(requests.len()) == self.fail_on_call {
            return Err(GatewayError::Llm(LlmError::ApiError {
                status: 503,
                message: "service unavailable".to_string(),
            }));
        }

        let (field, label) = match request.name.as_str() {
            "initiate" => ("refinedIdea", "R"),
            "orchestrate" => ("nextIdea", "C"),
            "synthesize" => ("suggestion", "S"),
            other => panic!("unexpected prompt {}", other),
        };
        Ok(ModelResponse::from_fields([(field, format!("{}-{}", label, same_name))]))
    }
}
