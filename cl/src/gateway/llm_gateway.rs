//! LLM-backed gateway
//!
//! Renders the request's instructions with Handlebars, asks the model for a
//! single JSON object matching the output schema, and validates the reply.

use std::fmt::Write;
use std::sync::Arc;

use async_trait::async_trait;
use handlebars::Handlebars;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{GatewayError, ModelGateway, ModelRequest, ModelResponse, OutputSchema};
use crate::llm::{CompletionRequest, LlmClient, StopReason};

/// Default max tokens requested per gateway call
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Gateway that drives an [`LlmClient`]
pub struct LlmGateway {
    llm: Arc<dyn LlmClient>,
    hbs: Handlebars<'static>,
    max_tokens: u32,
}

impl LlmGateway {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        debug!("LlmGateway::new: called");
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(handlebars::no_escape);
        Self {
            llm,
            hbs,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Render the instructions template against the input fields
    fn render(&self, request: &ModelRequest) -> Result<String, GatewayError> {
        debug!(name = %request.name, "LlmGateway::render: called");
        self.hbs
            .render_template(&request.instructions_template, &request.input_fields)
            .map_err(|e| GatewayError::Template {
                name: request.name.clone(),
                message: e.to_string(),
            })
    }
}

/// System prompt describing the JSON shape the model must return
fn schema_instructions(schema: &OutputSchema) -> String {
    let mut out = String::from(
        "Respond with a single JSON object and nothing else. \
         The object must contain exactly these fields:\n",
    );
    for field in &schema.fields {
        let _ = writeln!(out, "- \"{}\" ({}): {}", field.name, field.field_type, field.description);
    }
    out
}

/// Pull a JSON object out of model text
///
/// Accepts bare JSON, a fenced ```json block, or an object embedded in prose.
/// Every `{` is tried as a start so stray braces in the prose are skipped.
fn extract_json_object(text: &str) -> Result<Value, GatewayError> {
    debug!(len = text.len(), "extract_json_object: called");
    let stripped = strip_code_fence(text);

    let mut last_error = None;
    for (start, _) in stripped.match_indices('{') {
        match serde_json::Deserializer::from_str(&stripped[start..]).into_iter::<Value>().next() {
            Some(Ok(value @ Value::Object(_))) => return Ok(value),
            Some(Ok(_)) | None => {}
            Some(Err(e)) => last_error = Some(e.to_string()),
        }
    }

    Err(GatewayError::MalformedOutput {
        message: last_error.unwrap_or_else(|| "no JSON object found".to_string()),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string (e.g. "json") up to the first newline
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[async_trait]
impl ModelGateway for LlmGateway {
    async fn call(&self, request: ModelRequest) -> Result<ModelResponse, GatewayError> {
        debug!(name = %request.name, input_count = request.input_fields.len(), "LlmGateway::call: called");
        let prompt = self.render(&request)?;
        let completion = CompletionRequest::new(schema_instructions(&request.output_schema), prompt, self.max_tokens);

        let response = self.llm.complete(completion).await?;
        info!(
            name = %request.name,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            total_tokens = response.usage.total(),
            "Model call complete"
        );
        if response.stop_reason == StopReason::MaxTokens {
            warn!(name = %request.name, "Model output truncated at max tokens");
        }

        let text = response.content.filter(|t| !t.trim().is_empty()).ok_or_else(|| {
            debug!("LlmGateway::call: empty completion");
            GatewayError::EmptyOutput
        })?;

        extract_json_object(&text)
            .and_then(|value| request.output_schema.conform(value))
            .inspect_err(|e| {
                if e.is_schema_violation() {
                    warn!(name = %request.name, error = %e, "Model output did not match schema");
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;
    use crate::llm::{CompletionResponse, LlmError};

    fn refine_request() -> ModelRequest {
        ModelRequest::new(
            "initiate",
            "Refine this idea: {{initialIdea}}",
            OutputSchema::single_string("refinedIdea", "The refined idea"),
        )
        .with_input("initialIdea", "urban farming kiosk")
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_json_object_variants() {
        assert!(extract_json_object("{\"a\": \"b\"}").is_ok());
        assert!(extract_json_object("```json\n{\"a\": \"b\"}\n```").is_ok());
        assert!(extract_json_object("Sure! Here it is: {\"a\": \"b\"} Hope that helps.").is_ok());
        assert!(matches!(
            extract_json_object("no json here"),
            Err(GatewayError::MalformedOutput { .. })
        ));
        assert!(matches!(
            extract_json_object("[1, 2]"),
            Err(GatewayError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn test_extract_json_object_skips_stray_braces() {
        let value = extract_json_object("Note {draft}: {\"refinedIdea\": \"x\"}").unwrap();
        assert_eq!(value["refinedIdea"], "x");

        let value = extract_json_object("{\"refinedIdea\": \"x\"} and {more}").unwrap();
        assert_eq!(value["refinedIdea"], "x");

        let value = extract_json_object("Outer { \"nested\": {\"suggestion\": \"s\"} oops").unwrap();
        assert_eq!(value["suggestion"], "s");
    }

    #[test]
    fn test_schema_instructions_lists_fields() {
        let text = schema_instructions(&OutputSchema::single_string("nextIdea", "The new idea"));
        assert!(text.contains("\"nextIdea\" (string): The new idea"));
        assert!(text.contains("JSON object"));
    }

    #[tokio::test]
    async fn test_call_renders_template_and_parses() {
        let llm = Arc::new(MockLlmClient::with_texts([
            "```json\n{\"refinedIdea\": \"A modular kiosk for urban farming\"}\n```",
        ]));
        let gateway = LlmGateway::new(llm.clone());

        let response = gateway.call(refine_request()).await.unwrap();
        assert_eq!(response.text("refinedIdea").unwrap(), "A modular kiosk for urban farming");

        let sent = llm.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].messages[0].content, "Refine this idea: urban farming kiosk");
        assert!(sent[0].system_prompt.contains("refinedIdea"));
    }

    #[tokio::test]
    async fn test_call_renders_list_without_escaping() {
        let llm = Arc::new(MockLlmClient::with_texts(["{\"suggestion\": \"s\"}"]));
        let gateway = LlmGateway::new(llm.clone());
        let request = ModelRequest::new(
            "synthesize",
            "{{#each ideas}}- {{this}}\n{{/each}}",
            OutputSchema::single_string("suggestion", "merged"),
        )
        .with_input("ideas", vec!["A & B".to_string(), "<C>".to_string()]);

        gateway.call(request).await.unwrap();
        assert_eq!(llm.requests()[0].messages[0].content, "- A & B\n- <C>\n");
    }

    #[tokio::test]
    async fn test_call_missing_template_variable_fails_before_llm() {
        let llm = Arc::new(MockLlmClient::with_texts(["{}"]));
        let gateway = LlmGateway::new(llm.clone());
        let request = ModelRequest::new(
            "initiate",
            "Refine {{missingField}}",
            OutputSchema::single_string("refinedIdea", "x"),
        );

        let err = gateway.call(request).await.unwrap_err();
        assert!(matches!(err, GatewayError::Template { .. }));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_call_empty_output() {
        let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse {
            content: None,
            stop_reason: StopReason::EndTurn,
            usage: Default::default(),
        }]));
        let gateway = LlmGateway::new(llm);

        let err = gateway.call(refine_request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::EmptyOutput));
    }

    #[tokio::test]
    async fn test_call_schema_violation() {
        let llm = Arc::new(MockLlmClient::with_texts(["{\"idea\": \"wrong key\"}"]));
        let gateway = LlmGateway::new(llm);

        let err = gateway.call(refine_request()).await.unwrap_err();
        assert!(err.is_schema_violation());
    }

    #[tokio::test]
    async fn test_call_llm_error_propagates() {
        let llm = Arc::new(MockLlmClient::new(vec![]));
        let gateway = LlmGateway::new(llm);

        let err = gateway.call(refine_request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Llm(LlmError::InvalidResponse(_))));
    }
}
