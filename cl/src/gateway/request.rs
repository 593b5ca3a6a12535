//! Gateway request/response contracts

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::GatewayError;

/// A single input field value: text or a list of texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InputValue {
    Text(String),
    List(Vec<String>),
}

impl InputValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            InputValue::Text(text) => Some(text),
            InputValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            InputValue::Text(_) => None,
            InputValue::List(items) => Some(items),
        }
    }

    /// True if the text, or any list entry, contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        match self {
            InputValue::Text(text) => text.contains(needle),
            InputValue::List(items) => items.iter().any(|item| item.contains(needle)),
        }
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Text(value)
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

impl From<Vec<String>> for InputValue {
    fn from(value: Vec<String>) -> Self {
        InputValue::List(value)
    }
}

/// Type of a declared output field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => f.write_str("string"),
        }
    }
}

/// One declared output field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Shown to the model alongside the field name
    pub description: String,
}

/// Shape the model's reply must conform to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSchema {
    pub fields: Vec<FieldSpec>,
}

impl OutputSchema {
    /// Schema with exactly one string field
    pub fn single_string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldSpec {
                name: name.into(),
                field_type: FieldType::String,
                description: description.into(),
            }],
        }
    }

    /// Validate a parsed JSON object against this schema
    ///
    /// Extra keys are dropped; declared string fields must be present and
    /// non-blank.
    pub fn conform(&self, value: Value) -> Result<ModelResponse, GatewayError> {
        debug!(field_count = self.fields.len(), "OutputSchema::conform: called");
        let Value::Object(mut object) = value else {
            return Err(GatewayError::MalformedOutput {
                message: "expected a JSON object".to_string(),
            });
        };

        let mut fields = BTreeMap::new();
        for spec in &self.fields {
            let raw = object.remove(&spec.name).ok_or_else(|| {
                debug!(field = %spec.name, "OutputSchema::conform: missing field");
                GatewayError::MissingField {
                    field: spec.name.clone(),
                }
            })?;

            match (spec.field_type, raw) {
                (FieldType::String, Value::String(text)) => {
                    let text = text.trim().to_string();
                    if text.is_empty() {
                        return Err(GatewayError::EmptyField {
                            field: spec.name.clone(),
                        });
                    }
                    fields.insert(spec.name.clone(), text);
                }
                (FieldType::String, other) => {
                    debug!(field = %spec.name, ?other, "OutputSchema::conform: wrong type");
                    return Err(GatewayError::WrongFieldType {
                        field: spec.name.clone(),
                        expected: spec.field_type.to_string(),
                    });
                }
            }
        }

        Ok(ModelResponse { fields })
    }
}

/// Structured request for one model call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    /// Prompt name, used for logging and error messages
    pub name: String,

    /// Handlebars template rendered against `input_fields`
    pub instructions_template: String,

    pub input_fields: BTreeMap<String, InputValue>,

    pub output_schema: OutputSchema,
}

impl ModelRequest {
    pub fn new(name: impl Into<String>, instructions_template: impl Into<String>, output_schema: OutputSchema) -> Self {
        Self {
            name: name.into(),
            instructions_template: instructions_template.into(),
            input_fields: BTreeMap::new(),
            output_schema,
        }
    }

    /// Add an input field
    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.input_fields.insert(name.into(), value.into());
        self
    }

    pub fn input(&self, name: &str) -> Option<&InputValue> {
        self.input_fields.get(name)
    }
}

/// Schema-conforming reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    fields: BTreeMap<String, String>,
}

impl ModelResponse {
    /// Build directly from field/value pairs (stubs and tests)
    pub fn from_fields<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Read a declared string field
    pub fn text(&self, field: &str) -> Result<&str, GatewayError> {
        self.fields
            .get(field)
            .map(String::as_str)
            .ok_or_else(|| GatewayError::MissingField {
                field: field.to_string(),
            })
    }
}
