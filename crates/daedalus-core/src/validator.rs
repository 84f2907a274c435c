//! Model validation boundary.
//!
//! Request bodies and background job payloads are validated against named
//! models through a [`ModelValidator`]. The validator reports problems as a
//! list of messages; an empty list means the value is valid.
//!
//! [`SchemaModelValidator`] is a small built-in implementation covering
//! required fields, field types, and additional-property checks. Anything
//! richer plugs in through the trait.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Validates JSON values against named models.
pub trait ModelValidator: Send + Sync + 'static {
    /// Validates `value` against the model called `model_name`.
    ///
    /// Returns every problem found; an empty list means valid.
    fn validate(
        &self,
        model_name: &str,
        value: &Value,
        empty_allowed: bool,
        extra_properties_allowed: bool,
    ) -> Vec<String>;

    /// Returns a description of the named model, or `None` if unknown.
    fn fetch_model(&self, model_name: &str) -> Option<Value>;
}

/// JSON type of a model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// JSON string.
    String,
    /// Integral JSON number.
    Integer,
    /// Any JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// Any value.
    Any,
}

impl FieldType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Any => true,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        }
    }
}

/// An object model: typed properties plus a list of required ones.
///
/// Deserializes from `{"properties": {"name": "string"}, "required": ["name"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSchema {
    /// Property types by name.
    #[serde(default)]
    pub properties: BTreeMap<String, FieldType>,
    /// Names of properties that must be present.
    #[serde(default)]
    pub required: Vec<String>,
}

impl ModelSchema {
    /// Creates an empty model, which accepts any object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an optional property.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.properties.insert(name.into(), field_type);
        self
    }

    /// Adds a required property.
    #[must_use]
    pub fn required_property(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(name, field_type);
        self
    }

    fn check(&self, value: &Value, extra_properties_allowed: bool) -> Vec<String> {
        let Some(object) = value.as_object() else {
            return vec!["Expected a JSON object".to_string()];
        };

        let mut errors = Vec::new();
        for name in &self.required {
            if !object.contains_key(name) {
                errors.push(format!("Missing required field {name}"));
            }
        }
        for (name, field) in object {
            match self.properties.get(name) {
                Some(expected) if !expected.accepts(field) => {
                    errors.push(format!(
                        "Field {name} should be of type {}",
                        expected.name()
                    ));
                }
                None if !extra_properties_allowed => {
                    errors.push(format!("Unexpected field {name}"));
                }
                _ => {}
            }
        }
        errors
    }
}

/// A [`ModelValidator`] backed by an in-memory set of [`ModelSchema`]s.
///
/// # Example
///
/// ```
/// use daedalus_core::{FieldType, ModelSchema, ModelValidator, SchemaModelValidator};
/// use serde_json::json;
///
/// let validator = SchemaModelValidator::new()
///     .with_model("Item", ModelSchema::new().required_property("name", FieldType::String));
///
/// assert!(validator.validate("Item", &json!({"name": "x"}), false, false).is_empty());
/// assert_eq!(validator.validate("Item", &json!({}), true, false).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaModelValidator {
    models: HashMap<String, ModelSchema>,
}

impl SchemaModelValidator {
    /// Creates a validator with no models.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model.
    #[must_use]
    pub fn with_model(mut self, name: impl Into<String>, schema: ModelSchema) -> Self {
        self.models.insert(name.into(), schema);
        self
    }

    /// Builds a validator from a JSON map of model name to schema.
    pub fn from_json(models: &Value) -> Result<Self, serde_json::Error> {
        let models: HashMap<String, ModelSchema> = serde_json::from_value(models.clone())?;
        Ok(Self { models })
    }
}

impl ModelValidator for SchemaModelValidator {
    fn validate(
        &self,
        model_name: &str,
        value: &Value,
        empty_allowed: bool,
        extra_properties_allowed: bool,
    ) -> Vec<String> {
        let Some(schema) = self.models.get(model_name) else {
            return vec![format!("Model {model_name} not found")];
        };

        let is_empty = match value {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if is_empty {
            if empty_allowed {
                return Vec::new();
            }
            return vec![format!("Model {model_name} may not be empty")];
        }

        schema.check(value, extra_properties_allowed)
    }

    fn fetch_model(&self, model_name: &str) -> Option<Value> {
        self.models
            .get(model_name)
            .and_then(|schema| serde_json::to_value(schema).ok())
    }
}
