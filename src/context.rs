use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Value;

/// Attribute name reserved for the targeting key.
pub const TARGETING_KEY: &str = "targetingKey";

/// Attributes describing the subject of an evaluation.
///
/// # Examples
/// ```
/// # use flipt_provider::EvaluationContext;
/// let context = EvaluationContext::default()
///     .with_targeting_key("user-1")
///     .with_custom_field("plan", "gold")
///     .with_custom_field("age", 42);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationContext {
    /// Identifier of the subject the evaluation is personalized against.
    pub targeting_key: Option<String>,
    /// Any other attributes.
    #[serde(flatten)]
    pub custom_fields: HashMap<String, Value>,
}

impl EvaluationContext {
    /// Set the targeting key.
    pub fn with_targeting_key(mut self, targeting_key: impl Into<String>) -> Self {
        self.targeting_key = Some(targeting_key.into());
        self
    }

    /// Add a custom attribute.
    pub fn with_custom_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom_fields.insert(key.into(), value.into());
        self
    }

    /// The targeting key, falling back to a string `targetingKey` attribute.
    pub fn targeting_key(&self) -> Option<&str> {
        self.targeting_key
            .as_deref()
            .or_else(|| self.custom_fields.get(TARGETING_KEY)?.as_str())
    }

    /// Flatten attributes into the string map understood by the evaluation service.
    ///
    /// The targeting key is sent separately as the entity id and is never part of the map.
    pub(crate) fn to_request_context(&self) -> HashMap<String, String> {
        self.custom_fields
            .iter()
            .filter(|(key, _)| key.as_str() != TARGETING_KEY)
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect()
    }
}
