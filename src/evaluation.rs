use std::collections::HashMap;

use derive_more::From;
use serde::{Deserialize, Serialize};

use crate::ErrorCode;

/// Flag metadata key holding the matched variant's attachment.
pub const VARIANT_ATTACHMENT: &str = "variant-attachment";

/// Flag metadata returned alongside an evaluation.
pub type FlagMetadata = HashMap<String, MetadataValue>;

/// A value in [`FlagMetadata`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, From)]
#[serde(untagged)]
pub enum MetadataValue {
    /// A boolean value.
    Boolean(bool),
    /// An integer value.
    Integer(i64),
    /// A floating point value.
    Float(f64),
    /// A string value.
    String(String),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// Reasons the provider computes locally.
///
/// Boolean evaluations report the reason string received from the server instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    /// The default value was returned.
    Default,
    /// A targeting rule matched.
    TargetingMatch,
}

impl Reason {
    /// Wire representation of the reason.
    pub fn as_str(self) -> &'static str {
        match self {
            Reason::Default => "DEFAULT",
            Reason::TargetingMatch => "TARGETING_MATCH",
        }
    }
}

impl From<Reason> for String {
    fn from(value: Reason) -> Self {
        value.as_str().to_owned()
    }
}

/// Outcome of a single flag evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult<T> {
    /// The resolved value.
    pub value: T,
    /// Key of the matched variant, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Why the value was resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Error code, if the evaluation resolved with an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Extra data about the flag, e.g. the variant attachment.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub flag_metadata: FlagMetadata,
}

impl<T> EvaluationResult<T> {
    /// A result holding just `value`.
    pub fn new(value: T) -> Self {
        EvaluationResult {
            value,
            variant: None,
            reason: None,
            error_code: None,
            error_message: None,
            flag_metadata: FlagMetadata::new(),
        }
    }

    pub(crate) fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Replace the value, keeping variant, reason, error and metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> EvaluationResult<U> {
        EvaluationResult {
            value: f(self.value),
            variant: self.variant,
            reason: self.reason,
            error_code: self.error_code,
            error_message: self.error_message,
            flag_metadata: self.flag_metadata,
        }
    }
}
