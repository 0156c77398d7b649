//! Contract of the remote Flipt evaluation service.
use std::{collections::HashMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Request sent to both evaluation operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    /// Namespace the flag lives in.
    pub namespace_key: String,
    /// Key of the flag to evaluate.
    pub flag_key: String,
    /// Subject of the evaluation, taken from the targeting key.
    pub entity_id: String,
    /// Context attributes rendered as strings.
    pub context: HashMap<String, String>,
}

/// Response of the boolean evaluation operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanEvaluationResponse {
    /// Whether the flag is enabled for the entity.
    pub enabled: bool,
    /// Evaluation reason as reported by the server, e.g. `MATCH_EVALUATION_REASON`.
    pub reason: String,
    /// Key of the evaluated flag.
    #[serde(default)]
    pub flag_key: String,
    /// Server-side request id.
    #[serde(default)]
    pub request_id: String,
    /// Time the server spent evaluating.
    #[serde(default)]
    pub request_duration_millis: f64,
    /// Server timestamp of the evaluation.
    #[serde(default)]
    pub timestamp: String,
}

/// Response of the variant evaluation operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantEvaluationResponse {
    /// Whether a rule matched the entity.
    #[serde(rename = "match")]
    pub is_match: bool,
    /// Key of the matched variant. Empty when nothing matched.
    #[serde(default)]
    pub variant_key: String,
    /// Attachment of the matched variant. The server sends an empty string when there is none.
    #[serde(default)]
    pub variant_attachment: Option<String>,
    /// Evaluation reason as reported by the server.
    pub reason: String,
    /// Segments the entity matched.
    #[serde(default)]
    pub segment_keys: Vec<String>,
    /// Key of the evaluated flag.
    #[serde(default)]
    pub flag_key: String,
    /// Server-side request id.
    #[serde(default)]
    pub request_id: String,
    /// Time the server spent evaluating.
    #[serde(default)]
    pub request_duration_millis: f64,
    /// Server timestamp of the evaluation.
    #[serde(default)]
    pub timestamp: String,
}

/// A client of the remote evaluation service.
///
/// Each call is made exactly once; implementations must not retry.
pub trait EvaluationService {
    /// Evaluate a boolean flag.
    fn boolean(
        &self,
        request: &EvaluationRequest,
    ) -> std::result::Result<BooleanEvaluationResponse, ServiceError>;

    /// Evaluate a variant flag.
    fn variant(
        &self,
        request: &EvaluationRequest,
    ) -> std::result::Result<VariantEvaluationResponse, ServiceError>;
}

/// Builds the [`EvaluationService`] during [`FliptProvider::initialize`](crate::FliptProvider::initialize).
///
/// Any `Fn() -> Result<S, ServiceError>` closure is a builder.
pub trait ServiceBuilder {
    /// Construct the service client.
    fn build(
        &self,
    ) -> std::result::Result<Arc<dyn EvaluationService + Send + Sync>, ServiceError>;
}

impl<F, S> ServiceBuilder for F
where
    F: Fn() -> std::result::Result<S, ServiceError>,
    S: EvaluationService + Send + Sync + 'static,
{
    fn build(
        &self,
    ) -> std::result::Result<Arc<dyn EvaluationService + Send + Sync>, ServiceError> {
        let service = self()?;
        Ok(Arc::new(service))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{BooleanEvaluationResponse, EvaluationRequest, VariantEvaluationResponse};

    #[test]
    fn request_is_camel_case() {
        let request = EvaluationRequest {
            namespace_key: "default".to_owned(),
            flag_key: "flag".to_owned(),
            entity_id: "user1".to_owned(),
            context: HashMap::from([("plan".to_owned(), "gold".to_owned())]),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "namespaceKey": "default",
                "flagKey": "flag",
                "entityId": "user1",
                "context": {"plan": "gold"},
            })
        );
    }

    #[test]
    fn parses_variant_response() {
        let response: VariantEvaluationResponse = serde_json::from_str(
            r#"{
                "match": true,
                "segmentKeys": ["segment"],
                "reason": "MATCH_EVALUATION_REASON",
                "flagKey": "flag",
                "variantKey": "v1",
                "variantAttachment": "{\"color\":\"blue\"}",
                "requestId": "00000000-0000-0000-0000-000000000000",
                "requestDurationMillis": 0.5,
                "timestamp": "2024-01-01T00:00:00Z"
            }"#,
        )
        .unwrap();

        assert!(response.is_match);
        assert_eq!(response.variant_key, "v1");
        assert_eq!(
            response.variant_attachment.as_deref(),
            Some(r#"{"color":"blue"}"#)
        );
        assert_eq!(response.segment_keys, vec!["segment".to_owned()]);
    }

    #[test]
    fn parses_minimal_responses() {
        let variant: VariantEvaluationResponse =
            serde_json::from_str(r#"{"match": false, "reason": "UNKNOWN_EVALUATION_REASON"}"#)
                .unwrap();
        assert!(!variant.is_match);
        assert_eq!(variant.variant_attachment, None);

        let boolean: BooleanEvaluationResponse =
            serde_json::from_str(r#"{"enabled": true, "reason": "MATCH_EVALUATION_REASON"}"#)
                .unwrap();
        assert!(boolean.enabled);
        assert_eq!(boolean.reason, "MATCH_EVALUATION_REASON");
    }
}
