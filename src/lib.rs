//! A feature flag provider for [Flipt](https://www.flipt.io).
//!
//! # Overview
//!
//! The crate revolves around a [`FliptProvider`] that evaluates feature flags on a remote Flipt
//! server for an [`EvaluationContext`], i.e., a subject identified by a targeting key with
//! key-value attributes. Every evaluation results in an [`EvaluationResult`] carrying the value,
//! the matched variant, a reason and flag metadata.
//!
//! # Lifecycle
//!
//! A provider starts in [`ProviderState::NotReady`] and must be initialized exactly once with
//! [`FliptProvider::initialize()`], which builds the evaluation client. Evaluations fail with
//! [`Error::ProviderNotReady`] until then. The host application may signal readiness changes with
//! [`FliptProvider::emit_ready()`] and [`FliptProvider::emit_error()`]; these are forwarded to the
//! configured [`EventHandler`].
//!
//! ```
//! # use flipt_provider::{ProviderConfig, ProviderEvent, ProviderEventDetails};
//! let provider = ProviderConfig::from_url("http://localhost:8080")
//!     .event_handler(|event: ProviderEvent, _details: &ProviderEventDetails| {
//!         println!("provider event: {:?}", event);
//!     })
//!     .to_provider();
//! ```
//!
//! # Typed evaluations
//!
//! - [`FliptProvider::get_boolean_evaluation()`] uses Flipt's boolean evaluation.
//! - [`FliptProvider::get_object_evaluation()`] uses Flipt's variant evaluation and resolves to the
//! matched variant key.
//! - [`FliptProvider::get_string_evaluation()`], [`FliptProvider::get_integer_evaluation()`] and
//! [`FliptProvider::get_float_evaluation()`] are derived from the variant evaluation.
//!
//! # Error Handling
//!
//! Errors are represented by the [`Error`] enum. Failures talking to the server are reported as
//! [`Error::General`] with the underlying message. Requests are never retried.
//!
//! # Logging
//!
//! The package uses the [`log`](https://docs.rs/log/latest/log/) crate for logging
//! messages under the `flipt` target. Consider integrating a `log`-compatible logger
//! implementation for better visibility into provider operations.

#![warn(rustdoc::missing_crate_level_docs)]
#![warn(missing_docs)]

mod config;
mod context;
mod error;
mod evaluation;
mod events;
mod http;
mod lifecycle;
mod provider;
mod service;
mod value;

pub use config::ProviderConfig;
pub use context::{EvaluationContext, TARGETING_KEY};
pub use error::{Error, ErrorCode, Result, ServiceError};
pub use evaluation::{EvaluationResult, FlagMetadata, MetadataValue, Reason, VARIANT_ATTACHMENT};
pub use events::{EventHandler, ProviderEvent, ProviderEventDetails};
pub use http::{HttpClientConfig, HttpEvaluationService};
pub use lifecycle::ProviderState;
pub use provider::{FliptProvider, ProviderMetadata};
pub use service::{
    BooleanEvaluationResponse, EvaluationRequest, EvaluationService, ServiceBuilder,
    VariantEvaluationResponse,
};
pub use value::Value;
