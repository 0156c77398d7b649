use std::str::FromStr;

use crate::{
    events::EventEmitter,
    evaluation::VARIANT_ATTACHMENT,
    lifecycle::{Lifecycle, SharedService},
    service::EvaluationRequest,
    Error, EvaluationContext, EvaluationResult, FlagMetadata, ProviderConfig, ProviderEvent,
    ProviderEventDetails, ProviderState, Reason, Result, ServiceBuilder, Value,
};

const NAME: &str = "Flipt";

/// Static information about the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderMetadata {
    /// Provider name.
    pub name: &'static str,
}

/// A feature flag provider backed by a remote Flipt server.
///
/// The provider must be initialized once with [`FliptProvider::initialize()`] before flags can be
/// evaluated. Every evaluation performs exactly one request to the server; nothing is cached.
///
/// # Examples
/// ```no_run
/// # use flipt_provider::{EvaluationContext, ProviderConfig};
/// let provider = ProviderConfig::from_url("http://localhost:8080").to_provider();
/// provider.initialize(&EvaluationContext::default()).unwrap();
///
/// let context = EvaluationContext::default().with_targeting_key("user-1");
/// let enabled = provider
///     .get_boolean_evaluation("new-checkout", false, &context)
///     .map(|result| result.value)
///     .unwrap_or(false);
/// ```
pub struct FliptProvider<'a> {
    namespace: String,
    service_builder: Box<dyn ServiceBuilder + Send + Sync + 'a>,
    events: EventEmitter<'a>,
    lifecycle: Lifecycle,
}

impl<'a> FliptProvider<'a> {
    /// Create a new `FliptProvider` using the specified configuration.
    ///
    /// The evaluation client is not built until [`FliptProvider::initialize()`].
    pub fn new(config: ProviderConfig<'a>) -> Self {
        FliptProvider {
            namespace: config.namespace,
            service_builder: config.service_builder,
            events: EventEmitter::new(config.event_handler),
            lifecycle: Lifecycle::new(),
        }
    }

    /// Provider metadata.
    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata { name: NAME }
    }

    /// Current readiness state.
    pub fn state(&self) -> ProviderState {
        self.lifecycle.state()
    }

    /// Build the evaluation client and mark the provider ready.
    ///
    /// # Errors
    ///
    /// - [`Error::DoubleInitialization`] if `initialize()` has been called before, whatever the
    /// outcome of that call. The state is left untouched.
    /// - [`Error::ProviderFatal`] if the client could not be built. The provider moves to
    /// [`ProviderState::Fatal`].
    pub fn initialize(&self, context: &EvaluationContext) -> Result<()> {
        self.lifecycle.begin_initialization().inspect_err(|_| {
            log::warn!(target: "flipt", "provider is already initialized");
        })?;

        let service = self.service_builder.build().map_err(|err| {
            log::error!(target: "flipt", error:display = err; "failed to build Flipt client");
            self.lifecycle.fail(err.to_string());
            Error::ProviderFatal(err.to_string())
        })?;

        self.lifecycle.install(service);
        log::info!(target: "flipt",
                   namespace = self.namespace.as_str(),
                   state:serde = self.lifecycle.state(),
                   context_fields = context.custom_fields.len();
                   "finished initializing provider");
        Ok(())
    }

    /// Mark the provider ready and notify the event handler.
    pub fn emit_ready(&self, details: &ProviderEventDetails) {
        self.lifecycle.set_state(ProviderState::Ready);
        self.events.emit(ProviderEvent::Ready, details);
    }

    /// Move the provider to the error state and notify the event handler.
    ///
    /// Evaluations fail with [`Error::General`] until [`FliptProvider::emit_ready()`] is called.
    pub fn emit_error(&self, details: &ProviderEventDetails) {
        self.lifecycle.set_state(ProviderState::Error);
        self.events.emit(ProviderEvent::Error, details);
    }

    /// Notify the event handler that flag configuration changed. The state is not affected.
    pub fn emit_configuration_changed(&self, details: &ProviderEventDetails) {
        self.events.emit(ProviderEvent::ConfigurationChanged, details);
    }

    /// Release the evaluation client and go back to [`ProviderState::NotReady`].
    ///
    /// The provider cannot be initialized again afterwards.
    pub fn shutdown(&self) {
        self.lifecycle.release();
        self.events.shutdown();
        log::info!(target: "flipt", "shutdown");
    }

    /// Evaluate a boolean flag.
    ///
    /// Boolean flags are evaluated by the server's dedicated boolean operation, which always
    /// answers with a value, so `_default_value` is never returned. The reason is the one reported
    /// by the server.
    ///
    /// # Errors
    ///
    /// - [`Error::ProviderNotReady`] if the provider is not initialized.
    /// - [`Error::General`] if the provider is in the error state or the request failed.
    /// - [`Error::ProviderFatal`] if initialization failed.
    pub fn get_boolean_evaluation(
        &self,
        flag_key: &str,
        _default_value: bool,
        context: &EvaluationContext,
    ) -> Result<EvaluationResult<bool>> {
        let service = self.ready_service(flag_key)?;
        let request = self.request(flag_key, context);

        let response = service.boolean(&request).map_err(|err| {
            log::error!(target: "flipt", flag_key, error:display = err; "error evaluating boolean");
            Error::General(err.to_string())
        })?;

        log::trace!(target: "flipt",
                    flag_key,
                    enabled = response.enabled,
                    reason:display = response.reason;
                    "evaluated a boolean flag");

        Ok(EvaluationResult::new(response.enabled).with_reason(response.reason))
    }

    /// Evaluate a flag as a string: the matched variant key, or `default_value`.
    ///
    /// # Errors
    ///
    /// Same as [`FliptProvider::get_object_evaluation()`].
    pub fn get_string_evaluation(
        &self,
        flag_key: &str,
        default_value: &str,
        context: &EvaluationContext,
    ) -> Result<EvaluationResult<String>> {
        let result = self.get_object_evaluation(flag_key, default_value.into(), context)?;
        Ok(result.map(Value::into_string))
    }

    /// Evaluate a flag as an integer parsed from the matched variant key.
    ///
    /// If the variant key is not an integer, `default_value` is returned while variant, reason and
    /// metadata still describe the match.
    ///
    /// # Errors
    ///
    /// Same as [`FliptProvider::get_object_evaluation()`].
    pub fn get_integer_evaluation(
        &self,
        flag_key: &str,
        default_value: i64,
        context: &EvaluationContext,
    ) -> Result<EvaluationResult<i64>> {
        let result = self.get_object_evaluation(flag_key, default_value.into(), context)?;
        Ok(result.map(|value| parse_or(flag_key, &value, default_value)))
    }

    /// Evaluate a flag as a float parsed from the matched variant key.
    ///
    /// If the variant key is not a number, `default_value` is returned while variant, reason and
    /// metadata still describe the match. Keys are parsed with [`str::parse`], so `inf`,
    /// `infinity` and `nan` (any case) resolve to non-finite values rather than the default.
    ///
    /// # Errors
    ///
    /// Same as [`FliptProvider::get_object_evaluation()`].
    pub fn get_float_evaluation(
        &self,
        flag_key: &str,
        default_value: f64,
        context: &EvaluationContext,
    ) -> Result<EvaluationResult<f64>> {
        let result = self.get_object_evaluation(flag_key, default_value.into(), context)?;
        Ok(result.map(|value| parse_or(flag_key, &value, default_value)))
    }

    /// Evaluate a variant flag.
    ///
    /// On a match, returns the variant key as [`Value::String`] with reason `TARGETING_MATCH` and
    /// the variant attachment (if any) under the `variant-attachment` metadata key. Otherwise,
    /// returns `default_value` with reason `DEFAULT`.
    ///
    /// # Errors
    ///
    /// - [`Error::ProviderNotReady`] if the provider is not initialized.
    /// - [`Error::General`] if the provider is in the error state or the request failed.
    /// - [`Error::ProviderFatal`] if initialization failed.
    pub fn get_object_evaluation(
        &self,
        flag_key: &str,
        default_value: Value,
        context: &EvaluationContext,
    ) -> Result<EvaluationResult<Value>> {
        let service = self.ready_service(flag_key)?;
        let request = self.request(flag_key, context);

        let response = service.variant(&request).map_err(|err| {
            log::error!(target: "flipt", flag_key, error:display = err; "error evaluating variant");
            Error::General(err.to_string())
        })?;

        if !response.is_match {
            log::debug!(target: "flipt",
                        flag_key,
                        reason:display = response.reason;
                        "non matching variant");
            return Ok(EvaluationResult::new(default_value).with_reason(Reason::Default));
        }

        let mut flag_metadata = FlagMetadata::new();
        // Flipt sends "" for variants without an attachment; treat it as absent.
        if let Some(attachment) = response.variant_attachment.filter(|a| !a.is_empty()) {
            flag_metadata.insert(VARIANT_ATTACHMENT.to_owned(), attachment.into());
        }

        log::trace!(target: "flipt",
                    flag_key,
                    variant_key:display = response.variant_key;
                    "evaluated a variant flag");

        Ok(EvaluationResult {
            value: Value::String(response.variant_key.clone()),
            variant: Some(response.variant_key),
            reason: Some(Reason::TargetingMatch.into()),
            error_code: None,
            error_message: None,
            flag_metadata,
        })
    }

    fn ready_service(&self, flag_key: &str) -> Result<SharedService> {
        self.lifecycle.ready_service().inspect_err(|err| {
            log::debug!(target: "flipt",
                        flag_key,
                        state:serde = self.lifecycle.state();
                        "refusing to evaluate: {}", err);
        })
    }

    fn request(&self, flag_key: &str, context: &EvaluationContext) -> EvaluationRequest {
        EvaluationRequest {
            namespace_key: self.namespace.clone(),
            flag_key: flag_key.to_owned(),
            entity_id: context.targeting_key().unwrap_or_default().to_owned(),
            context: context.to_request_context(),
        }
    }
}

/// Parse the string form of `value`, falling back to `default_value`.
fn parse_or<T: FromStr>(flag_key: &str, value: &Value, default_value: T) -> T {
    value.to_string().parse().unwrap_or_else(|_| {
        log::debug!(target: "flipt",
                    flag_key,
                    value:display;
                    "variant is not a valid number, using default value");
        default_value
    })
}
