use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use flipt_provider::{
    BooleanEvaluationResponse, Error, EvaluationContext, EvaluationRequest, EvaluationService,
    EventHandler, HttpClientConfig, ProviderConfig, ProviderEvent, ProviderEventDetails,
    ProviderState, ServiceError, VariantEvaluationResponse,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Matches variant `7` for `beta-user` in the `staging` namespace, enables boolean flags for the
/// `gold` plan.
struct BetaService {
    calls: Arc<AtomicUsize>,
}

impl EvaluationService for BetaService {
    fn boolean(
        &self,
        request: &EvaluationRequest,
    ) -> Result<BooleanEvaluationResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let enabled = request.context.get("plan").map(String::as_str) == Some("gold");
        Ok(BooleanEvaluationResponse {
            enabled,
            reason: "MATCH_EVALUATION_REASON".to_owned(),
            flag_key: request.flag_key.clone(),
            request_id: String::new(),
            request_duration_millis: 1.0,
            timestamp: String::new(),
        })
    }

    fn variant(
        &self,
        request: &EvaluationRequest,
    ) -> Result<VariantEvaluationResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.namespace_key != "staging" {
            return Err(ServiceError::Other(format!(
                "namespace \"{}\" not found",
                request.namespace_key
            )));
        }
        Ok(VariantEvaluationResponse {
            is_match: request.entity_id == "beta-user",
            variant_key: "7".to_owned(),
            variant_attachment: None,
            reason: "MATCH_EVALUATION_REASON".to_owned(),
            segment_keys: vec!["beta".to_owned()],
            flag_key: request.flag_key.clone(),
            request_id: String::new(),
            request_duration_millis: 1.0,
            timestamp: String::new(),
        })
    }
}

#[derive(Clone, Default)]
struct RecordingHandler {
    events: Arc<Mutex<Vec<ProviderEvent>>>,
    shutdowns: Arc<AtomicUsize>,
}

impl EventHandler for RecordingHandler {
    fn handle_event(&self, event: ProviderEvent, _details: &ProviderEventDetails) {
        self.events.lock().unwrap().push(event);
    }

    fn on_shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn full_lifecycle() {
    init_logger();

    let handler = RecordingHandler::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let service_calls = calls.clone();
    let provider = ProviderConfig::new(move || {
        Ok::<_, ServiceError>(BetaService {
            calls: service_calls.clone(),
        })
    })
    .namespace("staging")
    .event_handler(handler.clone())
    .to_provider();

    let beta = EvaluationContext::default()
        .with_targeting_key("beta-user")
        .with_custom_field("plan", "gold");
    let regular = EvaluationContext::default().with_targeting_key("someone");

    assert_eq!(
        provider.get_integer_evaluation("limit", 1, &beta),
        Err(Error::ProviderNotReady)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    provider.initialize(&EvaluationContext::default()).unwrap();
    assert_eq!(provider.state(), ProviderState::Ready);

    let limit = provider.get_integer_evaluation("limit", 1, &beta).unwrap();
    assert_eq!(limit.value, 7);
    assert_eq!(limit.reason.as_deref(), Some("TARGETING_MATCH"));

    let limit = provider.get_integer_evaluation("limit", 1, &regular).unwrap();
    assert_eq!(limit.value, 1);
    assert_eq!(limit.reason.as_deref(), Some("DEFAULT"));

    let enabled = provider.get_boolean_evaluation("checkout", false, &beta).unwrap();
    assert!(enabled.value);
    assert_eq!(enabled.reason.as_deref(), Some("MATCH_EVALUATION_REASON"));

    provider.emit_error(&ProviderEventDetails::with_message("connection lost"));
    assert_eq!(
        provider.get_string_evaluation("color", "red", &beta),
        Err(Error::General("unknown error".to_owned()))
    );

    provider.emit_ready(&ProviderEventDetails::default());
    provider.emit_configuration_changed(&ProviderEventDetails {
        flags_changed: vec!["color".to_owned()],
        ..Default::default()
    });
    assert_eq!(
        provider
            .get_string_evaluation("color", "red", &beta)
            .unwrap()
            .value,
        "7"
    );

    provider.shutdown();
    assert_eq!(provider.state(), ProviderState::NotReady);
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(
        *handler.events.lock().unwrap(),
        vec![
            ProviderEvent::Error,
            ProviderEvent::Ready,
            ProviderEvent::ConfigurationChanged,
        ]
    );
    assert_eq!(handler.shutdowns.load(Ordering::SeqCst), 1);
}

#[test]
fn service_errors_keep_their_message() {
    init_logger();

    let provider = ProviderConfig::new(|| {
        Ok::<_, ServiceError>(BetaService {
            calls: Arc::default(),
        })
    })
    .namespace("production")
    .to_provider();
    provider.initialize(&EvaluationContext::default()).unwrap();

    for flag_key in ["a", "b", "c"] {
        assert_eq!(
            provider.get_float_evaluation(flag_key, 0.5, &EvaluationContext::default()),
            Err(Error::General(
                "namespace \"production\" not found".to_owned()
            ))
        );
    }
}

#[test]
fn invalid_base_url_is_fatal() {
    init_logger();

    let provider = ProviderConfig::new(HttpClientConfig::new("::not a url::")).to_provider();

    let err = provider
        .initialize(&EvaluationContext::default())
        .unwrap_err();
    assert_eq!(
        err,
        Error::ProviderFatal("invalid base_url configuration".to_owned())
    );
    assert_eq!(provider.state(), ProviderState::Fatal);
}
