use flipt_provider::{EvaluationContext, ProviderConfig, ProviderEvent, ProviderEventDetails};

pub fn main() {
    env_logger::init();

    let url = std::env::var("FLIPT_URL")
        .unwrap_or_else(|_| flipt_provider::HttpClientConfig::DEFAULT_BASE_URL.to_owned());
    let namespace = std::env::var("FLIPT_NAMESPACE")
        .unwrap_or_else(|_| ProviderConfig::DEFAULT_NAMESPACE.to_owned());

    let provider = ProviderConfig::from_url(url)
        .namespace(namespace)
        .event_handler(|event: ProviderEvent, details: &ProviderEventDetails| {
            println!("Provider event: {:?} {:?}", event, details);
        })
        .to_provider();

    // Builds the HTTP client. Until this call returns, all evaluations fail with
    // ProviderNotReady.
    provider
        .initialize(&EvaluationContext::default())
        .expect("failed to initialize Flipt provider");

    let context = EvaluationContext::default()
        .with_targeting_key("test-subject")
        .with_custom_field("plan", "gold");

    let enabled = provider
        .get_boolean_evaluation("a-boolean-flag", false, &context)
        .map(|result| result.value)
        // default value
        .unwrap_or(false);
    println!("Boolean flag: {:?}", enabled);

    let color = provider.get_string_evaluation("a-variant-flag", "red", &context);
    println!("Variant flag: {:?}", color);

    provider.shutdown();
}
