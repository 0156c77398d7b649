use crate::{
    events::NoopEventHandler, EventHandler, FliptProvider, HttpClientConfig, ServiceBuilder,
};

/// Configuration for [`FliptProvider`].
///
/// # Examples
/// ```
/// # use flipt_provider::{ProviderConfig, ProviderEvent, ProviderEventDetails};
/// let provider = ProviderConfig::from_url("http://localhost:8080")
///     .namespace("production")
///     .event_handler(|event: ProviderEvent, details: &ProviderEventDetails| {
///         println!("{:?}: {:?}", event, details);
///     })
///     .to_provider();
/// ```
pub struct ProviderConfig<'a> {
    pub(crate) namespace: String,
    pub(crate) service_builder: Box<dyn ServiceBuilder + Send + Sync + 'a>,
    pub(crate) event_handler: Box<dyn EventHandler + Send + Sync + 'a>,
}

impl<'a> ProviderConfig<'a> {
    /// Namespace used when none is configured.
    pub const DEFAULT_NAMESPACE: &'static str = "default";

    /// Create a configuration that builds the evaluation client with `service_builder`.
    pub fn new(service_builder: impl ServiceBuilder + Send + Sync + 'a) -> Self {
        ProviderConfig {
            namespace: ProviderConfig::DEFAULT_NAMESPACE.to_owned(),
            service_builder: Box::new(service_builder),
            event_handler: Box::new(NoopEventHandler),
        }
    }

    /// Create a configuration talking to the Flipt server at `base_url` over HTTP.
    ///
    /// ```
    /// # use flipt_provider::ProviderConfig;
    /// ProviderConfig::from_url("http://localhost:8080");
    /// ```
    pub fn from_url(base_url: impl Into<String>) -> Self {
        ProviderConfig::new(HttpClientConfig::new(base_url))
    }

    /// Set the namespace flags are evaluated in.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the handler receiving provider lifecycle events.
    pub fn event_handler(mut self, event_handler: impl EventHandler + Send + Sync + 'a) -> Self {
        self.event_handler = Box::new(event_handler);
        self
    }

    /// Create a new [`FliptProvider`] using the specified configuration.
    pub fn to_provider(self) -> FliptProvider<'a> {
        FliptProvider::new(self)
    }
}
