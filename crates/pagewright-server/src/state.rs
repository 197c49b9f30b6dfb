use std::sync::Arc;

use codegen_agent::Generator;
use pagewright_core::Config;

use crate::github::GithubPublisher;
use crate::notify::Notifier;

/// Shared application state passed to all route handlers.
///
/// Built once at startup from the immutable [`Config`]; nothing here mutates
/// after construction, so concurrent requests share it freely.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Arc<Generator>,
    pub publisher: Arc<GithubPublisher>,
    pub notifier: Arc<Notifier>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let generator = Generator::from_config(&config.generator);
        let publisher = GithubPublisher::new(&config.github);
        Self::with_components(config, generator, publisher, Notifier::new())
    }

    /// Explicit-component constructor; tests use it to inject fast retry
    /// policies.
    pub fn with_components(
        config: Config,
        generator: Generator,
        publisher: GithubPublisher,
        notifier: Notifier,
    ) -> Self {
        Self {
            config: Arc::new(config),
            generator: Arc::new(generator),
            publisher: Arc::new(publisher),
            notifier: Arc::new(notifier),
        }
    }
}
