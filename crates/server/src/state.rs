use std::sync::Arc;

use fanout_core::{
    AdmissionGate, Config, HttpTransport, PerItemFetcher, RequestDispatcher,
};

/// Shared application state
pub struct AppState {
    config: Config,
    gate: AdmissionGate,
    dispatcher: RequestDispatcher,
}

impl AppState {
    pub fn new(config: Config, transport: Arc<dyn HttpTransport>) -> Self {
        let gate = AdmissionGate::new(config.admission.max_concurrent_batches);
        let dispatcher = RequestDispatcher::new(PerItemFetcher::new(transport, &config.fetcher));
        Self {
            config,
            gate,
            dispatcher,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }
}
