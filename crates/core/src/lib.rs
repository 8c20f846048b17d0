pub mod admission;
pub mod aggregate;
pub mod config;
pub mod dispatcher;
pub mod fetcher;
pub mod testing;

pub use admission::{AdmissionError, AdmissionGate, AdmissionStats, AdmissionToken};
pub use aggregate::{AggregateResponse, ResultAggregator};
pub use config::{
    load_config, load_config_from_str, load_default_config, validate_config, AdmissionConfig,
    BatchConfig, Config, ConfigError, FetcherConfig, ServerConfig, ShutdownConfig,
};
pub use dispatcher::{BatchError, BatchRequest, BatchRequestError, RequestDispatcher};
pub use fetcher::{
    FetchError, FetchOutcome, HttpTransport, PerItemFetcher, ReqwestTransport, TransportError,
    TransportResponse,
};
