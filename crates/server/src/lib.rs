pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod server;
pub mod telemetry;

pub use config::{DEFAULT_PORT, LogFormat, ServiceConfig};
pub use error::ServiceError;
pub use extract::{Extraction, Extractor, ReadabilityExtractor, run_extraction};
pub use handler::{AppState, build_router, extract_handler};
pub use server::serve;
pub use telemetry::init_tracing;
