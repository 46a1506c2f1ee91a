pub mod cases;
pub mod config;
pub mod gateway;
pub mod metrics;
pub mod status;

pub use cases::{CaseOrchestrator, CaseState, PROCESSING_COMPLETE_STEP, PROCESSING_NARRATIVE};
pub use config::{load_settings, Settings};
pub use gateway::{CaseGateway, GatewayError, HttpCaseGateway};
pub use metrics::{MetricsAggregator, MetricsState};
pub use status::{StatusService, StatusState};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
