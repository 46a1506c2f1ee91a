use std::sync::Arc;

use shared::domain::{Case, Metrics};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::gateway::CaseGateway;

const FETCH_METRICS_FALLBACK: &str = "Failed to fetch metrics";

/// Observable state of the metrics view. `decided_cases` is computed
/// client-side from the full case list; there is no dedicated backend
/// endpoint for it.
#[derive(Debug, Clone, Default)]
pub struct MetricsState {
    pub metrics: Option<Metrics>,
    pub decided_cases: Vec<Case>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Aggregate metrics plus the decided-cases view, derived from two sequential
/// non-transactional fetches. Independent of the case orchestrator's caches;
/// a decision submitted there is not visible here until the next
/// `fetch_metrics`.
pub struct MetricsAggregator {
    gateway: Arc<dyn CaseGateway>,
    state: watch::Sender<MetricsState>,
}

impl MetricsAggregator {
    pub fn new(gateway: Arc<dyn CaseGateway>) -> Arc<Self> {
        let (state, _) = watch::channel(MetricsState::default());
        Arc::new(Self { gateway, state })
    }

    pub fn subscribe(&self) -> watch::Receiver<MetricsState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> MetricsState {
        self.state.borrow().clone()
    }

    /// Fetches the metrics snapshot, then the full case list for the decided
    /// view. The two calls are not transactional: if the first succeeds and
    /// the second fails, the metrics snapshot keeps its new value while the
    /// decided view keeps its prior one, and `error` reflects the second
    /// failure.
    pub async fn fetch_metrics(&self) {
        self.state.send_modify(|s| {
            s.error = None;
            s.loading = true;
        });
        let outcome = async {
            let metrics = self.gateway.metrics().await?;
            self.state.send_modify(|s| s.metrics = Some(metrics));
            let cases = self.gateway.list_cases().await?;
            let decided: Vec<Case> = cases.into_iter().filter(Case::is_decided).collect();
            info!(decided = decided.len(), "metrics: view refreshed");
            self.state.send_modify(|s| s.decided_cases = decided);
            Ok::<(), crate::gateway::GatewayError>(())
        }
        .await;
        if let Err(err) = outcome {
            warn!("metrics: fetch failed: {err}");
            self.state
                .send_modify(|s| s.error = Some(err.display_message(FETCH_METRICS_FALLBACK)));
        }
        self.state.send_modify(|s| s.loading = false);
    }
}

#[cfg(test)]
#[path = "tests/metrics_tests.rs"]
mod tests;
