use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::gateway::CaseGateway;

#[derive(Debug, Clone)]
pub struct StatusState {
    pub demo_mode: bool,
    pub loading: bool,
}

impl Default for StatusState {
    fn default() -> Self {
        Self {
            demo_mode: true,
            loading: false,
        }
    }
}

/// Fetches the backend's demo-mode flag. The only component that absorbs
/// failures silently: an unreachable status endpoint reads as demo mode.
pub struct StatusService {
    gateway: Arc<dyn CaseGateway>,
    state: watch::Sender<StatusState>,
}

impl StatusService {
    pub fn new(gateway: Arc<dyn CaseGateway>) -> Arc<Self> {
        let (state, _) = watch::channel(StatusState::default());
        Arc::new(Self { gateway, state })
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> StatusState {
        self.state.borrow().clone()
    }

    pub async fn fetch_status(&self) {
        self.state.send_modify(|s| s.loading = true);
        match self.gateway.status().await {
            Ok(status) => {
                self.state.send_modify(|s| s.demo_mode = status.demo_mode);
            }
            Err(err) => {
                warn!("status: fetch failed, assuming demo mode: {err}");
                self.state.send_modify(|s| s.demo_mode = true);
            }
        }
        self.state.send_modify(|s| s.loading = false);
    }
}

#[cfg(test)]
#[path = "tests/status_tests.rs"]
mod tests;
