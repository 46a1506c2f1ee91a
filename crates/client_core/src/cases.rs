use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use shared::{domain::Case, protocol::DecisionSubmission};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{info, warn};

use crate::gateway::CaseGateway;

/// Decorative progress labels shown while the backend processes a case. They
/// advance on a fixed timer and are never synchronized with real backend
/// progress.
pub const PROCESSING_NARRATIVE: [&str; 6] = [
    "Extracting clinical data from PA request...",
    "Analyzing biomarkers and disease stage...",
    "Evaluating policy criteria...",
    "Generating AI recommendation...",
    "Drafting provider and member letters...",
    "Finalizing case summary...",
];

pub const PROCESSING_COMPLETE_STEP: &str = "Processing complete!";

const NARRATIVE_TICK: Duration = Duration::from_millis(2000);

const FETCH_CASES_FALLBACK: &str = "Failed to fetch cases";
const FETCH_CASE_FALLBACK: &str = "Failed to fetch case";
const PROCESS_CASE_FALLBACK: &str = "Failed to process case";
const SUBMIT_DECISION_FALLBACK: &str = "Failed to submit decision";

/// Observable state of the case orchestrator. `loading` and `error` are
/// transient request state; the caches mirror backend records and are only
/// refreshed by explicit re-fetches, never synthesized locally.
#[derive(Debug, Clone, Default)]
pub struct CaseState {
    pub cases: Vec<Case>,
    pub current_case: Option<Case>,
    pub loading: bool,
    pub error: Option<String>,
    pub processing: bool,
    pub processing_step: String,
}

/// Single-use cancellation token for one narrative timer run. `cancel` and
/// the timer's `is_cancelled` check both execute inside `send_modify`
/// closures on the same watch channel, so a cancelled run can never write
/// another step.
#[derive(Default)]
struct NarrativeTicket {
    cancelled: AtomicBool,
}

impl NarrativeTicket {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Drives a case through pending -> processed -> decided against the backend.
/// One instance per session, shared by reference.
pub struct CaseOrchestrator {
    gateway: Arc<dyn CaseGateway>,
    state: watch::Sender<CaseState>,
}

impl CaseOrchestrator {
    pub fn new(gateway: Arc<dyn CaseGateway>) -> Arc<Self> {
        let (state, _) = watch::channel(CaseState::default());
        Arc::new(Self { gateway, state })
    }

    pub fn subscribe(&self) -> watch::Receiver<CaseState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> CaseState {
        self.state.borrow().clone()
    }

    /// Refreshes the case list cache. On failure the cache is left untouched
    /// and `error` carries the failure message or a fixed default.
    pub async fn fetch_cases(&self) {
        self.state.send_modify(|s| {
            s.error = None;
            s.loading = true;
        });
        match self.gateway.list_cases().await {
            Ok(cases) => {
                info!(count = cases.len(), "cases: list refreshed");
                self.state.send_modify(|s| {
                    s.cases = cases;
                    s.loading = false;
                });
            }
            Err(err) => {
                warn!("cases: list fetch failed: {err}");
                self.state.send_modify(|s| {
                    s.error = Some(err.display_message(FETCH_CASES_FALLBACK));
                    s.loading = false;
                });
            }
        }
    }

    /// Refreshes the single-case cache for `id`.
    pub async fn fetch_case(&self, id: &str) {
        self.state.send_modify(|s| {
            s.error = None;
            s.loading = true;
        });
        match self.gateway.get_case(id).await {
            Ok(case) => {
                self.state.send_modify(|s| {
                    s.current_case = Some(case);
                    s.loading = false;
                });
            }
            Err(err) => {
                warn!(case_id = id, "cases: fetch failed: {err}");
                self.state.send_modify(|s| {
                    s.error = Some(err.display_message(FETCH_CASE_FALLBACK));
                    s.loading = false;
                });
            }
        }
    }

    /// Asks the backend to process `id` while a repeating timer advances the
    /// decorative narrative. Only the network outcome decides the transition;
    /// the timer is cancelled exactly once on either exit path. On success the
    /// authoritative record is re-fetched, after which `processing` and
    /// `processing_step` are unconditionally cleared, so the terminal
    /// "Processing complete!" step is visible only transiently.
    pub async fn process_case(self: &Arc<Self>, id: &str) {
        let ticket = Arc::new(NarrativeTicket::default());
        self.state.send_modify(|s| {
            s.error = None;
            s.processing = true;
            s.processing_step = PROCESSING_NARRATIVE[0].to_string();
        });
        let timer = self.spawn_narrative_timer(Arc::clone(&ticket));

        match self.gateway.process_case(id).await {
            Ok(ack) => {
                info!(case_id = id, status = %ack.status, "cases: processing accepted");
                self.state.send_modify(|s| {
                    ticket.cancel();
                    s.processing_step = PROCESSING_COMPLETE_STEP.to_string();
                });
                timer.abort();
                self.fetch_case(id).await;
            }
            Err(err) => {
                warn!(case_id = id, "cases: processing failed: {err}");
                self.state.send_modify(|s| {
                    ticket.cancel();
                    s.error = Some(err.display_message(PROCESS_CASE_FALLBACK));
                });
                timer.abort();
            }
        }

        self.state.send_modify(|s| {
            s.processing = false;
            s.processing_step.clear();
        });
    }

    /// Submits the reviewer's final decision. Returns `true` iff the POST
    /// succeeded; on success the case cache is refreshed from the backend,
    /// which is the sole source of the resulting `decided` state and
    /// timestamps.
    pub async fn submit_decision(&self, id: &str, submission: &DecisionSubmission) -> bool {
        self.state.send_modify(|s| {
            s.error = None;
            s.loading = true;
        });
        let accepted = match self.gateway.submit_decision(id, submission).await {
            Ok(ack) => {
                info!(
                    case_id = id,
                    decision = %submission.final_decision,
                    status = %ack.status,
                    "cases: decision submitted"
                );
                self.fetch_case(id).await;
                true
            }
            Err(err) => {
                warn!(case_id = id, "cases: decision submission failed: {err}");
                self.state.send_modify(|s| {
                    s.error = Some(err.display_message(SUBMIT_DECISION_FALLBACK));
                });
                false
            }
        };
        self.state.send_modify(|s| s.loading = false);
        accepted
    }

    fn spawn_narrative_timer(self: &Arc<Self>, ticket: Arc<NarrativeTicket>) -> JoinHandle<()> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(NARRATIVE_TICK);
            // The first tick of a tokio interval completes immediately;
            // narrative[0] was already set at entry.
            interval.tick().await;
            let mut index = 0usize;
            loop {
                interval.tick().await;
                orchestrator.state.send_if_modified(|s| {
                    if ticket.is_cancelled() || index + 1 >= PROCESSING_NARRATIVE.len() {
                        // Clamped at the final entry even if the timer
                        // outlives the narrative.
                        return false;
                    }
                    index += 1;
                    s.processing_step = PROCESSING_NARRATIVE[index].to_string();
                    true
                });
            }
        })
    }
}

#[cfg(test)]
#[path = "tests/cases_tests.rs"]
mod tests;
