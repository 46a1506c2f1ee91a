use serde::{Deserialize, Serialize};

use crate::domain::Decision;

/// Body of `POST /cases/{id}/decide`. Field values are passed through to the
/// backend unvalidated; validation is the backend's responsibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSubmission {
    pub final_decision: Decision,
    pub decision_notes: String,
    pub provider_letter: String,
    pub member_letter: String,
}

/// Envelope returned by the mutating case endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationAck {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    pub demo_mode: bool,
}
