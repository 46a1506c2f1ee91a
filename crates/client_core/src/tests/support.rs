use std::{
    collections::HashMap,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use shared::{
    domain::{Case, CaseStatus, Decision, Metrics},
    protocol::{BackendStatus, DecisionSubmission, OperationAck},
};

use crate::gateway::{CaseGateway, GatewayError};

pub(crate) fn sample_case(id: &str) -> Case {
    Case {
        id: id.to_string(),
        title: format!("Pembrolizumab - {id}"),
        raw_text: "PA request text".to_string(),
        policy_id: "pol-pembro".to_string(),
        status: CaseStatus::Pending,
        extracted_data: None,
        criteria_evaluation: None,
        ai_recommendation: None,
        provider_letter: String::new(),
        member_letter: String::new(),
        final_decision: None,
        final_decision_notes: String::new(),
        complexity: None,
        created_at: "2026-08-01T09:00:00".to_string(),
        processed_at: None,
        decided_at: None,
        turnaround_minutes: None,
        drug_name: "Pembrolizumab".to_string(),
        indication: "NSCLC".to_string(),
        policy_description: None,
        policy_criteria: None,
        policy_guidelines: None,
    }
}

pub(crate) fn decided_case(id: &str) -> Case {
    let mut case = sample_case(id);
    case.status = CaseStatus::Decided;
    case.final_decision = Some(Decision::Approve);
    case.decided_at = Some("2026-08-01T10:00:00".to_string());
    case.turnaround_minutes = Some(60);
    case
}

pub(crate) fn sample_metrics(total: u64) -> Metrics {
    Metrics {
        total_cases: total,
        pending_cases: 1,
        processed_cases: 1,
        decided_cases: 1,
        avg_turnaround_minutes: 42.0,
        decisions: HashMap::from([("approve".to_string(), 1)]),
        complexity_distribution: HashMap::from([("low".to_string(), 1)]),
    }
}

pub(crate) fn sample_submission() -> DecisionSubmission {
    DecisionSubmission {
        final_decision: Decision::Approve,
        decision_notes: "meets all required criteria".to_string(),
        provider_letter: "Dear provider".to_string(),
        member_letter: "Dear member".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    List,
    Get,
    Process,
    Decide,
    Metrics,
    Status,
}

/// Scripted gateway double. Operations succeed with canned data unless a
/// failure is scripted; delays let paused-clock tests control when the
/// process POST and follow-up GET resolve.
pub(crate) struct MockGateway {
    pub(crate) case: Case,
    pub(crate) demo_mode: bool,
    pub(crate) process_delay: Duration,
    pub(crate) get_delay: Duration,
    cases: Mutex<Vec<Case>>,
    metrics_value: Mutex<Metrics>,
    failures: Mutex<HashMap<Op, Option<String>>>,
    calls: Mutex<Vec<String>>,
}

impl MockGateway {
    pub(crate) fn new() -> Self {
        Self {
            case: sample_case("case-1"),
            demo_mode: true,
            process_delay: Duration::ZERO,
            get_delay: Duration::ZERO,
            cases: Mutex::new(vec![sample_case("case-1"), sample_case("case-2")]),
            metrics_value: Mutex::new(sample_metrics(3)),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Scripts `op` to fail with a server error; `detail` mirrors the
    /// optional server-provided message.
    pub(crate) fn script_failure(&self, op: Op, detail: Option<&str>) {
        self.failures
            .lock()
            .expect("failures lock")
            .insert(op, detail.map(str::to_string));
    }

    pub(crate) fn script_success(&self, op: Op) {
        self.failures.lock().expect("failures lock").remove(&op);
    }

    pub(crate) fn set_cases(&self, cases: Vec<Case>) {
        *self.cases.lock().expect("cases lock") = cases;
    }

    pub(crate) fn set_metrics(&self, metrics: Metrics) {
        *self.metrics_value.lock().expect("metrics lock") = metrics;
    }

    pub(crate) fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn check(&self, op: Op) -> Result<(), GatewayError> {
        if let Some(detail) = self.failures.lock().expect("failures lock").get(&op) {
            return Err(GatewayError::Server {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: detail.clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CaseGateway for MockGateway {
    async fn list_cases(&self) -> Result<Vec<Case>, GatewayError> {
        self.record("list_cases".to_string());
        self.check(Op::List)?;
        Ok(self.cases.lock().expect("cases lock").clone())
    }

    async fn get_case(&self, id: &str) -> Result<Case, GatewayError> {
        self.record(format!("get_case:{id}"));
        tokio::time::sleep(self.get_delay).await;
        self.check(Op::Get)?;
        let mut case = self.case.clone();
        case.id = id.to_string();
        Ok(case)
    }

    async fn process_case(&self, id: &str) -> Result<OperationAck, GatewayError> {
        self.record(format!("process_case:{id}"));
        tokio::time::sleep(self.process_delay).await;
        self.check(Op::Process)?;
        Ok(OperationAck {
            status: "success".to_string(),
            message: "Case processed".to_string(),
        })
    }

    async fn submit_decision(
        &self,
        id: &str,
        _submission: &DecisionSubmission,
    ) -> Result<OperationAck, GatewayError> {
        self.record(format!("submit_decision:{id}"));
        self.check(Op::Decide)?;
        Ok(OperationAck {
            status: "success".to_string(),
            message: "Decision recorded".to_string(),
        })
    }

    async fn metrics(&self) -> Result<Metrics, GatewayError> {
        self.record("metrics".to_string());
        self.check(Op::Metrics)?;
        Ok(self.metrics_value.lock().expect("metrics lock").clone())
    }

    async fn status(&self) -> Result<BackendStatus, GatewayError> {
        self.record("status".to_string());
        self.check(Op::Status)?;
        Ok(BackendStatus {
            demo_mode: self.demo_mode,
        })
    }
}
