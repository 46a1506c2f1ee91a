use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle status of a prior-authorization case. Advances monotonically on
/// the server; the client only mirrors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Pending,
    Processed,
    Decided,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CaseStatus::Pending => "pending",
            CaseStatus::Processed => "processed",
            CaseStatus::Decided => "decided",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Deny,
    Pend,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Decision::Approve => "approve",
            Decision::Deny => "deny",
            Decision::Pend => "pend",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDecisionError(String);

impl fmt::Display for ParseDecisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown decision {:?}, expected approve, deny or pend", self.0)
    }
}

impl std::error::Error for ParseDecisionError {}

impl FromStr for Decision {
    type Err = ParseDecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Decision::Approve),
            "deny" => Ok(Decision::Deny),
            "pend" => Ok(Decision::Pend),
            other => Err(ParseDecisionError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionStatus {
    Met,
    Unmet,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub name: String,
    pub dob: String,
    pub member_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub primary: String,
    pub icd10: String,
    pub histology: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseStage {
    pub stage: String,
    pub tnm: String,
    pub metastatic_sites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Biomarker {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedMarker {
    pub name: String,
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Biomarkers {
    pub pd_l1: Biomarker,
    pub egfr: Biomarker,
    pub alk: Biomarker,
    pub other_markers: Vec<NamedMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStatus {
    pub ecog: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorTherapy {
    pub has_prior_systemic: bool,
    pub treatments: Vec<String>,
    pub immunotherapy_history: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestingProvider {
    pub name: String,
    pub npi: String,
    pub facility: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugRequested {
    pub name: String,
    pub dose: String,
    pub duration: String,
}

/// Clinical data extracted from the raw PA request text by server-side
/// processing. Immutable snapshot; lab values are carried as free-form JSON
/// because their shape varies per panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedData {
    pub patient_info: PatientInfo,
    pub diagnosis: Diagnosis,
    pub disease_stage: DiseaseStage,
    pub biomarkers: Biomarkers,
    #[serde(default)]
    pub labs: HashMap<String, serde_json::Value>,
    pub performance_status: PerformanceStatus,
    pub prior_therapy: PriorTherapy,
    pub comorbidities: Vec<String>,
    pub requesting_provider: RequestingProvider,
    pub drug_requested: DrugRequested,
    #[serde(rename = "_demo_mode", default, skip_serializing_if = "Option::is_none")]
    pub demo_mode: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionEvaluation {
    pub id: String,
    pub description: String,
    pub status: CriterionStatus,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiRecommendation {
    pub recommendation: Decision,
    pub confidence: Confidence,
    pub complexity: Complexity,
    pub primary_reasons: Vec<String>,
    pub information_gaps: Vec<String>,
    pub clinical_rationale: String,
    pub guideline_alignment: String,
    pub risk_considerations: Vec<String>,
    pub alternative_options: Vec<String>,
    #[serde(rename = "_demo_mode", default, skip_serializing_if = "Option::is_none")]
    pub demo_mode: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guideline {
    pub source: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    pub drug_name: String,
    pub indication: String,
    pub description: String,
    pub criteria: Vec<CriterionEvaluation>,
    pub guidelines: Vec<Guideline>,
}

// Text columns the backend leaves NULL until processing fills them.
fn null_to_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A prior-authorization case as served by the backend. The backend is the
/// sole writer; timestamps are carried as the backend's ISO-8601 strings and
/// never interpreted client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    pub title: String,
    pub raw_text: String,
    pub policy_id: String,
    pub status: CaseStatus,
    pub extracted_data: Option<ExtractedData>,
    pub criteria_evaluation: Option<Vec<CriterionEvaluation>>,
    pub ai_recommendation: Option<AiRecommendation>,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub provider_letter: String,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub member_letter: String,
    pub final_decision: Option<Decision>,
    #[serde(default, deserialize_with = "null_to_empty")]
    pub final_decision_notes: String,
    pub complexity: Option<Complexity>,
    pub created_at: String,
    pub processed_at: Option<String>,
    pub decided_at: Option<String>,
    pub turnaround_minutes: Option<i64>,
    pub drug_name: String,
    pub indication: String,
    // Policy projection, present on the single-case endpoint only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_criteria: Option<Vec<CriterionEvaluation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_guidelines: Option<Vec<Guideline>>,
}

impl Case {
    pub fn is_decided(&self) -> bool {
        self.final_decision.is_some()
    }
}

/// Point-in-time aggregate over all cases; not causally tied to any case list
/// snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_cases: u64,
    pub pending_cases: u64,
    pub processed_cases: u64,
    pub decided_cases: u64,
    pub avg_turnaround_minutes: f64,
    pub decisions: HashMap<String, u64>,
    pub complexity_distribution: HashMap<String, u64>,
}
