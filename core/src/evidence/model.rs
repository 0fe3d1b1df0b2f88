use serde::{Deserialize, Serialize};

pub const RUN_LOG_TITLE: &str = "Plugin checks completed";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Evidence {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Observation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub collected: String, // RFC3339 UTC
    pub expires: String,   // collected + 1 month
    pub relevant_evidence: Vec<Evidence>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    pub id: String,
    pub title: String,
    pub description: String,
    pub remarks: String,
    pub related_observations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub title: String,
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvaluationResponse {
    pub observations: Vec<Observation>,
    pub findings: Vec<Finding>,
    pub logs: Vec<LogEntry>,
}

impl EvaluationResponse {
    pub fn add_observation(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    pub fn add_finding(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn add_log_entry(&mut self, entry: LogEntry) {
        self.logs.push(entry);
    }

    pub fn findings_for<'a>(&'a self, observation_id: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.findings
            .iter()
            .filter(move |f| f.related_observations.iter().any(|id| id == observation_id))
    }
}
