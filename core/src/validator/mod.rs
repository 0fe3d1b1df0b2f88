use crate::determinism::clock::{add_one_month, parse_timestamp};
use crate::error::CoreResult;
use crate::evidence::model::{EvaluationResponse, RUN_LOG_TITLE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

pub const VALIDATOR_VERSION: &str = "response_validator_v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub check_id: String,
    pub result: String, // PASS|FAIL
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub validator_version: String,
    pub overall: String, // PASS|FAIL
    pub observations: usize,
    pub findings: usize,
    pub checks: Vec<CheckResult>,
}

impl ValidationSummary {
    pub fn passed(&self) -> bool {
        self.overall == "PASS"
    }

    pub fn result_for_check(&self, check_id: &str) -> (String, String) {
        for c in &self.checks {
            if c.check_id == check_id {
                return (c.result.clone(), c.message.clone());
            }
        }
        (
            "FAIL".to_string(),
            format!("missing check result for {}", check_id),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_json_file(&self, path: &Path) -> CoreResult<ValidationSummary> {
        let body = std::fs::read_to_string(path)?;
        let response: EvaluationResponse = serde_json::from_str(&body)?;
        Ok(self.validate(&response))
    }

    pub fn validate(&self, response: &EvaluationResponse) -> ValidationSummary {
        let checks = vec![
            check_ids_unique(response),
            check_observation_timestamps(response),
            check_observation_evidence(response),
            check_finding_backrefs(response),
            check_run_log_entry(response),
        ];
        let overall = if checks.iter().all(|c| c.result == "PASS") {
            "PASS"
        } else {
            "FAIL"
        };
        ValidationSummary {
            validator_version: VALIDATOR_VERSION.to_string(),
            overall: overall.to_string(),
            observations: response.observations.len(),
            findings: response.findings.len(),
            checks,
        }
    }
}

fn pass(check_id: &str) -> CheckResult {
    CheckResult {
        check_id: check_id.to_string(),
        result: "PASS".to_string(),
        message: "ok".to_string(),
    }
}

fn fail(check_id: &str, message: String) -> CheckResult {
    CheckResult {
        check_id: check_id.to_string(),
        result: "FAIL".to_string(),
        message,
    }
}

fn check_ids_unique(response: &EvaluationResponse) -> CheckResult {
    let id = "CHK.IDS.UNIQUE";
    let mut seen = BTreeSet::new();
    let ids = response
        .observations
        .iter()
        .map(|o| &o.id)
        .chain(response.findings.iter().map(|f| &f.id));
    for record_id in ids {
        if record_id.trim().is_empty() {
            return fail(id, "record with empty id".to_string());
        }
        if !seen.insert(record_id) {
            return fail(id, format!("duplicate record id {}", record_id));
        }
    }
    pass(id)
}

fn check_observation_timestamps(response: &EvaluationResponse) -> CheckResult {
    let id = "CHK.OBSERVATION.TIMESTAMPS";
    for o in &response.observations {
        let collected = match parse_timestamp(&o.collected) {
            Ok(v) => v,
            Err(e) => return fail(id, format!("observation {}: {}", o.id, e)),
        };
        let expires = match parse_timestamp(&o.expires) {
            Ok(v) => v,
            Err(e) => return fail(id, format!("observation {}: {}", o.id, e)),
        };
        if add_one_month(collected) != expires {
            return fail(
                id,
                format!(
                    "observation {} expires {} is not one month after {}",
                    o.id, o.expires, o.collected
                ),
            );
        }
    }
    pass(id)
}

fn check_observation_evidence(response: &EvaluationResponse) -> CheckResult {
    let id = "CHK.OBSERVATION.EVIDENCE";
    for o in &response.observations {
        if o.relevant_evidence.is_empty() {
            return fail(id, format!("observation {} has no evidence", o.id));
        }
    }
    pass(id)
}

fn check_finding_backrefs(response: &EvaluationResponse) -> CheckResult {
    let id = "CHK.FINDING.BACKREF";
    let observation_ids: BTreeSet<&str> =
        response.observations.iter().map(|o| o.id.as_str()).collect();
    for f in &response.findings {
        match f.related_observations.as_slice() {
            [related] if observation_ids.contains(related.as_str()) => {}
            [related] => {
                return fail(
                    id,
                    format!("finding {} references unknown observation {}", f.id, related),
                )
            }
            other => {
                return fail(
                    id,
                    format!(
                        "finding {} references {} observations, expected 1",
                        f.id,
                        other.len()
                    ),
                )
            }
        }
    }
    pass(id)
}

fn check_run_log_entry(response: &EvaluationResponse) -> CheckResult {
    let id = "CHK.LOG.RUN_ENTRY";
    let entries: Vec<_> = response
        .logs
        .iter()
        .filter(|l| l.title == RUN_LOG_TITLE)
        .collect();
    let [entry] = entries.as_slice() else {
        return fail(
            id,
            format!("expected 1 run log entry, found {}", entries.len()),
        );
    };
    let (start, end) = match (parse_timestamp(&entry.start), parse_timestamp(&entry.end)) {
        (Ok(s), Ok(e)) => (s, e),
        (Err(e), _) | (_, Err(e)) => return fail(id, e.to_string()),
    };
    if start > end {
        return fail(
            id,
            format!("run log start {} is after end {}", entry.start, entry.end),
        );
    }
    pass(id)
}
