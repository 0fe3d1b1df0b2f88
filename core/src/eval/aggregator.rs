use crate::determinism::clock::{format_timestamp, Clock};
use crate::error::{CoreError, CoreResult};
use crate::evidence::model::{EvaluationResponse, LogEntry, RUN_LOG_TITLE};
use crate::evidence::synth::{synthesize_compliant, synthesize_non_compliant};
use crate::policy::classify::{classify, Classification};
use crate::policy::types::PolicyResult;
use crate::resources::{AttributeSet, ResourceAttributeSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RunStats {
    resources: usize,
    policy_results: usize,
    compliant: usize,
    non_compliant: usize,
}

/// One evaluation pass over every cached resource.
///
/// `evaluate` is called once per resource with the policy domain and that
/// resource's attributes. Any error aborts the pass and no response is
/// returned. Resources with no policy results contribute no records.
pub fn run<F, C>(
    resources: &ResourceAttributeSet,
    policy_domain: &str,
    mut evaluate: F,
    clock: &C,
) -> CoreResult<EvaluationResponse>
where
    F: FnMut(&str, &AttributeSet) -> CoreResult<Vec<PolicyResult>>,
    C: Clock,
{
    let start = format_timestamp(clock.now())?;
    let mut response = EvaluationResponse::default();
    let mut stats = RunStats::default();

    for (resource_id, attributes) in resources {
        let results = evaluate(policy_domain, attributes).map_err(|e| CoreError::Evaluation {
            resource_id: resource_id.clone(),
            source: Box::new(e),
        })?;
        stats.resources += 1;
        tracing::debug!(
            resource_id = %resource_id,
            policy_results = results.len(),
            "evaluated resource"
        );

        for result in &results {
            stats.policy_results += 1;
            let package = &result.policy.package;
            match classify(result) {
                Classification::Compliant => {
                    stats.compliant += 1;
                    response.add_observation(synthesize_compliant(resource_id, package, clock)?);
                }
                Classification::NonCompliant(violations) => {
                    stats.non_compliant += 1;
                    tracing::debug!(
                        resource_id = %resource_id,
                        policy = %package,
                        violations = violations.len(),
                        "policy reported violations"
                    );
                    let (observation, findings) =
                        synthesize_non_compliant(resource_id, package, &violations, clock)?;
                    response.add_observation(observation);
                    for finding in findings {
                        response.add_finding(finding);
                    }
                }
            }
        }
    }

    response.add_log_entry(LogEntry {
        title: RUN_LOG_TITLE.to_string(),
        start,
        end: format_timestamp(clock.now())?,
    });
    tracing::info!(
        resources = stats.resources,
        policy_results = stats.policy_results,
        compliant = stats.compliant,
        non_compliant = stats.non_compliant,
        findings = response.findings.len(),
        "plugin checks completed"
    );
    Ok(response)
}
