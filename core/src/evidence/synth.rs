use crate::determinism::clock::{add_one_month, format_timestamp, normalize, Clock};
use crate::determinism::record_id::{finding_id, observation_id};
use crate::error::CoreResult;
use crate::policy::types::{PolicyPackage, Violation};

use super::model::{Evidence, Finding, Observation};

const PASS_TITLE: &str = "The plugin succeeded. No compliance issues to report.";
const PASS_DESCRIPTION: &str =
    "The plugin policies did not return any violations. The configuration is in compliance with policies.";

pub fn synthesize_compliant<C: Clock>(
    resource_id: &str,
    policy: &PolicyPackage,
    clock: &C,
) -> CoreResult<Observation> {
    let (collected, expires) = collection_window(clock)?;
    Ok(Observation {
        id: observation_id(),
        title: PASS_TITLE.to_string(),
        description: PASS_DESCRIPTION.to_string(),
        collected,
        expires,
        relevant_evidence: vec![Evidence {
            description: format!(
                "Policy {} was evaluated, and no violations were found on machineId: {}",
                policy, resource_id
            ),
        }],
    })
}

pub fn synthesize_non_compliant<C: Clock>(
    resource_id: &str,
    policy: &PolicyPackage,
    violations: &[Violation],
    clock: &C,
) -> CoreResult<(Observation, Vec<Finding>)> {
    let (collected, expires) = collection_window(clock)?;
    let count = violations.len();
    let observation = Observation {
        id: observation_id(),
        title: format!(
            "The plugin found violations for policy {} on machineId: {}",
            policy, resource_id
        ),
        description: format!(
            "Observed {} violation(s) for policy {} within the Plugin on machineId: {}.",
            count, policy, resource_id
        ),
        collected,
        expires,
        relevant_evidence: vec![Evidence {
            description: format!(
                "Policy {} was evaluated, and {} violations were found on machineId: {}",
                policy, count, resource_id
            ),
        }],
    };

    let findings = violations
        .iter()
        .map(|v| Finding {
            id: finding_id(),
            title: v.title_or_else(|| {
                format!(
                    "Validation on {} failed with violation {}",
                    policy,
                    v.payload()
                )
            }),
            description: v.description_or_empty(),
            remarks: v.remarks_or_empty(),
            related_observations: vec![observation.id.clone()],
        })
        .collect();

    Ok((observation, findings))
}

// Single clock read per observation.
fn collection_window<C: Clock>(clock: &C) -> CoreResult<(String, String)> {
    let now = normalize(clock.now());
    Ok((format_timestamp(now)?, format_timestamp(add_one_month(now))?))
}
