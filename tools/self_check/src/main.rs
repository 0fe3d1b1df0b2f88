use azure_tags_core::determinism::clock::FixedClock;
use azure_tags_core::determinism::fingerprint::response_fingerprint;
use azure_tags_core::error::CoreResult;
use azure_tags_core::evidence::model::EvaluationResponse;
use azure_tags_core::plugin::config::{ClientSecretCredential, ConfigureRequest};
use azure_tags_core::plugin::facade::{EvalRequest, TagsPlugin};
use azure_tags_core::policy::engine::PolicyEngine;
use azure_tags_core::policy::types::{Policy, PolicyPackage, PolicyResult, Violation};
use azure_tags_core::resources::cache::ResourceDataCache;
use azure_tags_core::resources::vm_tags::{PagedVmLister, StaticPager, VirtualMachine};
use azure_tags_core::resources::AttributeSet;
use azure_tags_core::validator::ResponseValidator;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// Tags every VM must carry, and the title reported when one is missing.
// `None` exercises the fallback finding title.
const REQUIRED_TAGS: &[(&str, Option<&str>)] = &[
    ("owner", Some("Missing owner tag")),
    ("environment", None),
];

/// Stand-in engine: one policy per required tag, violated when the tag is absent.
struct RequiredTagsEngine;

impl PolicyEngine for RequiredTagsEngine {
    fn execute(
        &self,
        _bundle_path: &Path,
        domain: &str,
        attributes: &AttributeSet,
    ) -> CoreResult<Vec<PolicyResult>> {
        Ok(REQUIRED_TAGS
            .iter()
            .map(|(tag, title)| {
                let violations = if attributes.contains_key(*tag) {
                    vec![]
                } else {
                    let mut v = Violation {
                        title: title.map(str::to_string),
                        description: Some(format!("tag {} is required", tag)),
                        ..Violation::default()
                    };
                    v.extra.insert("tag".to_string(), serde_json::json!(tag));
                    vec![v]
                };
                PolicyResult {
                    policy: Policy {
                        file: format!("policies/{}.rego", tag),
                        package: PolicyPackage::new(format!(
                            "data.compliance_framework.{}.{}",
                            domain, tag
                        )),
                    },
                    additional_variables: Default::default(),
                    violations,
                }
            })
            .collect())
    }
}

fn main() {
    // Runs the full Configure -> PrepareForEval -> Eval flow twice against
    // captured VM pages and a pinned clock, validates the response, and checks
    // that both runs fingerprint identically. Exits non-zero on any failure.
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let first = match run_once() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("SELF_CHECK FAIL {}", e.chain());
            std::process::exit(1);
        }
    };
    let second = match run_once() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("SELF_CHECK FAIL {}", e.chain());
            std::process::exit(1);
        }
    };

    let summary = ResponseValidator::new().validate(&first);
    println!(
        "RESPONSE_VALIDATOR overall={} observations={} findings={}",
        summary.overall, summary.observations, summary.findings
    );
    for c in &summary.checks {
        println!("CHECK {} {} {}", c.check_id, c.result, c.message);
    }

    let (fp1, fp2) = match (response_fingerprint(&first), response_fingerprint(&second)) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("FINGERPRINT FAIL {}", e.chain());
            std::process::exit(1);
        }
    };
    if fp1 != fp2 {
        eprintln!("DETERMINISM_FINGERPRINT FAIL ({} != {})", fp1, fp2);
        std::process::exit(1);
    }
    println!("DETERMINISM_FINGERPRINT PASS {}", fp1);

    if !summary.passed() {
        std::process::exit(1);
    }
}

fn run_once() -> CoreResult<EvaluationResponse> {
    let lister = PagedVmLister::new(|_: &ClientSecretCredential, _: &str| {
        Ok(StaticPager::new(captured_pages()))
    });
    let clock = FixedClock::from_rfc3339("2026-02-10T00:00:00Z")?;
    let plugin = TagsPlugin::new(lister, RequiredTagsEngine, clock);

    let ctx = plugin.configure(
        &ConfigureRequest::default()
            .with("SubscriptionId", "00000000-0000-0000-0000-000000000001")
            .with("ClientId", "self-check-client")
            .with("TenantId", "self-check-tenant"),
        Some("self-check-secret"),
    )?;
    let mut cache = ResourceDataCache::new();
    plugin.prepare_for_eval(&ctx, &mut cache)?;
    plugin.eval(
        &cache,
        &EvalRequest {
            bundle_path: PathBuf::from("bundles/azure_tags.tar.gz"),
        },
    )
}

fn captured_pages() -> Vec<Vec<VirtualMachine>> {
    let vm = |name: &str, tags: &[(&str, Option<&str>)]| VirtualMachine {
        id: Some(format!(
            "/subscriptions/00000000-0000-0000-0000-000000000001/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/{}",
            name
        )),
        tags: tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect::<BTreeMap<_, _>>(),
    };
    vec![
        vec![
            vm("web-1", &[("owner", Some("platform")), ("environment", Some("prod"))]),
            vm("web-2", &[("owner", Some("platform")), ("environment", None)]),
        ],
        vec![vm("batch-1", &[])],
    ]
}
