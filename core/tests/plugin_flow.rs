use azure_tags_core::determinism::clock::FixedClock;
use azure_tags_core::error::{CoreError, CoreResult};
use azure_tags_core::plugin::config::{ClientSecretCredential, ConfigureRequest};
use azure_tags_core::plugin::facade::{EvalRequest, TagsPlugin};
use azure_tags_core::policy::engine::PolicyEngine;
use azure_tags_core::policy::types::{Policy, PolicyPackage, PolicyResult, Violation};
use azure_tags_core::resources::cache::ResourceDataCache;
use azure_tags_core::resources::lister::ResourceLister;
use azure_tags_core::resources::{AttributeSet, ResourceAttributeSet};
use serde_json::json;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

struct FakeLister {
    responses: RefCell<Vec<CoreResult<ResourceAttributeSet>>>,
    seen_subscriptions: RefCell<Vec<String>>,
}

impl FakeLister {
    fn new(responses: Vec<CoreResult<ResourceAttributeSet>>) -> Self {
        Self {
            responses: RefCell::new(responses),
            seen_subscriptions: RefCell::new(Vec::new()),
        }
    }
}

impl ResourceLister for FakeLister {
    fn list_resource_tags(
        &self,
        _credential: &ClientSecretCredential,
        subscription_id: &str,
    ) -> CoreResult<ResourceAttributeSet> {
        self.seen_subscriptions
            .borrow_mut()
            .push(subscription_id.to_string());
        self.responses.borrow_mut().remove(0)
    }
}

/// Flags every resource missing an `owner` tag.
struct OwnerTagEngine {
    bundles: RefCell<Vec<PathBuf>>,
    domains: RefCell<Vec<String>>,
}

impl PolicyEngine for OwnerTagEngine {
    fn execute(
        &self,
        bundle_path: &Path,
        domain: &str,
        attributes: &AttributeSet,
    ) -> CoreResult<Vec<PolicyResult>> {
        self.bundles.borrow_mut().push(bundle_path.to_path_buf());
        self.domains.borrow_mut().push(domain.to_string());
        let violations = if attributes.contains_key("owner") {
            vec![]
        } else {
            vec![Violation::titled("Missing owner tag")]
        };
        Ok(vec![PolicyResult {
            policy: Policy {
                file: "owner.rego".to_string(),
                package: PolicyPackage::new("data.compliance_framework.azure_tags.owner"),
            },
            additional_variables: Default::default(),
            violations,
        }])
    }
}

fn engine() -> OwnerTagEngine {
    OwnerTagEngine {
        bundles: RefCell::new(Vec::new()),
        domains: RefCell::new(Vec::new()),
    }
}

fn configure_request() -> ConfigureRequest {
    ConfigureRequest::default()
        .with("SubscriptionId", "sub-1")
        .with("ClientId", "client-1")
        .with("TenantId", "tenant-1")
}

fn clock() -> FixedClock {
    FixedClock::from_rfc3339("2026-02-10T00:00:00Z").unwrap()
}

fn two_vms() -> ResourceAttributeSet {
    let mut r = ResourceAttributeSet::new();
    let mut tagged = AttributeSet::new();
    tagged.insert("owner".to_string(), json!("platform"));
    r.insert("vm-tagged".to_string(), tagged);
    r.insert("vm-bare".to_string(), AttributeSet::new());
    r
}

fn eval_request() -> EvalRequest {
    EvalRequest {
        bundle_path: PathBuf::from("/bundles/tags"),
    }
}

#[test]
fn configure_rejects_missing_secret_and_fields() {
    let plugin = TagsPlugin::new(FakeLister::new(vec![]), engine(), clock());

    let err = plugin.configure(&configure_request(), None).unwrap_err();
    assert!(matches!(err, CoreError::Configuration(_)));
    assert!(err.to_string().contains("AZURE_CLIENT_SECRET"));

    let partial = ConfigureRequest::default().with("SubscriptionId", "sub-1");
    let err = plugin.configure(&partial, Some("s3cret")).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("ClientId"));
    assert!(msg.contains("TenantId"));
    assert!(!msg.contains("SubscriptionId"));
}

#[test]
fn eval_before_prepare_is_not_configured() {
    let plugin = TagsPlugin::new(FakeLister::new(vec![]), engine(), clock());
    let cache = ResourceDataCache::new();
    let err = plugin.eval(&cache, &eval_request()).unwrap_err();
    assert!(matches!(err, CoreError::NotConfigured(_)));
}

#[test]
fn failed_listing_leaves_nothing_to_evaluate() {
    let lister = FakeLister::new(vec![Err(CoreError::ResourceListing(
        "failed to get next page of VMs: 503".to_string(),
    ))]);
    let plugin = TagsPlugin::new(lister, engine(), clock());
    let ctx = plugin.configure(&configure_request(), Some("s3cret")).unwrap();
    let mut cache = ResourceDataCache::new();

    let err = plugin.prepare_for_eval(&ctx, &mut cache).unwrap_err();
    assert!(matches!(err, CoreError::ResourceListing(_)));
    assert!(!cache.is_loaded());
    assert!(plugin.eval(&cache, &eval_request()).is_err());
}

#[test]
fn failed_refresh_keeps_previous_snapshot() {
    let lister = FakeLister::new(vec![
        Ok(two_vms()),
        Err(CoreError::ResourceListing("throttled".to_string())),
    ]);
    let plugin = TagsPlugin::new(lister, engine(), clock());
    let ctx = plugin.configure(&configure_request(), Some("s3cret")).unwrap();
    let mut cache = ResourceDataCache::new();

    plugin.prepare_for_eval(&ctx, &mut cache).unwrap();
    assert!(plugin.prepare_for_eval(&ctx, &mut cache).is_err());
    assert_eq!(cache.resources().unwrap().len(), 2);
}

#[test]
fn full_flow_produces_observations_and_findings() {
    let lister = FakeLister::new(vec![Ok(two_vms())]);
    let plugin = TagsPlugin::new(&lister, engine(), clock());
    let ctx = plugin.configure(&configure_request(), Some("s3cret")).unwrap();
    let mut cache = ResourceDataCache::new();
    plugin.prepare_for_eval(&ctx, &mut cache).unwrap();

    let resp = plugin.eval(&cache, &eval_request()).unwrap();
    assert_eq!(resp.observations.len(), 2);
    assert_eq!(resp.findings.len(), 1);
    assert_eq!(resp.findings[0].title, "Missing owner tag");
    assert_eq!(resp.logs.len(), 1);

    let flagged = resp
        .observations
        .iter()
        .find(|o| o.title.contains("machineId: vm-bare"))
        .unwrap();
    assert_eq!(resp.findings[0].related_observations, vec![flagged.id.clone()]);
    assert_eq!(resp.findings_for(&flagged.id).count(), 1);
    assert_eq!(
        lister.seen_subscriptions.borrow().as_slice(),
        &["sub-1".to_string()]
    );
}

#[test]
fn bundle_path_and_domain_reach_the_engine() {
    let lister = FakeLister::new(vec![Ok(two_vms())]);
    let eng = engine();
    let plugin = TagsPlugin::new(lister, &eng, clock()).with_policy_domain("vm_tags");
    assert_eq!(plugin.policy_domain(), "vm_tags");
    let ctx = plugin.configure(&configure_request(), Some("s3cret")).unwrap();
    let mut cache = ResourceDataCache::new();
    plugin.prepare_for_eval(&ctx, &mut cache).unwrap();
    plugin.eval(&cache, &eval_request()).unwrap();

    let bundles = eng.bundles.borrow();
    assert_eq!(bundles.len(), 2);
    assert!(bundles.iter().all(|b| b == Path::new("/bundles/tags")));
    let domains = eng.domains.borrow();
    assert_eq!(domains.len(), 2);
    assert!(domains.iter().all(|d| d == "vm_tags"));
}

#[test]
fn configure_from_env_reads_client_secret() {
    let plugin = TagsPlugin::new(FakeLister::new(vec![]), engine(), clock());
    std::env::set_var("AZURE_CLIENT_SECRET", "from-env");
    let ctx = plugin.configure_from_env(&configure_request()).unwrap();
    std::env::remove_var("AZURE_CLIENT_SECRET");
    assert_eq!(ctx.credential.client_secret(), "from-env");
    assert_eq!(ctx.config.subscription_id, "sub-1");
}
