use crate::determinism::clock::Clock;
use crate::error::CoreResult;
use crate::eval::aggregator;
use crate::evidence::model::EvaluationResponse;
use crate::policy::engine::{PolicyEngine, DEFAULT_POLICY_DOMAIN};
use crate::resources::cache::ResourceDataCache;
use crate::resources::lister::ResourceLister;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::config::{client_secret_from_env, configure, ConfigureRequest, PluginContext};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalRequest {
    pub bundle_path: PathBuf,
}

/// Configure / PrepareForEval / Eval entry points.
///
/// The plugin only holds its collaborators. Credentials live in the
/// `PluginContext` returned by `configure`, and resource data in a
/// `ResourceDataCache` owned by the caller.
pub struct TagsPlugin<L, E, C> {
    lister: L,
    engine: E,
    clock: C,
    policy_domain: String,
}

impl<L, E, C> TagsPlugin<L, E, C>
where
    L: ResourceLister,
    E: PolicyEngine,
    C: Clock,
{
    pub fn new(lister: L, engine: E, clock: C) -> Self {
        Self {
            lister,
            engine,
            clock,
            policy_domain: DEFAULT_POLICY_DOMAIN.to_string(),
        }
    }

    pub fn with_policy_domain(mut self, domain: impl Into<String>) -> Self {
        self.policy_domain = domain.into();
        self
    }

    pub fn policy_domain(&self) -> &str {
        &self.policy_domain
    }

    pub fn configure(
        &self,
        req: &ConfigureRequest,
        client_secret: Option<&str>,
    ) -> CoreResult<PluginContext> {
        configure(req, client_secret)
    }

    /// Configure with the secret taken from `AZURE_CLIENT_SECRET`.
    pub fn configure_from_env(&self, req: &ConfigureRequest) -> CoreResult<PluginContext> {
        configure(req, client_secret_from_env().as_deref())
    }

    pub fn prepare_for_eval(
        &self,
        ctx: &PluginContext,
        cache: &mut ResourceDataCache,
    ) -> CoreResult<()> {
        cache.refresh(&self.lister, ctx)
    }

    pub fn eval(
        &self,
        cache: &ResourceDataCache,
        req: &EvalRequest,
    ) -> CoreResult<EvaluationResponse> {
        let resources = cache.resources()?;
        tracing::debug!(
            bundle_path = %req.bundle_path.display(),
            domain = %self.policy_domain,
            resources = resources.len(),
            "starting evaluation"
        );
        aggregator::run(
            resources,
            &self.policy_domain,
            |domain, attributes| self.engine.execute(&req.bundle_path, domain, attributes),
            &self.clock,
        )
    }
}
