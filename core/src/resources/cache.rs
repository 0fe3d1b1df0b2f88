use crate::error::{CoreError, CoreResult};
use crate::plugin::config::PluginContext;

use super::lister::ResourceLister;
use super::ResourceAttributeSet;

#[derive(Debug, Clone, Default)]
pub struct ResourceDataCache {
    data: Option<ResourceAttributeSet>,
}

impl ResourceDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cached mapping only after the listing fully succeeds.
    pub fn refresh<L: ResourceLister>(&mut self, lister: &L, ctx: &PluginContext) -> CoreResult<()> {
        let fresh = lister.list_resource_tags(&ctx.credential, &ctx.config.subscription_id)?;
        tracing::info!(resources = fresh.len(), "resource data refreshed");
        self.data = Some(fresh);
        Ok(())
    }

    pub fn resources(&self) -> CoreResult<&ResourceAttributeSet> {
        self.data.as_ref().ok_or_else(|| {
            CoreError::NotConfigured(
                "resource data has not been loaded; call PrepareForEval first".to_string(),
            )
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }
}
