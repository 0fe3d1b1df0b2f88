use crate::error::CoreResult;
use crate::policy::types::PolicyResult;
use crate::resources::AttributeSet;
use std::path::Path;

pub const DEFAULT_POLICY_DOMAIN: &str = "azure_tags";

/// External policy engine. One call evaluates every policy of `domain` in the
/// bundle at `bundle_path` against a single resource's attributes.
pub trait PolicyEngine {
    fn execute(
        &self,
        bundle_path: &Path,
        domain: &str,
        attributes: &AttributeSet,
    ) -> CoreResult<Vec<PolicyResult>>;
}

impl<E: PolicyEngine + ?Sized> PolicyEngine for &E {
    fn execute(
        &self,
        bundle_path: &Path,
        domain: &str,
        attributes: &AttributeSet,
    ) -> CoreResult<Vec<PolicyResult>> {
        (**self).execute(bundle_path, domain, attributes)
    }
}
