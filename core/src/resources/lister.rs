use crate::error::CoreResult;
use crate::plugin::config::ClientSecretCredential;

use super::ResourceAttributeSet;

/// External resource enumeration. Paging and retries are the lister's
/// concern; the core only sees the finished mapping.
pub trait ResourceLister {
    fn list_resource_tags(
        &self,
        credential: &ClientSecretCredential,
        subscription_id: &str,
    ) -> CoreResult<ResourceAttributeSet>;
}

impl<L: ResourceLister + ?Sized> ResourceLister for &L {
    fn list_resource_tags(
        &self,
        credential: &ClientSecretCredential,
        subscription_id: &str,
    ) -> CoreResult<ResourceAttributeSet> {
        (**self).list_resource_tags(credential, subscription_id)
    }
}
