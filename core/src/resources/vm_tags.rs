use crate::error::{CoreError, CoreResult};
use crate::plugin::config::ClientSecretCredential;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};

use super::lister::ResourceLister;
use super::{AttributeSet, ResourceAttributeSet};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VirtualMachine {
    pub id: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, Option<String>>,
}

/// One page at a time of the subscription's virtual machines. `Ok(None)`
/// ends the listing.
pub trait VmPager {
    fn next_page(&mut self) -> CoreResult<Option<Vec<VirtualMachine>>>;
}

pub fn collect_vm_tags<P: VmPager>(pager: &mut P) -> CoreResult<ResourceAttributeSet> {
    let mut out = ResourceAttributeSet::new();
    let mut page_no: usize = 0;
    loop {
        let page = pager.next_page().map_err(|e| {
            CoreError::ResourceListing(format!("failed to get next page of VMs: {}", e))
        })?;
        let Some(vms) = page else { break };
        page_no += 1;
        tracing::debug!(page = page_no, vms = vms.len(), "listed VM page");
        for vm in vms {
            let Some(id) = vm.id else {
                tracing::warn!(page = page_no, "skipping VM without an id");
                continue;
            };
            out.insert(id, tag_attributes(vm.tags));
        }
    }
    Ok(out)
}

fn tag_attributes(tags: BTreeMap<String, Option<String>>) -> AttributeSet {
    tags.into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, Value::String(v))))
        .collect()
}

/// Adapts a pager factory (normally a cloud SDK client) to `ResourceLister`.
pub struct PagedVmLister<F> {
    open_pager: F,
}

impl<F, P> PagedVmLister<F>
where
    F: Fn(&ClientSecretCredential, &str) -> CoreResult<P>,
    P: VmPager,
{
    pub fn new(open_pager: F) -> Self {
        Self { open_pager }
    }
}

impl<F, P> ResourceLister for PagedVmLister<F>
where
    F: Fn(&ClientSecretCredential, &str) -> CoreResult<P>,
    P: VmPager,
{
    fn list_resource_tags(
        &self,
        credential: &ClientSecretCredential,
        subscription_id: &str,
    ) -> CoreResult<ResourceAttributeSet> {
        let mut pager = (self.open_pager)(credential, subscription_id).map_err(|e| {
            CoreError::ResourceListing(format!(
                "failed to instantiate virtual machine client: {}",
                e
            ))
        })?;
        collect_vm_tags(&mut pager)
    }
}

/// Serves pre-built pages; handy for replaying a captured listing.
#[derive(Debug, Clone, Default)]
pub struct StaticPager {
    pages: VecDeque<Vec<VirtualMachine>>,
}

impl StaticPager {
    pub fn new(pages: Vec<Vec<VirtualMachine>>) -> Self {
        Self {
            pages: pages.into(),
        }
    }
}

impl VmPager for StaticPager {
    fn next_page(&mut self) -> CoreResult<Option<Vec<VirtualMachine>>> {
        Ok(self.pages.pop_front())
    }
}
