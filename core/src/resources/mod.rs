pub mod cache;
pub mod lister;
pub mod vm_tags;

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Attribute key -> value for one resource (VM tags).
pub type AttributeSet = Map<String, Value>;

/// Resource id -> attribute set, as returned by one listing pass.
pub type ResourceAttributeSet = BTreeMap<String, AttributeSet>;
