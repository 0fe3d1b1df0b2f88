use crate::policy::types::{PolicyResult, Violation};

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Compliant,
    NonCompliant(Vec<Violation>),
}

impl Classification {
    pub fn is_compliant(&self) -> bool {
        matches!(self, Classification::Compliant)
    }
}

/// The violation list alone decides the verdict.
pub fn classify(result: &PolicyResult) -> Classification {
    if result.violations.is_empty() {
        Classification::Compliant
    } else {
        Classification::NonCompliant(result.violations.clone())
    }
}
