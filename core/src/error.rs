use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("resource listing failed: {0}")]
    ResourceListing(String),

    #[error("policy engine failed: {0}")]
    PolicyEngine(String),

    #[error("evaluation of resource {resource_id} failed")]
    Evaluation {
        resource_id: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("determinism violation: {0}")]
    DeterminismViolation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// This error followed by each of its sources, joined with `: `.
    pub fn chain(&self) -> String {
        let mut msg = self.to_string();
        let mut cur = std::error::Error::source(self);
        while let Some(inner) = cur {
            msg.push_str(": ");
            msg.push_str(&inner.to_string());
            cur = inner.source();
        }
        msg
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
