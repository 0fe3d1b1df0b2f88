use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const CLIENT_SECRET_ENV: &str = "AZURE_CLIENT_SECRET";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigureRequest {
    pub config: BTreeMap<String, String>,
}

impl ConfigureRequest {
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.config.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AzureCliConfig {
    #[serde(default, alias = "subscriptionid", rename = "SubscriptionId")]
    pub subscription_id: String,
    #[serde(default, alias = "clientid", rename = "ClientId")]
    pub client_id: String,
    #[serde(default, alias = "tenantid", rename = "TenantId")]
    pub tenant_id: String,
}

impl AzureCliConfig {
    pub fn from_request(req: &ConfigureRequest) -> CoreResult<Self> {
        let v = serde_json::to_value(&req.config)?;
        let cfg: AzureCliConfig = serde_json::from_value(v)
            .map_err(|e| CoreError::Configuration(format!("malformed configure request: {}", e)))?;
        Ok(cfg)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecretCredential {
    pub tenant_id: String,
    pub client_id: String,
    client_secret: String,
}

impl ClientSecretCredential {
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Everything Configure produces. Passed explicitly to PrepareForEval.
#[derive(Debug, Clone)]
pub struct PluginContext {
    pub config: AzureCliConfig,
    pub credential: ClientSecretCredential,
}

pub fn client_secret_from_env() -> Option<String> {
    std::env::var(CLIENT_SECRET_ENV).ok()
}

pub fn configure(req: &ConfigureRequest, client_secret: Option<&str>) -> CoreResult<PluginContext> {
    let config = AzureCliConfig::from_request(req)?;
    let secret = client_secret.unwrap_or_default();

    let mut missing = Vec::new();
    for (name, value) in [
        ("SubscriptionId", config.subscription_id.as_str()),
        ("ClientId", config.client_id.as_str()),
        ("TenantId", config.tenant_id.as_str()),
        (CLIENT_SECRET_ENV, secret),
    ] {
        if value.trim().is_empty() {
            missing.push(name);
        }
    }
    if !missing.is_empty() {
        return Err(CoreError::Configuration(format!(
            "missing required settings: {}",
            missing.join(", ")
        )));
    }

    tracing::debug!(
        subscription_id = %config.subscription_id,
        tenant_id = %config.tenant_id,
        "plugin configured"
    );
    Ok(PluginContext {
        credential: ClientSecretCredential {
            tenant_id: config.tenant_id.clone(),
            client_id: config.client_id.clone(),
            client_secret: secret.to_string(),
        },
        config,
    })
}
