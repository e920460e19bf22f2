use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Client as listed by the Keycloak admin API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRepresentation {
    /// Internal id (UUID), used in admin URLs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Public client identifier, as found in the `azp` claim of tokens
    #[serde(default)]
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_client: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
