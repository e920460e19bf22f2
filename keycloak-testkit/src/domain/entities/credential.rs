use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const PASSWORD: &str = "password";

/// Label shown for credentials the user never named.
pub const UNNAMED_CREDENTIAL_LABEL: &str = "sans.nom";

/// Credential as exchanged with the Keycloak admin API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CredentialRepresentation {
    pub fn password(value: impl Into<String>) -> Self {
        Self {
            type_: Some(PASSWORD.to_string()),
            value: Some(value.into()),
            temporary: Some(false),
            ..Self::default()
        }
    }

    pub fn is_of_type(&self, credential_type: &str) -> bool {
        self.type_.as_deref() == Some(credential_type)
    }
}

/// Credential summary offered to authenticator forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultCredential {
    pub id: String,
    pub user_label: String,
}

impl DefaultCredential {
    pub fn new(id: impl Into<String>, user_label: Option<&str>) -> Self {
        let user_label = match user_label {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => UNNAMED_CREDENTIAL_LABEL.to_string(),
        };
        Self {
            id: id.into(),
            user_label,
        }
    }
}

impl From<&CredentialRepresentation> for DefaultCredential {
    fn from(credential: &CredentialRepresentation) -> Self {
        Self::new(
            credential.id.clone().unwrap_or_default(),
            credential.user_label.as_deref(),
        )
    }
}

/// Model handed to authenticator templates: the user's credentials of one
/// type and the one currently selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorBean<T> {
    pub selected_credential_id: Option<String>,
    pub user_credentials: Vec<T>,
}

impl<T> AuthenticatorBean<T> {
    pub fn empty(selected_credential_id: Option<String>) -> Self {
        Self {
            selected_credential_id,
            user_credentials: Vec::new(),
        }
    }

    pub fn new(selected_credential_id: Option<String>, user_credentials: Vec<T>) -> Self {
        Self {
            selected_credential_id,
            user_credentials,
        }
    }
}
