use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::credential::CredentialRepresentation;

/// User as exchanged with the Keycloak admin API.
///
/// Fields the toolkit does not model are kept in `extra` so that a
/// fetch/modify/update round trip does not drop them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<CredentialRepresentation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<HashMap<String, Vec<String>>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRepresentation {
    /// Enabled user with `username@test.com` as email and a single password credential.
    pub fn for_test(username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            email: Some(format!("{username}@test.com")),
            username,
            enabled: true,
            credentials: Some(vec![CredentialRepresentation::password(password)]),
            attributes: Some(HashMap::new()),
            ..Self::default()
        }
    }

    /// Values of an attribute, empty when the attribute is absent.
    pub fn attribute(&self, name: &str) -> &[String] {
        self.attributes
            .as_ref()
            .and_then(|attributes| attributes.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name).first().map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.attributes
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), values);
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Vec<String>> {
        self.attributes.as_mut()?.remove(name)
    }

    /// Whether the caller that fetched this user holds `manage` on it, per
    /// the `access` map Keycloak computes for that caller.
    pub fn can_manage(&self) -> bool {
        self.extra
            .get("access")
            .and_then(|access| access.get("manage"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_defaults() {
        let user = UserRepresentation::for_test("alice", "secret");
        assert_eq!(user.email.as_deref(), Some("alice@test.com"));
        assert!(user.enabled);
        let credentials = user.credentials.unwrap();
        assert_eq!(credentials.len(), 1);
        assert_eq!(credentials[0].value.as_deref(), Some("secret"));
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let json = serde_json::json!({
            "id": "42",
            "username": "bob",
            "enabled": true,
            "requiredActions": ["VERIFY_EMAIL"],
        });
        let user: UserRepresentation = serde_json::from_value(json).unwrap();
        assert_eq!(user.extra["requiredActions"], serde_json::json!(["VERIFY_EMAIL"]));

        let back = serde_json::to_value(&user).unwrap();
        assert_eq!(back["requiredActions"], serde_json::json!(["VERIFY_EMAIL"]));
        assert_eq!(back["username"], "bob");
    }

    #[test]
    fn attribute_helpers() {
        let mut user = UserRepresentation::default();
        assert!(user.attribute("phone").is_empty());
        user.set_attribute("phone", vec!["+41".to_string()]);
        assert_eq!(user.first_attribute("phone"), Some("+41"));
        assert_eq!(user.remove_attribute("phone"), Some(vec!["+41".to_string()]));
        assert!(user.attribute("phone").is_empty());
    }

    #[test]
    fn manage_access_comes_from_access_map() {
        let manager: UserRepresentation = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "access": { "view": true, "manage": true },
        }))
        .unwrap();
        let viewer: UserRepresentation = serde_json::from_value(serde_json::json!({
            "username": "alice",
            "access": { "view": true, "manage": false },
        }))
        .unwrap();

        assert!(manager.can_manage());
        assert!(!viewer.can_manage());
        assert!(!UserRepresentation::for_test("alice", "secret").can_manage());
    }
}
