use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::domain::errors::{DomainError, DomainResult};

/// Realm export, kept as raw JSON so any realm file can be imported as is.
#[derive(Debug, Clone, PartialEq)]
pub struct RealmDefinition {
    json: Value,
}

impl RealmDefinition {
    pub fn from_json(json: Value) -> DomainResult<Self> {
        if !json.is_object() {
            return Err(DomainError::Validation {
                field: "realm".to_string(),
                message: "Realm definition must be a JSON object".to_string(),
            });
        }
        Ok(Self { json })
    }

    pub fn parse(content: &str) -> DomainResult<Self> {
        let json = serde_json::from_str(content).map_err(|e| DomainError::Serialization {
            message: format!("Invalid realm definition: {e}"),
        })?;
        Self::from_json(json)
    }

    pub fn from_file(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| DomainError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content)
    }

    pub fn name(&self) -> Option<&str> {
        self.json.get("realm").and_then(Value::as_str)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        if let Some(object) = self.json.as_object_mut() {
            object.insert("realm".to_string(), Value::String(name.into()));
        }
        self
    }

    pub fn as_json(&self) -> &Value {
        &self.json
    }

    pub fn into_json(self) -> Value {
        self.json
    }
}

/// Event settings of a realm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmEventsConfig {
    #[serde(default)]
    pub events_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_events_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_events_details_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_listeners: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_event_types: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Required action provider known to the server but not yet registered in a realm
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredActionProvider {
    pub provider_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
