use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Kinds of themes a realm can configure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeType {
    Account,
    Admin,
    Email,
    Login,
    Common,
    Welcome,
}

impl ThemeType {
    /// Directory name used by the themes folder layout
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeType::Account => "account",
            ThemeType::Admin => "admin",
            ThemeType::Email => "email",
            ThemeType::Login => "login",
            ThemeType::Common => "common",
            ThemeType::Welcome => "welcome",
        }
    }
}

impl fmt::Display for ThemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "account" => Ok(ThemeType::Account),
            "admin" => Ok(ThemeType::Admin),
            "email" => Ok(ThemeType::Email),
            "login" => Ok(ThemeType::Login),
            "common" => Ok(ThemeType::Common),
            "welcome" => Ok(ThemeType::Welcome),
            _ => Err(format!("Invalid theme type: {s}")),
        }
    }
}

/// A theme resolved from a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub name: String,
    pub theme_type: ThemeType,
}

/// Theme names configured on a realm
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealmThemes {
    pub account: Option<String>,
    pub admin: Option<String>,
    pub email: Option<String>,
    pub login: Option<String>,
}

impl RealmThemes {
    pub fn from_realm(realm: &Value) -> Self {
        let name = |key: &str| realm.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            account: name("accountTheme"),
            admin: name("adminTheme"),
            email: name("emailTheme"),
            login: name("loginTheme"),
        }
    }

    /// Configured name for `theme_type`; common and welcome themes are never realm specific.
    pub fn name_for(&self, theme_type: ThemeType) -> Option<&str> {
        match theme_type {
            ThemeType::Account => self.account.as_deref(),
            ThemeType::Admin => self.admin.as_deref(),
            ThemeType::Email => self.email.as_deref(),
            ThemeType::Login => self.login.as_deref(),
            ThemeType::Common | ThemeType::Welcome => None,
        }
    }
}
