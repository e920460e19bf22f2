use crate::domain::entities::ClientRepresentation;
use crate::domain::errors::AuthError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};

/// Authentication token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub token_type: String,
}

impl AuthToken {
    pub fn new(
        access_token: String,
        expires_in: i64,
        refresh_token: Option<String>,
        token_type: Option<String>,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in),
            token_type: token_type.unwrap_or_else(|| "Bearer".to_string()),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    pub fn is_expiring_soon(&self, seconds: i64) -> bool {
        Utc::now() + chrono::Duration::seconds(seconds) >= self.expires_at
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// How the toolkit proves its identity to the token endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
pub enum AdminGrant {
    Password { username: String, password: String },
    ClientCredentials { secret: String },
}

/// Credentials of the administrator the toolkit acts as
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub realm: String,
    pub client_id: String,
    pub grant: AdminGrant,
}

impl AdminCredentials {
    pub fn new(username: String, password: String, realm: String, client_id: String) -> Self {
        Self {
            realm,
            client_id,
            grant: AdminGrant::Password { username, password },
        }
    }

    pub fn service_account(client_id: String, client_secret: String, realm: String) -> Self {
        Self {
            realm,
            client_id,
            grant: AdminGrant::ClientCredentials {
                secret: client_secret,
            },
        }
    }

    /// Form fields of the token request
    pub fn token_form(&self) -> Vec<(&'static str, &str)> {
        let mut form = vec![("client_id", self.client_id.as_str())];
        match &self.grant {
            AdminGrant::Password { username, password } => form.extend([
                ("grant_type", "password"),
                ("username", username.as_str()),
                ("password", password.as_str()),
            ]),
            AdminGrant::ClientCredentials { secret } => form.extend([
                ("grant_type", "client_credentials"),
                ("client_secret", secret.as_str()),
            ]),
        }
        form
    }
}

/// Token management port
#[async_trait]
pub trait TokenManager: Send + Sync {
    /// Acquire a new token using credentials
    async fn acquire_token(&self, credentials: &AdminCredentials) -> Result<AuthToken, AuthError>;
}

/// Claims read from a bearer token before it is handed to Keycloak for verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    /// Client the token was issued for
    #[serde(default)]
    pub azp: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl AccessTokenClaims {
    /// Read the claims of a token without checking its signature or expiry.
    /// Only used to route the token; the identity server decides whether it is valid.
    pub fn peek(token: &str) -> Result<Self, AuthError> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data: TokenData<Self> = decode(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| AuthError::VerificationFailed {
                reason: format!("Cannot parse token: {e}"),
            })?;

        Ok(data.claims)
    }

    /// Realm name, i.e. the last path segment of the issuer URL
    pub fn realm(&self) -> &str {
        let issuer = self.iss.trim_end_matches('/');
        issuer.rsplit('/').next().unwrap_or(issuer)
    }
}

/// Token part of an `Authorization: Bearer <token>` header value
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// User behind a token accepted by Keycloak
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedUser {
    pub id: String,
    pub username: String,
}

/// Delegates token validation to the identity server
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// `Ok(None)` when the server rejects the token
    async fn verify(&self, realm: &str, token: &str) -> Result<Option<VerifiedUser>, AuthError>;
}

/// Read-only view of realms and their clients
#[async_trait]
pub trait RealmDirectory: Send + Sync {
    async fn realm_exists(&self, realm: &str) -> Result<bool, AuthError>;

    async fn find_client(
        &self,
        realm: &str,
        client_id: &str,
    ) -> Result<Option<ClientRepresentation>, AuthError>;
}

/// Authenticated realm administrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAuth {
    pub realm: String,
    pub user: VerifiedUser,
    pub client_id: String,
    pub token: String,
}

impl AdminAuth {
    /// Administrators of `admin_realm` may act on every realm, others only on their own.
    pub fn authorize_realm(&self, target_realm: &str, admin_realm: &str) -> Result<(), AuthError> {
        if self.realm == admin_realm || self.realm == target_realm {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                realm: target_realm.to_string(),
            })
        }
    }
}
