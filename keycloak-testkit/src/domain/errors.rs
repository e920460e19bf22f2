use thiserror::Error;

/// Domain-specific errors for the test toolkit
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User not found: {username} in realm {realm}")]
    UserNotFound { username: String, realm: String },

    #[error("Client not found: {client_id} in realm {realm}")]
    ClientNotFound { client_id: String, realm: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Access forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Timed out after {millis}ms waiting for {what}")]
    Timeout { what: String, millis: u128 },
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Authentication-specific errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token acquisition failed: {reason}")]
    TokenAcquisitionFailed { reason: String },

    /// The request carries no usable bearer token; `reason` is the challenge text.
    #[error("Not authorized: {reason}")]
    NotAuthorized { reason: String },

    #[error("Could not find client {client_id} for authorization")]
    ClientNotFound { client_id: String },

    #[error("Access to realm {realm} is forbidden")]
    Forbidden { realm: String },

    #[error("Token verification failed: {reason}")]
    VerificationFailed { reason: String },
}

impl AuthError {
    pub fn not_authorized(reason: impl Into<String>) -> Self {
        AuthError::NotAuthorized {
            reason: reason.into(),
        }
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => DomainError::AuthenticationFailed {
                reason: "Invalid credentials".to_string(),
            },
            AuthError::TokenAcquisitionFailed { reason } => {
                DomainError::AuthenticationFailed { reason }
            }
            AuthError::NotAuthorized { reason } => DomainError::AuthenticationFailed { reason },
            AuthError::VerificationFailed { reason } => {
                DomainError::AuthenticationFailed { reason }
            }
            AuthError::ClientNotFound { client_id } => DomainError::ClientNotFound {
                client_id,
                realm: "unknown".to_string(),
            },
            AuthError::Forbidden { realm } => DomainError::Forbidden {
                reason: format!("realm {realm}"),
            },
        }
    }
}

/// Errors raised by the Keycloak admin REST API
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Keycloak returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Request to Keycloak failed: {message}")]
    Transport { message: String },

    #[error("Unexpected response from Keycloak: {message}")]
    InvalidResponse { message: String },

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl AdminError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdminError::NotFound { .. })
            || matches!(self, AdminError::Http { status: 404, .. })
    }

    /// The credentials used for the call may not see the resource.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, AdminError::Http { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(err: reqwest::Error) -> Self {
        AdminError::Transport {
            message: err.to_string(),
        }
    }
}

impl From<AdminError> for DomainError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Auth(auth) => auth.into(),
            AdminError::InvalidResponse { message } => DomainError::Serialization { message },
            other => DomainError::ExternalService {
                service: "Keycloak".to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}")]
    MissingRequired { key: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl From<ConfigError> for DomainError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingRequired { key } => DomainError::Configuration {
                message: format!("Missing required configuration: {key}"),
            },
            ConfigError::InvalidValue { key, message } => DomainError::Configuration {
                message: format!("Invalid value for {key}: {message}"),
            },
        }
    }
}

/// Outcome of a wait that ended abruptly. A plain timeout is not an error.
#[derive(Error, Debug)]
pub enum WaitError<E> {
    #[error("condition evaluation failed: {0}")]
    Condition(#[source] E),

    #[error("wait was interrupted")]
    Interrupted,
}

/// Container lifecycle errors
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("Could not start Keycloak container: {message}")]
    Start { message: String },

    #[error("Keycloak was not ready after {millis}ms")]
    NotReady { millis: u128 },

    #[error("Cannot install provider {path}: {message}")]
    Provider { path: String, message: String },
}

impl From<ContainerError> for DomainError {
    fn from(err: ContainerError) -> Self {
        match err {
            ContainerError::NotReady { millis } => DomainError::Timeout {
                what: "Keycloak container".to_string(),
                millis,
            },
            ContainerError::Start { message } => DomainError::ExternalService {
                service: "docker".to_string(),
                message,
            },
            provider @ ContainerError::Provider { .. } => DomainError::Configuration {
                message: provider.to_string(),
            },
        }
    }
}

/// HTTP test server errors
#[derive(Error, Debug)]
pub enum HttpServerError {
    #[error("Could not bind test HTTP server on {addr}: {message}")]
    Bind { addr: String, message: String },

    #[error("Invalid request body: {message}")]
    Body { message: String },
}

/// WebDriver protocol errors
#[derive(Error, Debug)]
pub enum WebDriverError {
    #[error("WebDriver session could not be created: {message}")]
    Session { message: String },

    #[error("WebDriver command {command} failed: {message}")]
    Command { command: String, message: String },
}

impl From<WebDriverError> for DomainError {
    fn from(err: WebDriverError) -> Self {
        DomainError::ExternalService {
            service: "webdriver".to_string(),
            message: err.to_string(),
        }
    }
}
