use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::application::ports::BrowserConfig;
use crate::domain::errors::WebDriverError;

/// Browser a UI test runs in, selected with the `BROWSER` setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserKind {
    Chrome,
    ChromeHeadless,
    Firefox,
    FirefoxHeadless,
    #[default]
    HtmlUnit,
}

impl BrowserKind {
    /// Unknown or empty values fall back to HtmlUnit
    pub fn from_setting(value: &str) -> Self {
        match value.trim() {
            "chrome" => BrowserKind::Chrome,
            "chrome-headless" => BrowserKind::ChromeHeadless,
            "firefox" => BrowserKind::Firefox,
            "firefox-headless" => BrowserKind::FirefoxHeadless,
            _ => BrowserKind::HtmlUnit,
        }
    }

    pub fn is_headless(&self) -> bool {
        matches!(
            self,
            BrowserKind::ChromeHeadless | BrowserKind::FirefoxHeadless | BrowserKind::HtmlUnit
        )
    }

    /// W3C `alwaysMatch` capabilities for a new session
    pub fn capabilities(&self, ignore_patterns: &[String]) -> Value {
        match self {
            BrowserKind::Chrome | BrowserKind::ChromeHeadless => {
                let mut args = vec!["--remote-allow-origins=*"];
                if self.is_headless() {
                    args.push("--headless");
                }
                json!({ "browserName": "chrome", "goog:chromeOptions": { "args": args } })
            }
            BrowserKind::Firefox => json!({ "browserName": "firefox" }),
            BrowserKind::FirefoxHeadless => json!({
                "browserName": "firefox",
                "moz:firefoxOptions": { "args": ["-headless"] }
            }),
            BrowserKind::HtmlUnit => json!({
                "browserName": "htmlunit",
                "kctest:ignorePatterns": ignore_patterns,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewSession {
    session_id: String,
}

/// One browser session on a WebDriver endpoint
#[derive(Debug)]
pub struct WebDriverSession {
    client: reqwest::Client,
    session_url: String,
    id: String,
}

impl WebDriverSession {
    pub async fn create(
        client: reqwest::Client,
        endpoint: &str,
        capabilities: Value,
    ) -> Result<Self, WebDriverError> {
        let endpoint = endpoint.trim_end_matches('/');
        let body = json!({ "capabilities": { "alwaysMatch": capabilities } });
        let response = client
            .post(format!("{endpoint}/session"))
            .json(&body)
            .send()
            .await
            .map_err(|e| WebDriverError::Session {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(WebDriverError::Session {
                message: format!("HTTP {status}: {text}"),
            });
        }

        let created: WireResponse<NewSession> =
            response.json().await.map_err(|e| WebDriverError::Session {
                message: e.to_string(),
            })?;

        let id = created.value.session_id;
        Ok(Self {
            client,
            session_url: format!("{endpoint}/session/{id}"),
            id,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    async fn command<T: DeserializeOwned>(
        &self,
        name: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, WebDriverError> {
        let failed = |message: String| WebDriverError::Command {
            command: name.to_string(),
            message,
        };

        let response = request.send().await.map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(failed(format!("HTTP {status}: {text}")));
        }

        let wire: WireResponse<T> = response.json().await.map_err(|e| failed(e.to_string()))?;
        Ok(wire.value)
    }

    pub async fn navigate(&self, url: &str) -> Result<(), WebDriverError> {
        let request = self
            .client
            .post(format!("{}/url", self.session_url))
            .json(&json!({ "url": url }));
        let _: Value = self.command("navigate", request).await?;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String, WebDriverError> {
        let request = self.client.get(format!("{}/url", self.session_url));
        self.command("current_url", request).await
    }

    pub async fn title(&self) -> Result<String, WebDriverError> {
        let request = self.client.get(format!("{}/title", self.session_url));
        self.command("title", request).await
    }

    pub async fn delete(&self) -> Result<(), WebDriverError> {
        let request = self.client.delete(&self.session_url);
        let _: Value = self.command("delete", request).await?;
        Ok(())
    }
}

/// Hands out a single browser session, created on first use
pub struct WebDriverFactory {
    kind: BrowserKind,
    endpoint: String,
    ignore_patterns: Vec<String>,
    client: reqwest::Client,
    session: Mutex<Option<Arc<WebDriverSession>>>,
}

impl WebDriverFactory {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            kind: BrowserKind::from_setting(&config.browser),
            endpoint: config.webdriver_url.clone(),
            ignore_patterns: config.ignore_patterns.clone(),
            client: reqwest::Client::new(),
            session: Mutex::new(None),
        }
    }

    pub fn kind(&self) -> BrowserKind {
        self.kind
    }

    pub fn ignore_patterns(&self) -> &[String] {
        &self.ignore_patterns
    }

    /// Replace the resources HtmlUnit skips; only affects sessions created afterwards
    pub fn set_ignore_patterns(&mut self, patterns: impl IntoIterator<Item = String>) {
        self.ignore_patterns = patterns.into_iter().collect();
    }

    #[instrument(skip(self), fields(kind = ?self.kind))]
    pub async fn provide(&self) -> Result<Arc<WebDriverSession>, WebDriverError> {
        let mut session = self.session.lock().await;
        if let Some(existing) = session.as_ref() {
            return Ok(Arc::clone(existing));
        }

        let capabilities = self.kind.capabilities(&self.ignore_patterns);
        for (key, value) in capabilities.as_object().into_iter().flatten() {
            debug!("Driver option: {}={}", key, value);
        }

        let created = Arc::new(
            WebDriverSession::create(self.client.clone(), &self.endpoint, capabilities).await?,
        );
        info!("Created {:?} session {}", self.kind, created.id());
        *session = Some(Arc::clone(&created));
        Ok(created)
    }

    /// End the current session, if any
    pub async fn quit(&self) -> Result<(), WebDriverError> {
        let current = self.session.lock().await.take();
        match current {
            Some(session) => session.delete().await,
            None => Ok(()),
        }
    }
}
