//! Calls the extension endpoints as a realm administrator.
//!
//! Expects a running server (`cargo run -p keycloak-extension-api`) and an
//! access token issued to an administrator of the realm, e.g.
//! `ACCESS_TOKEN=$(...) REALM=test USER_ID=... cargo run --example usage`.

use reqwest::Client;
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new();
    let api_url = env::var("API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let realm = env::var("REALM").unwrap_or_else(|_| "test".to_string());
    let token = env::var("ACCESS_TOKEN")?;

    // Health check
    let response = client.get(format!("{}/health", api_url)).send().await?;
    println!("Health check: {}", response.text().await?);

    if let Ok(user_id) = env::var("USER_ID") {
        let response = client
            .get(format!(
                "{}/realms/{}/api/users/{}/authenticators/otp",
                api_url, realm, user_id
            ))
            .bearer_auth(&token)
            .send()
            .await?;
        println!("OTP credentials ({}): {}", response.status(), response.text().await?);
    }

    let response = client
        .get(format!("{}/realms/{}/api/themes/login", api_url, realm))
        .bearer_auth(&token)
        .send()
        .await?;
    println!("Login theme ({}): {}", response.status(), response.text().await?);

    Ok(())
}
