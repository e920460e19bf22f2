//! Stand up a fake SMS gateway and wait for the message a flow would send.
//!
//! Run with `cargo run --example sms_gateway_example`.

use keycloak_testkit::{
    application::ports::LoggingConfig,
    domain::codes::wrong_code,
    infrastructure::adapters::{HttpTestServer, MockResponse},
    init_tracing, ConditionMatcher,
};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(&LoggingConfig::default());

    println!("🚀 Keycloak Testkit SMS Gateway Example");
    println!("========================================\n");

    let gateway = HttpTestServer::start("127.0.0.1:0", |request| {
        if request.path() == "/sms" {
            MockResponse::ok().json(&serde_json::json!({ "status": "queued" }))
        } else {
            MockResponse::with_status(404)
        }
    })
    .await?;
    println!("📡 Gateway listening on {}", gateway.base_url());

    // Simulate the authenticator sending a code a little later
    let sender_url = format!("{}/sms?to=%2B33600000000", gateway.base_url());
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        let _ = reqwest::Client::new()
            .post(sender_url)
            .body("Your code is 123456")
            .send()
            .await;
    });

    let matcher = ConditionMatcher::is_true_within(Duration::from_secs(5));
    let delivered = matcher
        .matches_async(|| {
            let received = gateway.last_request().is_some();
            async move { received }
        })
        .await;
    println!("⏱️  {} -> {}", matcher, delivered);

    if let Some(sms) = gateway.last_request() {
        let code = sms.body().trim_start_matches("Your code is ");
        println!("📨 SMS to {:?}: code {}", sms.param("to"), code);
        println!("❌ A code guaranteed to be rejected: {}", wrong_code(code));
    }

    gateway.stop().await;
    println!("\n✅ Done");
    Ok(())
}
