use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use keycloak_extension_api::{build_router, AppState, Config};
use keycloak_testkit::{
    application::ports::{extract_bearer_token, AccessTokenClaims},
    infrastructure::adapters::{HttpTestServer, MockResponse, RecordedRequest},
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use tower::ServiceExt;
use uuid::Uuid;

const CREDENTIALS_PATH: &str = "/realms/test/api/users/u-1/authenticators/otp";

fn token(realm: &str, client_id: &str, subject: &str) -> String {
    let claims = json!({
        "iss": format!("http://keycloak.local/realms/{realm}"),
        "azp": client_id,
        "sub": subject,
        "preferred_username": subject,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap()
}

fn revoked_token() -> String {
    token("test", "admin-portal", "revoked")
}

/// Keycloak stand-in serving the admin and userinfo endpoints the API relies on
fn fake_keycloak(revoked: String) -> impl Fn(&RecordedRequest) -> MockResponse + Send + Sync {
    move |request: &RecordedRequest| {
        let path = request.path();
        if path.ends_with("/protocol/openid-connect/userinfo") {
            return if request.header("authorization") == Some(format!("Bearer {revoked}").as_str())
            {
                MockResponse::with_status(401)
            } else {
                MockResponse::ok().json(&json!({
                    "sub": "admin-id",
                    "preferred_username": "realm-admin",
                }))
            };
        }
        if path == "/realms/master/protocol/openid-connect/token" {
            return MockResponse::ok().json(&json!({
                "access_token": "admin-token",
                "expires_in": 300,
                "token_type": "Bearer",
            }));
        }
        if let Some(user_id) = path.strip_prefix("/admin/realms/test/users/") {
            if !user_id.contains('/') {
                return user_as_caller(request, user_id);
            }
        }
        if request.header("authorization") != Some("Bearer admin-token") {
            return MockResponse::with_status(401);
        }

        match (request.method(), path) {
            ("GET", "/admin/realms/test") => MockResponse::ok().json(&json!({
                "realm": "test",
                "loginTheme": "custom",
                "accountTheme": "missing",
            })),
            ("GET", "/admin/realms/other") => MockResponse::ok().json(&json!({ "realm": "other" })),
            ("GET", "/admin/realms/master") => {
                MockResponse::ok().json(&json!({ "realm": "master" }))
            }
            ("GET", "/admin/realms/test/clients") => MockResponse::ok().json(&json!([
                { "id": "c-1", "clientId": "admin-portal", "enabled": true },
                { "id": "c-2", "clientId": "account-console", "enabled": true }
            ])),
            ("GET", "/admin/realms/other/clients") => MockResponse::ok().json(&json!([
                { "id": "c-1", "clientId": "admin-portal", "enabled": true }
            ])),
            ("GET", "/admin/realms/master/clients") => MockResponse::ok().json(&json!([
                { "id": "c-0", "clientId": "admin-cli", "enabled": true }
            ])),
            ("GET", "/admin/realms/test/users/u-1/credentials") => MockResponse::ok().json(&json!([
                { "id": "otp-phone", "type": "otp", "userLabel": "phone", "priority": 20 },
                { "id": "otp-key", "type": "otp", "userLabel": "", "priority": 10 },
                { "id": "pw", "type": "password", "priority": 1 }
            ])),
            _ => MockResponse::with_status(404),
        }
    }
}

/// User lookup as Keycloak answers it for the bearer of the request: ordinary
/// users are refused, `viewer` may read but not manage.
fn user_as_caller(request: &RecordedRequest, user_id: &str) -> MockResponse {
    let caller = request
        .header("authorization")
        .and_then(extract_bearer_token)
        .and_then(|bearer| AccessTokenClaims::peek(bearer).ok())
        .and_then(|claims| claims.sub);

    match caller.as_deref() {
        None | Some("bob") => MockResponse::with_status(403),
        Some(_) if user_id != "u-1" => MockResponse::with_status(404),
        Some(subject) => MockResponse::ok().json(&json!({
            "id": "u-1",
            "username": "alice",
            "enabled": true,
            "access": { "view": true, "manage": subject != "viewer" },
        })),
    }
}

fn themes_dir() -> PathBuf {
    let root = std::env::temp_dir().join(format!("kc-api-themes-{}", Uuid::new_v4().simple()));
    let login = root.join("custom").join("login");
    std::fs::create_dir_all(&login).unwrap();
    std::fs::write(login.join("theme.properties"), "parent=keycloak\n").unwrap();
    root
}

struct TestApi {
    // Keeps the fake Keycloak alive for the test
    keycloak: HttpTestServer,
    router: Router,
}

async fn setup() -> TestApi {
    let keycloak = HttpTestServer::start("127.0.0.1:0", fake_keycloak(revoked_token()))
        .await
        .unwrap();

    let env: HashMap<&str, String> = HashMap::from([
        ("KEYCLOAK_URL", keycloak.base_url()),
        ("KEYCLOAK_ADMIN_PASSWORD", "admin".to_string()),
        ("THEMES_DIR", themes_dir().display().to_string()),
    ]);
    let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();

    TestApi {
        keycloak,
        router: build_router(AppState::new(config)),
    }
}

async fn get(api: &TestApi, uri: &str, bearer: Option<&str>) -> Response {
    let mut request = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = bearer {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    api.router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Health and authentication
// ============================================================================

#[tokio::test]
async fn test_health_needs_no_token() {
    let api = setup().await;

    let response = get(&api, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
    assert!(api.keycloak.requests().is_empty());
}

#[tokio::test]
async fn test_missing_token_is_challenged() {
    let api = setup().await;

    let response = get(&api, CREDENTIALS_PATH, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    assert_eq!(json_body(response).await["error"], "Bearer");
}

#[tokio::test]
async fn test_malformed_token() {
    let api = setup().await;

    let response = get(&api, CREDENTIALS_PATH, Some("not-a-jwt")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Bearer token format error");
}

#[tokio::test]
async fn test_token_from_unknown_realm() {
    let api = setup().await;

    let response = get(&api, CREDENTIALS_PATH, Some(&token("ghost", "admin-portal", "x"))).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Unknown realm in token");
}

#[tokio::test]
async fn test_revoked_token() {
    let api = setup().await;

    let response = get(&api, CREDENTIALS_PATH, Some(&revoked_token())).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "Bearer");
}

#[tokio::test]
async fn test_token_for_unknown_client() {
    let api = setup().await;

    let response = get(&api, CREDENTIALS_PATH, Some(&token("test", "rogue", "admin-id"))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Authenticator bean
// ============================================================================

#[tokio::test]
async fn test_bean_selects_default_credential() {
    let api = setup().await;

    let caller = token("test", "admin-portal", "admin-id");

    let response = get(&api, CREDENTIALS_PATH, Some(&caller)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["selectedCredentialId"], "otp-key");
    assert_eq!(
        body["userCredentials"],
        json!([
            { "id": "otp-phone", "userLabel": "phone" },
            { "id": "otp-key", "userLabel": "sans.nom" }
        ])
    );
}

#[tokio::test]
async fn test_bean_keeps_selected_credential() {
    let api = setup().await;
    let uri = format!("{CREDENTIALS_PATH}?selected=otp-phone");

    let response = get(&api, &uri, Some(&token("test", "admin-portal", "admin-id"))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["selectedCredentialId"], "otp-phone");
}

#[tokio::test]
async fn test_admin_of_other_realm_is_forbidden() {
    let api = setup().await;

    let caller = token("other", "admin-portal", "admin-id");

    let response = get(&api, CREDENTIALS_PATH, Some(&caller)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_ordinary_user_cannot_read_credentials() {
    let api = setup().await;

    let caller = token("test", "account-console", "bob");

    let response = get(&api, CREDENTIALS_PATH, Some(&caller)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let credential_reads = api
        .keycloak
        .requests()
        .iter()
        .filter(|r| r.path().ends_with("/credentials"))
        .count();
    assert_eq!(credential_reads, 0);
}

#[tokio::test]
async fn test_user_viewer_without_manage_is_forbidden() {
    let api = setup().await;

    let caller = token("test", "admin-portal", "viewer");

    let response = get(&api, CREDENTIALS_PATH, Some(&caller)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_lookup_carries_callers_token() {
    let api = setup().await;
    let caller = token("test", "admin-portal", "admin-id");

    let response = get(&api, CREDENTIALS_PATH, Some(&caller)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let requests = api.keycloak.requests();
    let lookup = requests
        .iter()
        .find(|r| r.path() == "/admin/realms/test/users/u-1")
        .unwrap();
    assert_eq!(lookup.header("authorization"), Some(format!("Bearer {caller}").as_str()));
}

#[tokio::test]
async fn test_unknown_path_realm() {
    let api = setup().await;

    let response = get(
        &api,
        "/realms/nowhere/api/users/u-1/authenticators/otp",
        Some(&token("test", "admin-portal", "admin-id")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "notFound.realm");
}

#[tokio::test]
async fn test_unknown_user() {
    let api = setup().await;

    let response = get(
        &api,
        "/realms/test/api/users/ghost/authenticators/otp",
        Some(&token("test", "admin-portal", "admin-id")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "notFound.user");
}

// ============================================================================
// Themes
// ============================================================================

#[tokio::test]
async fn test_realm_login_theme() {
    let api = setup().await;

    let response = get(
        &api,
        "/realms/test/api/themes/login",
        Some(&token("test", "admin-portal", "admin-id")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "name": "custom", "themeType": "login" })
    );
}

#[tokio::test]
async fn test_theme_without_provider() {
    let api = setup().await;

    let response = get(
        &api,
        "/realms/test/api/themes/account",
        Some(&token("test", "admin-portal", "admin-id")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "notFound.theme");
}

#[tokio::test]
async fn test_invalid_theme_type() {
    let api = setup().await;

    let response = get(
        &api,
        "/realms/test/api/themes/dark",
        Some(&token("test", "admin-portal", "admin-id")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_master_admin_reaches_every_realm() {
    let api = setup().await;

    let response = get(
        &api,
        "/realms/test/api/themes/login",
        Some(&token("master", "admin-cli", "admin-id")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn test_preflight_skips_authentication() {
    let api = setup().await;

    let response = api
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri(CREDENTIALS_PATH)
                .header(header::ORIGIN, "http://admin.local")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(api.keycloak.requests().is_empty());
}
