#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response, request::Builder},
};
use tollgate::{
    ServerConfig,
    api::RefreshCheck,
    create_app,
    db::{Database, User, UserRole},
    jwt::{Claims, TokenConfig, TokenProvider, TokenType},
};

pub const TEST_SECRET: &[u8] = b"integration-test-secret-0123456789abcdef";

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    pub tokens: TokenProvider,
}

/// Builder for test apps with non-default options.
pub struct TestSetup {
    refresh_check: RefreshCheck,
    refresh_rate_per_minute: u32,
    token_config: TokenConfig,
}

impl TestSetup {
    pub fn new() -> Self {
        Self {
            refresh_check: RefreshCheck::Signature,
            refresh_rate_per_minute: 1000,
            token_config: TokenConfig::default(),
        }
    }

    pub fn with_registry_check(mut self) -> Self {
        self.refresh_check = RefreshCheck::Registry;
        self
    }

    pub fn with_refresh_rate(mut self, per_minute: u32) -> Self {
        self.refresh_rate_per_minute = per_minute;
        self
    }

    pub async fn build(self) -> TestApp {
        let db = Database::open(":memory:")
            .await
            .expect("Failed to open test database");
        let config = ServerConfig {
            db: db.clone(),
            jwt_secret: TEST_SECRET.to_vec(),
            token_config: self.token_config,
            refresh_check: self.refresh_check,
            trust_forwarded_for: false,
            refresh_rate_per_minute: self.refresh_rate_per_minute,
        };
        let app = create_app(&config).expect("Failed to create app");
        let tokens =
            TokenProvider::with_config(TEST_SECRET, self.token_config).expect("Invalid config");

        TestApp { app, db, tokens }
    }
}

pub async fn setup() -> TestApp {
    TestSetup::new().build().await
}

/// Create a user record.
pub async fn create_user(db: &Database, email: &str, name: &str, role: UserRole) -> User {
    db.users().create(email, name, role).await.unwrap();
    db.users().get_by_email(email).await.unwrap().unwrap()
}

/// Request builder carrying a peer address, as `axum::serve` would attach.
pub fn request_from(ip: &str) -> Builder {
    let addr: SocketAddr = format!("{}:40000", ip).parse().unwrap();
    Request::builder().extension(ConnectInfo(addr))
}

pub fn request() -> Builder {
    request_from("127.0.0.1")
}

/// Sign arbitrary claims with the test secret.
pub fn sign(claims: &Claims) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_SECRET),
    )
    .unwrap()
}

pub fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// An access token for `email` that expired a minute ago.
pub fn expired_access_token(email: &str) -> String {
    let now = now();
    sign(&Claims {
        token_type: TokenType::Access,
        email: email.to_string(),
        role: UserRole::User,
        nickname: "Expired".to_string(),
        iat: now - 3660,
        exp: now - 60,
    })
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Extract Set-Cookie headers from response
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

pub fn refresh_cookie_header(token: &str) -> String {
    format!("Refresh-token={}", tollgate::auth::encode_cookie_value(token))
}
