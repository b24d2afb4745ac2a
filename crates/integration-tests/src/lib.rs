//! Integration tests for Fitment Forge.
//!
//! The storefront router is driven in-process with
//! `tower::ServiceExt::oneshot`, over in-memory stores and a
//! `tower_sessions::MemoryStore`. No database or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fitment-forge-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `browse` - Featured products and top-level categories
//! - `cart` - Cart reconciliation over HTTP (guest, sign-in, sync failure)
//! - `vehicle` - Fitment selector round trips
//! - `auth` - Sign-up, sign-in, admin sign-in, sign-out
//! - `account` - Profile and address book
//! - `roles` - Service-key role assignment

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use fitment_forge_storefront::config::StorefrontConfig;
use fitment_forge_storefront::db::Stores;
use fitment_forge_storefront::db::memory::{
    MemoryAddressStore, MemoryCartStore, MemoryCatalogStore, MemoryProfileStore, MemoryRoleStore,
    MemoryUserStore,
};
use fitment_forge_storefront::middleware::{
    session::SESSION_COOKIE_NAME, session_key, session_layer,
};
use fitment_forge_storefront::services::fitment::FitmentCatalog;
use fitment_forge_storefront::state::AppState;

/// Service role key accepted by the test app.
pub const SERVICE_KEY: &str = "srk_9fK2mQ7xLp4RtZ8vB1nC6yD3";

/// Origin allowed to call the role endpoint in the test app.
pub const ALLOWED_ORIGIN: &str = "https://backoffice.fitmentforge.test";

/// Year the test catalog treats as current.
pub const CURRENT_YEAR: u16 = 2025;

/// Configuration for an in-process app. Nothing here is dialed.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/fitment_forge_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from(
            "Zq8v2LmX4tR7bN1kW9pC3sH6yD5fJ0gAuE7rK2wQ9nB4mT6xV1cZ8jH3sL5dF0pY",
        ),
        service_role_key: SecretString::from(SERVICE_KEY),
        allowed_origin: Some(ALLOWED_ORIGIN.to_string()),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Parsed response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Titles of the notices in the body, in order.
    #[must_use]
    pub fn notice_titles(&self) -> Vec<String> {
        self.body["notices"]
            .as_array()
            .map(|notices| {
                notices
                    .iter()
                    .filter_map(|n| n["title"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One visitor's browser: the app plus a cookie jar holding the session.
pub struct TestApp {
    router: Router,
    /// The cart store, kept concrete so tests can inject failures.
    pub carts: Arc<MemoryCartStore>,
    pub catalog: Arc<MemoryCatalogStore>,
    pub stores: Stores,
    cookie: Option<String>,
    client_ip: String,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// A fresh app with empty stores.
    #[must_use]
    pub fn new() -> Self {
        let carts = Arc::new(MemoryCartStore::default());
        let catalog = Arc::new(MemoryCatalogStore::default());
        let stores = Stores {
            carts: carts.clone(),
            users: Arc::new(MemoryUserStore::default()),
            profiles: Arc::new(MemoryProfileStore::default()),
            roles: Arc::new(MemoryRoleStore::default()),
            addresses: Arc::new(MemoryAddressStore::default()),
            catalog: catalog.clone(),
        };
        let config = test_config();
        let key = session_key(&config).expect("test secret is a valid key");
        let state = AppState::new(
            config,
            stores.clone(),
            FitmentCatalog::with_current_year(CURRENT_YEAR),
        );
        let router = fitment_forge_storefront::app(
            state,
            session_layer(MemoryStore::default(), false, key),
        );

        Self {
            router,
            carts,
            catalog,
            stores,
            cookie: None,
            client_ip: "203.0.113.10".to_string(),
        }
    }

    /// Send later requests from another client address (rate limit key).
    pub fn set_client_ip(&mut self, ip: &str) {
        self.client_ip = ip.to_string();
    }

    /// Forget the session cookie, as a new browser would.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    /// The `name=value` pair of the session cookie, if one was set.
    #[must_use]
    pub fn session_cookie(&self) -> Option<&str> {
        self.cookie.as_deref()
    }

    /// Replace the session cookie sent with later requests.
    pub fn set_session_cookie(&mut self, pair: impl Into<String>) {
        self.cookie = Some(pair.into());
    }

    /// Send a request, keeping any session cookie the app sets.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is not JSON.
    pub async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            if let Some(pair) = value.split(';').next()
                && pair.starts_with(SESSION_COOKIE_NAME)
            {
                self.cookie = Some(pair.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Build a request carrying the cookie jar and client address.
    ///
    /// # Panics
    ///
    /// Panics if the URI or a header value is invalid.
    #[must_use]
    pub fn request(&self, method: Method, uri: &str, body: Option<&Value>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", &self.client_ip);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        builder.body(body).expect("valid request")
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request(Method::GET, uri, None);
        self.send(request).await
    }

    pub async fn post(&mut self, uri: &str, body: &Value) -> TestResponse {
        let request = self.request(Method::POST, uri, Some(body));
        self.send(request).await
    }

    pub async fn put(&mut self, uri: &str, body: &Value) -> TestResponse {
        let request = self.request(Method::PUT, uri, Some(body));
        self.send(request).await
    }

    pub async fn patch(&mut self, uri: &str, body: &Value) -> TestResponse {
        let request = self.request(Method::PATCH, uri, Some(body));
        self.send(request).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        let request = self.request(Method::DELETE, uri, None);
        self.send(request).await
    }

    /// Register and sign in; returns the user ID.
    ///
    /// # Panics
    ///
    /// Panics if either step fails.
    pub async fn sign_up_and_in(&mut self, email: &str, password: &str) -> String {
        let signup = self
            .post(
                "/api/auth/signup",
                &serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(signup.status, StatusCode::OK, "signup: {:?}", signup.body);

        let signin = self
            .post(
                "/api/auth/signin",
                &serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(signin.status, StatusCode::OK, "signin: {:?}", signin.body);

        signin.body["user"]["id"]
            .as_str()
            .expect("user id in sign-in body")
            .to_string()
    }

    /// Call the role endpoint with the service key.
    pub async fn assign_role(&mut self, body: &Value, key: Option<&str>) -> TestResponse {
        let mut request = self.request(Method::POST, "/api/admin/roles", Some(body));
        if let Some(key) = key {
            let value = HeaderValue::from_str(&format!("Bearer {key}")).expect("valid header");
            request.headers_mut().insert(header::AUTHORIZATION, value);
        }
        self.send(request).await
    }
}
