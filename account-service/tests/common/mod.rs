use std::sync::Arc;
use std::time::Duration;

use account_service::domain::user::models::EmailAddress;
use account_service::domain::user::models::User;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::ports::UserServicePort;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::InMemoryUserRepository;
use auth::Authenticator;
use auth::TokenService;
use serde_json::json;
use serde_json::Value;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Serve the router over `user_service` on a random port and return its base URL
pub async fn serve(user_service: Arc<dyn UserServicePort>) -> String {
    // Use random port (0 = OS assigns)
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let authenticator = Arc::new(Authenticator::new(TEST_SECRET));
    let gate = Arc::new(authenticator.access_gate(Duration::from_secs(5)));

    let router = create_router(user_service, authenticator, gate);

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server error");
    });

    format!("http://127.0.0.1:{}", port)
}

/// Test application that spawns a real server over the in-memory store
pub struct TestApp {
    pub address: String,
    pub repository: Arc<InMemoryUserRepository>,
    pub api_client: reqwest::Client,
    pub tokens: TokenService,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let repository = Arc::new(InMemoryUserRepository::new());
        let user_service = Arc::new(UserService::new(Arc::clone(&repository)));

        let address = serve(user_service).await;

        Self {
            address,
            repository,
            api_client: reqwest::Client::new(),
            tokens: TokenService::new(TEST_SECRET),
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make PATCH request with Bearer token
    pub fn patch_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .patch(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Helper to make DELETE request with Bearer token
    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register a user and return the response body
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Value {
        let response = self
            .post("/api/user")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Log in and return the issued token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post("/api/user/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.expect("Failed to parse response");
        body["token"].as_str().unwrap().to_string()
    }

    /// Register then log in, returning (user id, token)
    pub async fn register_and_login(&self, username: &str, email: &str) -> (String, String) {
        let body = self.register(username, email, "secret123").await;
        let id = body["user"]["id"].as_str().unwrap().to_string();
        let token = self.login(email, "secret123").await;
        (id, token)
    }

    /// Read a stored record directly, bypassing HTTP
    pub async fn stored_user(&self, email: &str) -> Option<User> {
        let email = EmailAddress::new(email.to_string()).unwrap();
        self.repository.find_by_email(&email).await.unwrap()
    }
}
