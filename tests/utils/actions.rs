use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestApp;

/// Status plus decoded JSON body (`Value::Null` for empty bodies)
pub struct TestResponse {
    pub status: StatusCode,
    pub www_authenticate: Option<String>,
    pub body: Value,
}

// ============================================================================
// Action Helpers
// ============================================================================

impl TestApp {
    /// Send one request through the router
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let www_authenticate = response
            .headers()
            .get(header::WWW_AUTHENTICATE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            www_authenticate,
            body,
        }
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn register(&self, username: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/register",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    /// Register and log in, returning the access token
    pub async fn signed_in(&self, username: &str) -> String {
        let password = format!("{}-password", username);
        assert_eq!(
            self.register(username, &password).await.status,
            StatusCode::CREATED
        );
        let login = self.login(username, &password).await;
        assert_eq!(login.status, StatusCode::OK);
        login.body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn add_expense(&self, token: &str, body: Value) -> TestResponse {
        self.request(Method::POST, "/expenses", Some(token), Some(body))
            .await
    }

    /// Add an expense and return its id
    pub async fn add_expense_at(
        &self,
        token: &str,
        amount: f64,
        description: &str,
        timestamp: &str,
    ) -> i64 {
        let response = self
            .add_expense(
                token,
                json!({ "amount": amount, "description": description, "timestamp": timestamp }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["id"].as_i64().unwrap()
    }

    pub async fn get_expense(&self, token: &str, id: i64) -> TestResponse {
        self.request(Method::GET, &format!("/expenses/{}", id), Some(token), None)
            .await
    }

    pub async fn update_expense(&self, token: &str, id: i64, body: Value) -> TestResponse {
        self.request(
            Method::PUT,
            &format!("/expenses/{}", id),
            Some(token),
            Some(body),
        )
        .await
    }

    pub async fn delete_expense(&self, token: &str, id: i64) -> TestResponse {
        self.request(
            Method::DELETE,
            &format!("/expenses/{}", id),
            Some(token),
            None,
        )
        .await
    }

    /// `query` is appended verbatim, e.g. `range=last_week`
    pub async fn list_expenses(&self, token: &str, query: &str) -> TestResponse {
        self.request(
            Method::GET,
            &format!("/expenses?{}", query),
            Some(token),
            None,
        )
        .await
    }

    pub async fn summary(&self, token: &str, query: &str) -> TestResponse {
        self.request(
            Method::GET,
            &format!("/expenses/summary?{}", query),
            Some(token),
            None,
        )
        .await
    }
}

impl TestResponse {
    /// Descriptions of a list response, in order
    pub fn descriptions(&self) -> Vec<String> {
        self.body
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["description"].as_str().unwrap().to_string())
            .collect()
    }
}
