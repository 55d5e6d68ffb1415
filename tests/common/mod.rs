#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use trail_service::config::AppConfig;
use trail_service::database::models::User;
use trail_service::router;
use trail_service::testing::{self, MemoryRepository, StubVerifier};

pub const GRACE_EMAIL: &str = "grace@plymouth.ac.uk";
pub const GRACE_PASSWORD: &str = "ISAD123!";

/// Router over a seeded in-memory repository, driven with `oneshot`
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryRepository>,
    pub config: Arc<AppConfig>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    /// App whose identity provider accepts only Grace's credentials
    pub fn new() -> Self {
        Self::with_verifier(StubVerifier::accepting(GRACE_EMAIL, GRACE_PASSWORD))
    }

    pub fn with_verifier(verifier: StubVerifier) -> Self {
        let (state, repo) = testing::test_state(verifier);
        let config = state.config.clone();
        Self {
            router: router::app(state),
            repo,
            config,
        }
    }

    pub fn seed_user(id: i32) -> User {
        let (name, email) = match id {
            1 => ("Grace Hopper", GRACE_EMAIL),
            2 => ("Tim Berners-Lee", "tim@plymouth.ac.uk"),
            _ => ("Ada Lovelace", "ada@plymouth.ac.uk"),
        };
        User {
            id,
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    /// Bearer header for one of the seeded users
    pub fn bearer(&self, user_id: i32) -> String {
        testing::bearer_for(&Self::seed_user(user_id), &self.config)
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };
        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }

    pub async fn get(&self, uri: &str) -> Result<TestResponse> {
        self.send(Request::get(uri).body(Body::empty())?).await
    }

    pub async fn get_auth(&self, uri: &str, bearer: &str) -> Result<TestResponse> {
        let request = Request::get(uri)
            .header(header::AUTHORIZATION, bearer)
            .body(Body::empty())?;
        self.send(request).await
    }

    /// JSON request; `bearer` is sent verbatim as the Authorization header
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: &Value,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(bearer) = bearer {
            builder = builder.header(header::AUTHORIZATION, bearer);
        }
        self.send(builder.body(Body::from(body.to_string()))?).await
    }

    pub async fn delete(&self, uri: &str, bearer: Option<&str>) -> Result<TestResponse> {
        let mut builder = Request::delete(uri);
        if let Some(bearer) = bearer {
            builder = builder.header(header::AUTHORIZATION, bearer);
        }
        self.send(builder.body(Body::empty())?).await
    }

    /// `POST /token` with a url-encoded form
    pub async fn token(&self, username: &str, password: &str) -> Result<TestResponse> {
        let form = format!(
            "username={}&password={}",
            encode(username),
            encode(password)
        );
        let request = Request::post("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))?;
        self.send(request).await
    }

    /// Create a trail as `user_id` and return its id
    pub async fn create_trail(&self, user_id: i32, name: &str) -> Result<i32> {
        let bearer = self.bearer(user_id);
        let res = self
            .json(
                Method::POST,
                "/api/trails",
                Some(&bearer),
                &serde_json::json!({ "TrailName": name }),
            )
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create failed: {}", res.body);
        res.body["TrailID"]
            .as_i64()
            .map(|id| id as i32)
            .context("missing TrailID")
    }
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
