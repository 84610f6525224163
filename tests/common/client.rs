//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per upload-server endpoint.

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET /
    pub async fn home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    /// POST /v1/recommend with `bytes` in the `image` field
    pub async fn recommend(&self, bytes: &[u8]) -> Response {
        self.recommend_field("image", bytes).await
    }

    /// POST /v1/recommend with `bytes` in an arbitrary field
    pub async fn recommend_field(&self, field: &str, bytes: &[u8]) -> Response {
        let part = Part::bytes(bytes.to_vec()).file_name("outfit.png");
        let form = Form::new().part(field.to_string(), part);

        self.client
            .post(format!("{}/v1/recommend", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("Recommend request failed")
    }
}
