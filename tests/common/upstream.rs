//! Fake upstream services
//!
//! One in-process axum server standing in for the vision model endpoint, the
//! Spotify token endpoint and the Spotify search endpoint. Behaviour is
//! configurable per test and every endpoint counts its calls.

use super::constants::*;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// What the fake model endpoint answers.
#[derive(Clone, Debug)]
pub enum ModelBehavior {
    /// 200 with this assistant content.
    Reply(String),
    /// Error status with a short body.
    Status(u16),
}

/// What the fake token endpoint answers to valid credentials.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TokenBehavior {
    Grant,
    /// 200 with a body that has no `access_token`.
    OmitToken,
    Reject(u16),
}

#[derive(Default)]
struct UpstreamState {
    model: Mutex<Option<ModelBehavior>>,
    token: Mutex<Option<TokenBehavior>>,
    tracks: Mutex<HashMap<(String, String), Vec<Value>>>,
    failing: Mutex<HashSet<(String, String)>>,
    model_requests: Mutex<Vec<Value>>,
    search_queries: Mutex<Vec<HashMap<String, String>>>,
    model_calls: AtomicUsize,
    token_calls: AtomicUsize,
    search_calls: AtomicUsize,
}

pub struct FakeUpstream {
    /// Base URL, e.g. "http://127.0.0.1:12345"
    pub base_url: String,
    state: Arc<UpstreamState>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl FakeUpstream {
    /// Spawns the fake on a random port. The model replies with
    /// [`STREETWEAR_REPLY`] and the token endpoint grants tokens until told
    /// otherwise.
    pub async fn spawn() -> Self {
        let state = Arc::new(UpstreamState::default());
        *state.model.lock().unwrap() = Some(ModelBehavior::Reply(STREETWEAR_REPLY.to_string()));
        *state.token.lock().unwrap() = Some(TokenBehavior::Grant);

        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .route("/api/token", post(token))
            .route("/v1/search", get(search))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake upstream failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn vision_base_url(&self) -> String {
        format!("{}/v1", self.base_url)
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.base_url)
    }

    pub fn api_url(&self) -> String {
        format!("{}/v1", self.base_url)
    }

    pub fn set_model(&self, behavior: ModelBehavior) {
        *self.state.model.lock().unwrap() = Some(behavior);
    }

    pub fn set_token(&self, behavior: TokenBehavior) {
        *self.state.token.lock().unwrap() = Some(behavior);
    }

    /// Registers the tracks returned for `artist:"<artist>" genre:"<genre>"`.
    /// Each entry is `(name, popularity)` and is credited to `artist`.
    pub fn add_tracks(&self, artist: &str, genre: &str, tracks: &[(&str, u32)]) {
        let items = tracks
            .iter()
            .map(|(name, popularity)| {
                json!({
                    "name": name,
                    "popularity": popularity,
                    "artists": [{ "name": artist }],
                    "external_urls": {
                        "spotify": format!("https://open.spotify.com/track/{}", name.replace(' ', "-"))
                    }
                })
            })
            .collect();
        self.state
            .tracks
            .lock()
            .unwrap()
            .insert((artist.to_string(), genre.to_string()), items);
    }

    /// Makes the search for this pair answer 500.
    pub fn fail_search(&self, artist: &str, genre: &str) {
        self.state
            .failing
            .lock()
            .unwrap()
            .insert((artist.to_string(), genre.to_string()));
    }

    pub fn model_calls(&self) -> usize {
        self.state.model_calls.load(Ordering::SeqCst)
    }

    pub fn token_calls(&self) -> usize {
        self.state.token_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.state.search_calls.load(Ordering::SeqCst)
    }

    /// Query parameters of every search received, in arrival order.
    pub fn search_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.search_queries.lock().unwrap().clone()
    }

    /// JSON bodies of every model request received.
    pub fn model_requests(&self) -> Vec<Value> {
        self.state.model_requests.lock().unwrap().clone()
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn bearer_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", expected))
        .unwrap_or(false)
}

async fn chat_completions(
    State(state): State<Arc<UpstreamState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.model_calls.fetch_add(1, Ordering::SeqCst);
    state.model_requests.lock().unwrap().push(body);

    if !bearer_matches(&headers, TEST_API_KEY) {
        return (StatusCode::UNAUTHORIZED, "bad api key").into_response();
    }

    let behavior = state.model.lock().unwrap().clone();
    match behavior {
        Some(ModelBehavior::Reply(content)) => Json(json!({
            "choices": [{
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 900, "completion_tokens": 120, "total_tokens": 1020 }
        }))
        .into_response(),
        Some(ModelBehavior::Status(code)) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "model unavailable",
        )
            .into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn token(
    State(state): State<Arc<UpstreamState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.token_calls.fetch_add(1, Ordering::SeqCst);

    let expected = format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", TEST_CLIENT_ID, TEST_CLIENT_SECRET))
    );
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false);
    if !authorized || body != "grant_type=client_credentials" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response();
    }

    let behavior = *state.token.lock().unwrap();
    match behavior {
        Some(TokenBehavior::Grant) => Json(json!({
            "access_token": TEST_ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": 3600
        }))
        .into_response(),
        Some(TokenBehavior::OmitToken) => {
            Json(json!({ "token_type": "Bearer", "expires_in": 3600 })).into_response()
        }
        Some(TokenBehavior::Reject(code)) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::UNAUTHORIZED),
            Json(json!({ "error": "invalid_client" })),
        )
            .into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Pulls `<key>:"<value>"` out of a search `q` string.
fn quoted_filter(q: &str, key: &str) -> Option<String> {
    let start = q.find(&format!("{}:\"", key))? + key.len() + 2;
    let len = q[start..].find('"')?;
    Some(q[start..start + len].to_string())
}

async fn search(
    State(state): State<Arc<UpstreamState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.search_calls.fetch_add(1, Ordering::SeqCst);
    state.search_queries.lock().unwrap().push(params.clone());

    if !bearer_matches(&headers, TEST_ACCESS_TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let q = params.get("q").cloned().unwrap_or_default();
    let (Some(artist), Some(genre)) = (quoted_filter(&q, "artist"), quoted_filter(&q, "genre"))
    else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let key = (artist, genre);

    if state.failing.lock().unwrap().contains(&key) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "search failed").into_response();
    }

    let items = state
        .tracks
        .lock()
        .unwrap()
        .get(&key)
        .cloned()
        .unwrap_or_default();
    Json(json!({ "tracks": { "items": items } })).into_response()
}
