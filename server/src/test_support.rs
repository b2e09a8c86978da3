//! Stub HTTP servers bound to ephemeral ports for exercising the clients and
//! routes against real sockets.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Clone, Debug)]
pub enum StubReply {
    Json(Value),
    JsonWithStatus(u16, Value),
    Slow(Duration, Value),
    Status(u16),
}

#[derive(Clone)]
struct StubState {
    reply: StubReply,
    last_query: Arc<Mutex<Option<HashMap<String, String>>>>,
    hits: Arc<AtomicUsize>,
}

pub struct Stub {
    pub base_url: String,
    state: StubState,
    handle: JoinHandle<()>,
}

impl Stub {
    pub fn last_query(&self) -> Option<HashMap<String, String>> {
        self.state.last_query.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

impl Drop for Stub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn stub_handler(
    State(state): State<StubState>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_query.lock().unwrap() = Some(query);

    match &state.reply {
        StubReply::Json(body) => Json(body.clone()).into_response(),
        StubReply::JsonWithStatus(code, body) => {
            let status = StatusCode::from_u16(*code).unwrap();
            (status, Json(body.clone())).into_response()
        }
        StubReply::Slow(delay, body) => {
            tokio::time::sleep(*delay).await;
            Json(body.clone()).into_response()
        }
        StubReply::Status(code) => {
            let status = StatusCode::from_u16(*code).unwrap();
            (status, Json(json!({ "error": "stubbed failure" }))).into_response()
        }
    }
}

pub async fn serve_stub(path: &str, reply: StubReply) -> Stub {
    let state = StubState {
        reply,
        last_query: Arc::new(Mutex::new(None)),
        hits: Arc::new(AtomicUsize::new(0)),
    };
    let router = Router::new()
        .route(path, get(stub_handler))
        .with_state(state.clone());
    let (base_url, handle) = serve_router(router).await;

    Stub {
        base_url,
        state,
        handle,
    }
}

pub async fn serve_router(router: Router) -> (String, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}", addr), handle)
}

/// A page-shaped upstream record with the fields the app reads.
pub fn anime_json(mal_id: u64, score: f64, members: u64) -> Value {
    json!({
        "mal_id": mal_id,
        "title": format!("Anime {}", mal_id),
        "synopsis": "A story.",
        "genres": [{ "mal_id": 4, "name": "Comedy" }],
        "score": score,
        "episodes": 12,
        "aired": { "string": "Apr 2020 to Jun 2020" },
        "popularity": 100,
        "members": members,
        "trailer": { "youtube_id": "xyz", "url": null }
    })
}
