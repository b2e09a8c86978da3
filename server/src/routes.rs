use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    cache::RecommendationCache,
    catalog::{jikan::JikanClient, types::Anime, GenreKey, ProxyCache},
    config::Config,
    error::RecommendationError,
    moods::{self, Mood},
    pipeline::RecommendationPipeline,
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<RecommendationPipeline<JikanClient>>,
    pub proxy_cache: ProxyCache,
}

impl AppState {
    pub fn cache(&self) -> &Arc<RecommendationCache> {
        self.pipeline.cache()
    }
}

#[derive(Debug, Deserialize)]
pub struct GenreQuery {
    #[serde(rename = "genreId")]
    pub genre_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    #[serde(rename = "genreId")]
    pub genre_id: Option<String>,
    pub mood: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub cache_ttl_secs: u64,
    pub cached_genres: Vec<GenreKey>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub genre_id: GenreKey,
    pub mood: Option<String>,
    pub cached: bool,
    pub cached_at: chrono::DateTime<chrono::Utc>,
    pub items: Arc<[Anime]>,
}

/// Error half of every handler: the status code plus `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError(pub RecommendationError);

impl From<RecommendationError> for ApiError {
    fn from(err: RecommendationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            RecommendationError::MissingParameter | RecommendationError::InvalidParameter(_) => {
                StatusCode::BAD_REQUEST
            }
            RecommendationError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            RecommendationError::EmptyResult => StatusCode::NOT_FOUND,
            RecommendationError::TransportFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

pub fn parse_genre_id(raw: Option<&str>) -> Result<GenreKey, RecommendationError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let raw = raw.ok_or(RecommendationError::MissingParameter)?;
    raw.parse::<GenreKey>().map_err(|_| {
        RecommendationError::InvalidParameter(format!("Genre ID must be a number, got {:?}", raw))
    })
}

// Route handlers
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache_ttl_secs: state.config.cache_ttl_secs,
        cached_genres: state.cache().keys(),
    })
}

pub async fn list_moods() -> Json<&'static [Mood]> {
    Json(moods::all())
}

/// Pass-through to the upstream catalog. The body is forwarded as received.
pub async fn proxy_anime(
    State(state): State<AppState>,
    Query(params): Query<GenreQuery>,
) -> Result<Json<Value>, ApiError> {
    let genre_id = parse_genre_id(params.genre_id.as_deref())?;

    // Concurrent misses for one genre share a single upstream call; failures
    // are not cached.
    let fetch = async {
        tracing::debug!("Proxy cache miss for genre {}", genre_id);
        state.pipeline.source().fetch_genre_raw(genre_id).await
    };

    match state.proxy_cache.try_get_with(genre_id, fetch).await {
        Ok(body) => Ok(Json(body)),
        Err(e) => {
            tracing::error!("Error fetching anime data for genre {}: {}", genre_id, e);
            Err(ApiError(RecommendationError::from(&*e)))
        }
    }
}

pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationQuery>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    let genre_param = params
        .genre_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let mood_param = params.mood.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let (genre_id, mood) = match (genre_param, mood_param) {
        (Some(raw), _) => (parse_genre_id(Some(raw))?, None),
        (None, Some(name)) => {
            let mood = moods::find(name).ok_or_else(|| {
                RecommendationError::InvalidParameter(format!("Unknown mood: {}", name))
            })?;
            (mood.genre_id, Some(mood.name.to_string()))
        }
        (None, None) => return Err(RecommendationError::MissingParameter.into()),
    };

    let recs = state.pipeline.recommend(genre_id).await.map_err(|e| {
        tracing::warn!("Recommendations for genre {} failed: {}", genre_id, e);
        ApiError(e)
    })?;

    Ok(Json(RecommendationResponse {
        genre_id,
        mood,
        cached: recs.cached,
        cached_at: recs.cached_at,
        items: recs.items,
    }))
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/moods", get(list_moods))
        .route("/api/anime", get(proxy_anime))
        .route("/api/recommendations", get(get_recommendations))
        .with_state(state)
}
