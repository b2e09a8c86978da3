use super::types::AnimePage;
use super::{CatalogSource, GenreKey};
use crate::error::RecommendationError;
use reqwest::{Client, StatusCode};

/// Client for this service's own `/api/anime` pass-through route. This is the
/// path a browser-side consumer takes: same origin, no upstream keys.
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl CatalogSource for ProxyClient {
    async fn fetch_page(&self, genre_id: GenreKey) -> Result<AnimePage, RecommendationError> {
        let url = format!("{}/api/anime", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("genreId", genre_id.to_string())])
            .send()
            .await
            .map_err(|e| RecommendationError::TransportFailure(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<AnimePage>()
                .await
                .map_err(|e| RecommendationError::TransportFailure(e.to_string())),
            StatusCode::TOO_MANY_REQUESTS => Err(RecommendationError::RateLimited),
            status => {
                tracing::error!("Proxy returned {} for genre {}", status, genre_id);
                Err(RecommendationError::TransportFailure(format!("HTTP {}", status)))
            }
        }
    }
}
