use super::types::AnimePage;
use super::{CatalogSource, GenreKey};
use crate::config::Config;
use crate::error::RecommendationError;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JikanError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
    #[error("Rate limited by Jikan")]
    RateLimited,
    #[error("API error: {0}")]
    ApiError(String),
}

pub struct JikanClient {
    client: Client,
    config: Config,
}

impl JikanClient {
    pub fn new(config: Config) -> Result<Self, JikanError> {
        let mut builder = Client::builder().user_agent("Mood2Anime/1.0");
        if let Some(timeout) = config.upstream_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    pub fn anime_url(&self) -> String {
        format!(
            "{}{}",
            self.config.jikan_base_url.trim_end_matches('/'),
            self.config.jikan_anime_path
        )
    }

    /// Fetches one page of anime for a genre, ordered by popularity rank and
    /// pre-filtered upstream by minimum score. The body is returned untouched.
    pub async fn fetch_genre_raw(&self, genre_id: GenreKey) -> Result<Value, JikanError> {
        let url = self.anime_url();
        let genre = genre_id.to_string();
        let min_score = self.config.min_score.to_string();
        let limit = self.config.upstream_limit.to_string();

        tracing::debug!("Fetching from: {}?genres={}", url, genre);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("genres", genre.as_str()),
                ("order_by", "popularity"),
                ("sort", "asc"),
                ("min_score", min_score.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let json: Value = response.json().await?;
                Ok(json)
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                tracing::warn!("Rate limited by Jikan for genre {}", genre_id);
                Err(JikanError::RateLimited)
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(JikanError::ApiError(format!("HTTP {}: {}", status, error_text)))
            }
        }
    }

    pub async fn fetch_genre(&self, genre_id: GenreKey) -> Result<AnimePage, JikanError> {
        let raw = self.fetch_genre_raw(genre_id).await?;
        let page: AnimePage = serde_json::from_value(raw)?;
        Ok(page)
    }
}

impl CatalogSource for JikanClient {
    async fn fetch_page(&self, genre_id: GenreKey) -> Result<AnimePage, RecommendationError> {
        Ok(self.fetch_genre(genre_id).await?)
    }
}
