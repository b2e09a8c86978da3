use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::cache::RecommendationCache;
use crate::catalog::types::Anime;
use crate::catalog::{CatalogSource, GenreKey};
use crate::config::Config;
use crate::error::RecommendationError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterPolicy {
    pub min_score: f64,
    pub max_results: usize,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            min_score: 6.0,
            max_results: 20,
        }
    }
}

impl From<&Config> for FilterPolicy {
    fn from(config: &Config) -> Self {
        Self {
            min_score: config.min_score,
            max_results: config.max_results,
        }
    }
}

/// Keeps items scoring at least `min_score`, most popular first, capped at
/// `max_results`. Unscored items never qualify. Ties keep upstream order.
pub fn filter_and_rank(items: Vec<Anime>, policy: &FilterPolicy) -> Vec<Anime> {
    let mut kept: Vec<Anime> = items
        .into_iter()
        .filter(|anime| anime.score.map_or(false, |score| score >= policy.min_score))
        .collect();

    kept.sort_by(|a, b| b.popularity_metric().cmp(&a.popularity_metric()));
    kept.truncate(policy.max_results);
    kept
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendations {
    pub genre_id: GenreKey,
    pub items: Arc<[Anime]>,
    pub cached: bool,
    pub cached_at: DateTime<Utc>,
}

pub struct RecommendationPipeline<S> {
    source: S,
    cache: Arc<RecommendationCache>,
    policy: FilterPolicy,
}

impl<S: CatalogSource> RecommendationPipeline<S> {
    pub fn new(source: S, cache: Arc<RecommendationCache>, policy: FilterPolicy) -> Self {
        Self {
            source,
            cache,
            policy,
        }
    }

    pub fn cache(&self) -> &Arc<RecommendationCache> {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Serves a fresh cache entry if there is one, otherwise fetches, filters
    /// and caches. Empty results are reported and never cached.
    pub async fn recommend(&self, genre_id: GenreKey) -> Result<Recommendations, RecommendationError> {
        if let Some(entry) = self.cache.get(genre_id) {
            tracing::debug!("Cache hit for genre {}", genre_id);
            return Ok(Recommendations {
                genre_id,
                items: entry.results,
                cached: true,
                cached_at: entry.cached_at,
            });
        }

        tracing::debug!("Cache miss for genre {}, fetching", genre_id);
        let page = self.source.fetch_page(genre_id).await?;
        let fetched = page.data.len();
        let items = filter_and_rank(page.data, &self.policy);

        if items.is_empty() {
            tracing::info!("Genre {} returned {} items, none qualified", genre_id, fetched);
            return Err(RecommendationError::EmptyResult);
        }

        tracing::info!(
            "Genre {}: {} of {} fetched items qualified",
            genre_id,
            items.len(),
            fetched
        );

        let entry = self.cache.put(genre_id, items);
        Ok(Recommendations {
            genre_id,
            items: entry.results,
            cached: false,
            cached_at: entry.cached_at,
        })
    }
}
