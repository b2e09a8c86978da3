pub mod jikan;
pub mod mock;
pub mod proxy;
pub mod types;

use moka::future::Cache;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use types::AnimePage;

use crate::error::RecommendationError;

/// Jikan genre code a mood maps to.
pub type GenreKey = u32;

/// Raw upstream payloads kept briefly so bursts on the proxy route do not
/// each cost an upstream request.
pub type ProxyCache = Cache<GenreKey, Value>;

pub fn init_proxy_cache(ttl: Duration) -> ProxyCache {
    Cache::builder()
        .max_capacity(64)
        .time_to_live(ttl)
        .build()
}

/// Anything that can produce a page of anime for a genre.
pub trait CatalogSource: Send + Sync {
    fn fetch_page(
        &self,
        genre_id: GenreKey,
    ) -> impl Future<Output = Result<AnimePage, RecommendationError>> + Send;
}
