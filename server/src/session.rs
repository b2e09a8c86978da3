//! Browsing state for one user: which mood is selected, whether a fetch is in
//! flight, and where the cursor sits in the loaded list.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::catalog::types::Anime;
use crate::catalog::CatalogSource;
use crate::error::RecommendationError;
use crate::moods::Mood;
use crate::pipeline::RecommendationPipeline;

/// Identifies one in-flight fetch. Outcomes carrying an old token are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RequestToken(Uuid);

impl RequestToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-empty list with a cursor that wraps in both directions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationList {
    items: Arc<[Anime]>,
    cursor: usize,
}

impl RecommendationList {
    pub fn new(items: Arc<[Anime]>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self { items, cursor: 0 })
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn items(&self) -> &[Anime] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Anime> {
        self.items.get(index)
    }

    pub fn current(&self) -> &Anime {
        &self.items[self.cursor]
    }

    pub fn next(&mut self) -> &Anime {
        self.cursor = (self.cursor + 1) % self.items.len();
        self.current()
    }

    pub fn previous(&mut self) -> &Anime {
        self.cursor = if self.cursor == 0 {
            self.items.len() - 1
        } else {
            self.cursor - 1
        };
        self.current()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    Loading {
        mood: Mood,
        token: RequestToken,
    },
    Loaded {
        mood: Mood,
        list: RecommendationList,
    },
    Error {
        mood: Mood,
        error: RecommendationError,
    },
}

#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn selected_mood(&self) -> Option<&Mood> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Loading { mood, .. }
            | SessionState::Loaded { mood, .. }
            | SessionState::Error { mood, .. } => Some(mood),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading { .. })
    }

    pub fn error_message(&self) -> Option<String> {
        match &self.state {
            SessionState::Error { error, .. } => Some(error.user_message()),
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&Anime> {
        match &self.state {
            SessionState::Loaded { list, .. } => Some(list.current()),
            _ => None,
        }
    }

    /// Starts a new fetch. Any fetch still in flight becomes stale.
    pub fn select_mood(&mut self, mood: Mood) -> RequestToken {
        let token = RequestToken::new();
        tracing::debug!("Mood {} selected, request {}", mood.name, token);
        self.state = SessionState::Loading { mood, token };
        token
    }

    /// Returns false when the token is stale and the outcome was dropped.
    pub fn fetch_succeeded(&mut self, token: RequestToken, items: Arc<[Anime]>) -> bool {
        let Some(mood) = self.take_pending(token) else {
            return false;
        };
        self.state = match RecommendationList::new(items) {
            Some(list) => SessionState::Loaded { mood, list },
            None => SessionState::Error {
                mood,
                error: RecommendationError::EmptyResult,
            },
        };
        true
    }

    pub fn fetch_failed(&mut self, token: RequestToken, error: RecommendationError) -> bool {
        let Some(mood) = self.take_pending(token) else {
            return false;
        };
        tracing::warn!("Recommendation for {} failed: {}", mood.name, error);
        self.state = SessionState::Error { mood, error };
        true
    }

    pub fn next(&mut self) -> Option<&Anime> {
        match &mut self.state {
            SessionState::Loaded { list, .. } => Some(list.next()),
            _ => None,
        }
    }

    pub fn previous(&mut self) -> Option<&Anime> {
        match &mut self.state {
            SessionState::Loaded { list, .. } => Some(list.previous()),
            _ => None,
        }
    }

    fn take_pending(&self, token: RequestToken) -> Option<Mood> {
        match &self.state {
            SessionState::Loading { mood, token: pending } if *pending == token => Some(*mood),
            _ => {
                tracing::debug!("Discarding stale response for request {}", token);
                None
            }
        }
    }
}

/// Runs one mood selection end to end against a session.
pub struct Recommender<S> {
    pipeline: RecommendationPipeline<S>,
}

impl<S: CatalogSource> Recommender<S> {
    pub fn new(pipeline: RecommendationPipeline<S>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &RecommendationPipeline<S> {
        &self.pipeline
    }

    pub async fn select(&self, session: &mut Session, mood: Mood) -> bool {
        let token = session.select_mood(mood);
        self.resolve(session, token, mood).await
    }

    /// Fetches for `mood` and applies the outcome under `token`.
    pub async fn resolve(&self, session: &mut Session, token: RequestToken, mood: Mood) -> bool {
        match self.pipeline.recommend(mood.genre_id).await {
            Ok(recs) => session.fetch_succeeded(token, recs.items),
            Err(err) => session.fetch_failed(token, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RecommendationCache;
    use crate::catalog::mock::{anime, MockCatalog};
    use crate::moods;
    use crate::pipeline::FilterPolicy;

    fn list_of(n: u64) -> Arc<[Anime]> {
        (0..n).map(|i| anime(i, Some(7.0), 100 - i)).collect::<Vec<_>>().into()
    }

    fn happy() -> Mood {
        *moods::find("Happy").unwrap()
    }

    fn sad() -> Mood {
        *moods::find("Sad").unwrap()
    }

    #[test]
    fn test_cursor_wraps_forward_and_back() {
        let mut list = RecommendationList::new(list_of(3)).unwrap();
        assert_eq!(list.previous().mal_id, 2);
        assert_eq!(list.cursor(), 2);
        assert_eq!(list.next().mal_id, 0);
        assert_eq!(list.cursor(), 0);
        list.next();
        list.next();
        assert_eq!(list.next().mal_id, 0);
    }

    #[test]
    fn test_single_item_list_stays_put() {
        let mut list = RecommendationList::new(list_of(1)).unwrap();
        assert_eq!(list.next().mal_id, 0);
        assert_eq!(list.previous().mal_id, 0);
    }

    #[test]
    fn test_empty_list_is_rejected() {
        assert!(RecommendationList::new(list_of(0)).is_none());
    }

    #[test]
    fn test_state_transitions() {
        let mut session = Session::new();
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.next().is_none());

        let token = session.select_mood(happy());
        assert!(session.is_loading());
        assert!(session.fetch_succeeded(token, list_of(2)));
        assert_eq!(session.current().map(|a| a.mal_id), Some(0));
        assert_eq!(session.next().map(|a| a.mal_id), Some(1));
        assert_eq!(session.next().map(|a| a.mal_id), Some(0));

        let token = session.select_mood(sad());
        assert!(session.fetch_failed(token, RecommendationError::RateLimited));
        assert_eq!(session.selected_mood().map(|m| m.name), Some("Sad"));
        assert_eq!(
            session.error_message().as_deref(),
            Some("Too many requests. Please wait a moment and try again.")
        );
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = Session::new();
        let slow = session.select_mood(happy());
        let fast = session.select_mood(sad());

        assert!(session.fetch_succeeded(fast, list_of(3)));
        assert!(!session.fetch_succeeded(slow, list_of(1)));
        assert!(!session.fetch_failed(slow, RecommendationError::TransportFailure("late".into())));

        match session.state() {
            SessionState::Loaded { mood, list } => {
                assert_eq!(mood.name, "Sad");
                assert_eq!(list.len(), 3);
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_empty_success_becomes_empty_result() {
        let mut session = Session::new();
        let token = session.select_mood(happy());
        assert!(session.fetch_succeeded(token, list_of(0)));
        assert_eq!(
            session.error_message().as_deref(),
            Some("No anime found for this mood. Try a different mood!")
        );
    }

    #[tokio::test]
    async fn test_recommender_drives_session() {
        let catalog = MockCatalog::new()
            .with_page(4, vec![anime(1, Some(8.0), 10), anime(2, Some(8.5), 90)])
            .with_failure(8, RecommendationError::TransportFailure("HTTP 500".into()));
        let cache = Arc::new(RecommendationCache::default());
        let recommender =
            Recommender::new(RecommendationPipeline::new(catalog, cache, FilterPolicy::default()));
        let mut session = Session::new();

        assert!(recommender.select(&mut session, happy()).await);
        assert_eq!(session.current().map(|a| a.mal_id), Some(2));

        assert!(recommender.select(&mut session, sad()).await);
        assert!(matches!(
            session.state(),
            SessionState::Error {
                error: RecommendationError::TransportFailure(_),
                ..
            }
        ));

        // Reselecting Happy is served from cache.
        assert!(recommender.select(&mut session, happy()).await);
        assert_eq!(recommender.pipeline().source().calls(), 2);
    }
}
