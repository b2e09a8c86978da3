use super::types::*;
use super::{CatalogSource, GenreKey};
use crate::error::RecommendationError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-process catalog with canned pages per genre. Unknown genres get a
/// synthetic page so offline runs always have something to show.
pub struct MockCatalog {
    pages: HashMap<GenreKey, Result<AnimePage, RecommendationError>>,
    calls: AtomicUsize,
    seed: u64,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            pages: HashMap::new(),
            calls: AtomicUsize::new(0),
            seed,
        }
    }

    pub fn with_page(mut self, genre_id: GenreKey, data: Vec<Anime>) -> Self {
        self.pages.insert(
            genre_id,
            Ok(AnimePage {
                data,
                pagination: None,
            }),
        );
        self
    }

    pub fn with_failure(mut self, genre_id: GenreKey, err: RecommendationError) -> Self {
        self.pages.insert(genre_id, Err(err));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Generates `count` titles with scores spread over 4.0..10.0 and
    /// member counts in the tens of thousands to low millions.
    pub fn synthetic_page(&self, genre_id: GenreKey, count: usize) -> AnimePage {
        let mut rng = fastrand::Rng::with_seed(self.seed ^ u64::from(genre_id));

        let data = (0..count)
            .map(|i| {
                let mal_id = u64::from(genre_id) * 10_000 + i as u64;
                let score = ((4.0 + 6.0 * rng.f64()) * 100.0).round() / 100.0;
                let members = rng.u64(10_000..3_000_000);
                let trailer = if rng.bool() {
                    Some(Trailer {
                        youtube_id: Some(format!("mock{}", mal_id)),
                        url: None,
                    })
                } else {
                    None
                };

                Anime {
                    mal_id,
                    title: format!("Mock Anime {}", mal_id),
                    synopsis: Some(format!("Synthetic entry {} for genre {}.", i, genre_id)),
                    genres: vec![Genre {
                        mal_id: Some(u64::from(genre_id)),
                        name: format!("Genre {}", genre_id),
                    }],
                    score: Some(score),
                    episodes: Some(rng.u32(1..=64)),
                    aired: Aired {
                        string: Some(format!("{} to ?", 1990 + rng.u32(0..35))),
                    },
                    popularity: Some(rng.u32(1..20_000)),
                    members: Some(members),
                    trailer,
                }
            })
            .collect();

        AnimePage {
            data,
            pagination: None,
        }
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogSource for MockCatalog {
    async fn fetch_page(&self, genre_id: GenreKey) -> Result<AnimePage, RecommendationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.pages.get(&genre_id) {
            Some(page) => page.clone(),
            None => Ok(self.synthetic_page(genre_id, 25)),
        }
    }
}

/// Shorthand for building a displayable record in tests and fixtures.
pub fn anime(mal_id: u64, score: Option<f64>, members: u64) -> Anime {
    Anime {
        mal_id,
        title: format!("Anime {}", mal_id),
        synopsis: None,
        genres: Vec::new(),
        score,
        episodes: None,
        aired: Aired::default(),
        popularity: None,
        members: Some(members),
        trailer: None,
    }
}
