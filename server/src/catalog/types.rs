use serde::{Deserialize, Serialize};

/// One page of `/v4/anime` results. Only the fields the app displays are
/// modelled; everything else in the upstream record is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimePage {
    #[serde(default)]
    pub data: Vec<Anime>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub last_visible_page: Option<u32>,
    pub has_next_page: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    pub mal_id: u64,
    pub title: String,
    pub synopsis: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub score: Option<f64>,
    pub episodes: Option<u32>,
    #[serde(default)]
    pub aired: Aired,
    /// Upstream popularity rank (1 = most popular).
    pub popularity: Option<u32>,
    /// Number of users tracking the title.
    pub members: Option<u64>,
    pub trailer: Option<Trailer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub mal_id: Option<u64>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aired {
    pub string: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trailer {
    pub youtube_id: Option<String>,
    pub url: Option<String>,
}

impl Anime {
    /// Larger is more popular.
    pub fn popularity_metric(&self) -> u64 {
        self.members.unwrap_or(0)
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.name.as_str()).collect()
    }

    pub fn trailer_url(&self) -> Option<String> {
        let trailer = self.trailer.as_ref()?;
        match (&trailer.youtube_id, &trailer.url) {
            (Some(id), _) => Some(format!("https://www.youtube.com/watch?v={}", id)),
            (None, Some(url)) => Some(url.clone()),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_upstream_record_with_nulls() {
        let payload = json!({
            "data": [{
                "mal_id": 5114,
                "title": "Fullmetal Alchemist: Brotherhood",
                "synopsis": null,
                "genres": [{ "mal_id": 1, "type": "anime", "name": "Action" }],
                "score": 9.1,
                "episodes": null,
                "aired": { "string": "Apr 5, 2009 to Jul 4, 2010", "prop": {} },
                "popularity": 3,
                "members": 3400000,
                "trailer": { "youtube_id": null, "url": null, "embed_url": null },
                "rank": 1
            }],
            "pagination": { "last_visible_page": 4, "has_next_page": true }
        });

        let page: AnimePage = serde_json::from_value(payload).unwrap();
        let anime = &page.data[0];
        assert_eq!(anime.mal_id, 5114);
        assert_eq!(anime.genre_names(), vec!["Action"]);
        assert_eq!(anime.episodes, None);
        assert_eq!(anime.popularity_metric(), 3_400_000);
        assert_eq!(anime.trailer_url(), None);
        assert_eq!(anime.aired.string.as_deref(), Some("Apr 5, 2009 to Jul 4, 2010"));
    }

    #[test]
    fn test_missing_data_is_empty_page() {
        let page: AnimePage = serde_json::from_value(json!({})).unwrap();
        assert!(page.data.is_empty());
    }

    #[test]
    fn test_trailer_url_prefers_youtube_id() {
        let trailer = Trailer {
            youtube_id: Some("abc123".to_string()),
            url: Some("https://example.com/other".to_string()),
        };
        let anime = Anime {
            mal_id: 1,
            title: "x".to_string(),
            synopsis: None,
            genres: vec![],
            score: None,
            episodes: None,
            aired: Aired::default(),
            popularity: None,
            members: None,
            trailer: Some(trailer),
        };
        assert_eq!(
            anime.trailer_url().as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
    }
}
