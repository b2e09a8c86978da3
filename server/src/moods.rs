use serde::Serialize;

use crate::catalog::GenreKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mood {
    pub name: &'static str,
    pub emoji: &'static str,
    pub genre_id: GenreKey,
}

// Genre ids are Jikan/MyAnimeList genre codes.
pub const MOODS: [Mood; 12] = [
    Mood { name: "Happy", emoji: "😊", genre_id: 4 },
    Mood { name: "Sad", emoji: "😢", genre_id: 8 },
    Mood { name: "Excited", emoji: "😆", genre_id: 1 },
    Mood { name: "Relaxed", emoji: "😌", genre_id: 36 },
    Mood { name: "Romantic", emoji: "😍", genre_id: 22 },
    Mood { name: "Scared", emoji: "😨", genre_id: 14 },
    Mood { name: "Thoughtful", emoji: "🤔", genre_id: 7 },
    Mood { name: "Gloomy", emoji: "😔", genre_id: 8 },
    Mood { name: "Angry", emoji: "😤", genre_id: 1 },
    Mood { name: "Amazed", emoji: "🤩", genre_id: 10 },
    Mood { name: "Cool", emoji: "😎", genre_id: 24 },
    Mood { name: "Emotional", emoji: "🥺", genre_id: 8 },
];

pub fn all() -> &'static [Mood] {
    &MOODS
}

/// Case-insensitive lookup by mood name.
pub fn find(name: &str) -> Option<&'static Mood> {
    let name = name.trim();
    MOODS.iter().find(|mood| mood.name.eq_ignore_ascii_case(name))
}
