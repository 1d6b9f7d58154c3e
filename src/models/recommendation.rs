use serde::{Serialize, Serializer};
use std::fmt::Display;

use super::{AlbumId, ArtistId, Song, SongId};

/// Human-readable justification attached to a recommended song
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    FavoriteArtist,
    FavoriteGenre(String),
    FavoriteMood,
    PreferredArtist,
    PreferredLanguage(String),
    Popular,
}

impl Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::FavoriteArtist => write!(f, "Similar to your favorite artists"),
            Reason::FavoriteGenre(genre) => write!(f, "Because you like {}", genre),
            Reason::FavoriteMood => write!(f, "Matches your mood"),
            Reason::PreferredArtist => write!(f, "From your selected artists"),
            Reason::PreferredLanguage(language) => write!(f, "In {}", language),
            Reason::Popular => write!(f, "Popular right now"),
        }
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A song considered for one request, with its transient score and reason
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub song: Song,
    pub score: f64,
    pub reason: Reason,
}

/// One page of an ordered result set
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub total_pages: u32,
    pub total_count: usize,
}

/// Wire shape of a single recommendation
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationItem {
    pub song_id: SongId,
    pub title: String,
    pub artist_id: ArtistId,
    pub artist_name: Option<String>,
    pub album_id: AlbumId,
    pub album_title: Option<String>,
    pub genre: String,
    pub mood: String,
    pub language: String,
    pub popularity: i64,
    pub score: f64,
    pub reason: Reason,
}

impl From<Candidate> for RecommendationItem {
    fn from(candidate: Candidate) -> Self {
        let Candidate {
            song,
            score,
            reason,
        } = candidate;

        Self {
            song_id: song.id,
            title: song.title,
            artist_id: song.artist_id,
            artist_name: song.artist_name,
            album_id: song.album_id,
            album_title: song.album_title,
            genre: song.genre,
            mood: song.mood,
            language: song.language,
            popularity: song.popularity,
            score,
            reason,
        }
    }
}

/// Response body of `GET /api/v1/recommendations`
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<RecommendationItem>,
    pub page_number: u32,
    pub total_pages: u32,
    pub total_count: usize,
}

impl From<Page<Candidate>> for RecommendationResponse {
    fn from(page: Page<Candidate>) -> Self {
        Self {
            recommendations: page.items.into_iter().map(RecommendationItem::from).collect(),
            page_number: page.page_number,
            total_pages: page.total_pages,
            total_count: page.total_count,
        }
    }
}
