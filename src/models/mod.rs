use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod recommendation;

pub use recommendation::{Candidate, Page, Reason, RecommendationItem, RecommendationResponse};

pub type UserId = Uuid;
pub type SongId = Uuid;
pub type ArtistId = Uuid;
pub type AlbumId = Uuid;

/// A catalog song as read by the recommendation engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Song {
    pub id: SongId,
    pub title: String,
    pub genre: String,
    pub mood: String,
    pub language: String,
    pub artist_id: ArtistId,
    pub album_id: AlbumId,
    /// Non-negative play/favorite counter maintained by the catalog
    pub popularity: i64,
    /// Display name of the artist, joined from the catalog
    #[sqlx(default)]
    pub artist_name: Option<String>,
    /// Display title of the album, joined from the catalog
    #[sqlx(default)]
    pub album_title: Option<String>,
}

/// Stored taste fields of a user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: UserId,
    pub favorite_song_ids: Vec<SongId>,
    pub preferred_artist_ids: Vec<ArtistId>,
    pub preferred_languages: Vec<String>,
}

impl UserRecord {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn with_favorites(mut self, ids: impl IntoIterator<Item = SongId>) -> Self {
        self.favorite_song_ids.extend(ids);
        self
    }

    pub fn with_preferred_artists(mut self, ids: impl IntoIterator<Item = ArtistId>) -> Self {
        self.preferred_artist_ids.extend(ids);
        self
    }

    pub fn with_preferred_languages<S: Into<String>>(
        mut self,
        languages: impl IntoIterator<Item = S>,
    ) -> Self {
        self.preferred_languages
            .extend(languages.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_builders() {
        let id = Uuid::new_v4();
        let song = Uuid::new_v4();
        let artist = Uuid::new_v4();
        let user = UserRecord::new(id)
            .with_favorites([song])
            .with_preferred_artists([artist])
            .with_preferred_languages(["English"]);

        assert_eq!(user.id, id);
        assert_eq!(user.favorite_song_ids, vec![song]);
        assert_eq!(user.preferred_artist_ids, vec![artist]);
        assert_eq!(user.preferred_languages, vec!["English".to_string()]);
    }

    #[test]
    fn test_new_user_has_no_signals() {
        let user = UserRecord::new(Uuid::new_v4());
        assert!(user.favorite_song_ids.is_empty());
        assert!(user.preferred_artist_ids.is_empty());
        assert!(user.preferred_languages.is_empty());
    }
}
