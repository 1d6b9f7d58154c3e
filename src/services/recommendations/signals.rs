use std::collections::BTreeSet;

use crate::models::{ArtistId, Song, SongId, UserRecord};

/// Normalized taste signals of one user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TasteProfile {
    pub favorite_song_ids: BTreeSet<SongId>,
    pub favorite_artist_ids: BTreeSet<ArtistId>,
    pub favorite_genres: BTreeSet<String>,
    pub favorite_moods: BTreeSet<String>,
    pub preferred_artist_ids: BTreeSet<ArtistId>,
    pub preferred_languages: BTreeSet<String>,
    /// Union of favorite and preferred artists
    pub target_artist_ids: BTreeSet<ArtistId>,
}

impl TasteProfile {
    /// True when at least one signal dimension is non-empty
    pub fn has_signals(&self) -> bool {
        !(self.target_artist_ids.is_empty()
            && self.preferred_languages.is_empty()
            && self.favorite_genres.is_empty()
            && self.favorite_moods.is_empty())
    }
}

/// Projects the user's favorited songs and stated preferences into a profile
///
/// `favorites` are the song records fetched for `user.favorite_song_ids`; ids
/// that no longer resolve to a song still count as favorites for exclusion.
pub fn extract_profile(user: &UserRecord, favorites: &[Song]) -> TasteProfile {
    let favorite_artist_ids: BTreeSet<ArtistId> = favorites.iter().map(|s| s.artist_id).collect();
    let preferred_artist_ids: BTreeSet<ArtistId> =
        user.preferred_artist_ids.iter().copied().collect();

    let target_artist_ids = favorite_artist_ids
        .union(&preferred_artist_ids)
        .copied()
        .collect();

    TasteProfile {
        favorite_song_ids: user.favorite_song_ids.iter().copied().collect(),
        favorite_genres: favorites.iter().map(|s| s.genre.clone()).collect(),
        favorite_moods: favorites.iter().map(|s| s.mood.clone()).collect(),
        preferred_languages: user.preferred_languages.iter().cloned().collect(),
        favorite_artist_ids,
        preferred_artist_ids,
        target_artist_ids,
    }
}
