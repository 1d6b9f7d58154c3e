use crate::models::{Candidate, Reason, Song};

use super::signals::TasteProfile;

/// Point values of each signal match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub favorite_artist: f64,
    pub favorite_genre: f64,
    pub favorite_mood: f64,
    pub preferred_artist: f64,
    pub preferred_language: f64,
}

pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    favorite_artist: 5.0,
    favorite_genre: 3.0,
    favorite_mood: 2.0,
    preferred_artist: 4.0,
    preferred_language: 3.0,
};

impl Default for ScoringWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

/// Scores candidates of one pool against one profile
///
/// Every candidate gets the sum of its matched weights plus a popularity
/// share in `[0, 1]` relative to the most popular song of the pool.
pub struct Scorer<'a> {
    weights: &'a ScoringWeights,
    profile: &'a TasteProfile,
    max_popularity: i64,
}

impl<'a> Scorer<'a> {
    pub fn new(weights: &'a ScoringWeights, profile: &'a TasteProfile, pool: &[Song]) -> Self {
        let max_popularity = pool
            .iter()
            .map(|s| s.popularity)
            .max()
            .unwrap_or(0)
            .max(1);

        Self {
            weights,
            profile,
            max_popularity,
        }
    }

    pub fn score(&self, song: Song) -> Candidate {
        let weights = self.weights;
        let profile = self.profile;

        let mut score = 0.0;
        // Highest-priority match wins; later matches only add points
        let mut reason: Option<Reason> = None;
        let mut matched = |points: f64, make_reason: &dyn Fn() -> Reason| {
            score += points;
            if reason.is_none() {
                reason = Some(make_reason());
            }
        };

        let favorite_artist = profile.favorite_artist_ids.contains(&song.artist_id);
        if favorite_artist {
            matched(weights.favorite_artist, &|| Reason::FavoriteArtist);
        }
        if profile.favorite_genres.contains(&song.genre) {
            matched(weights.favorite_genre, &|| {
                Reason::FavoriteGenre(song.genre.clone())
            });
        }
        if profile.favorite_moods.contains(&song.mood) {
            matched(weights.favorite_mood, &|| Reason::FavoriteMood);
        }
        if !favorite_artist && profile.preferred_artist_ids.contains(&song.artist_id) {
            matched(weights.preferred_artist, &|| Reason::PreferredArtist);
        }
        if profile.preferred_languages.contains(&song.language) {
            matched(weights.preferred_language, &|| {
                Reason::PreferredLanguage(song.language.clone())
            });
        }

        score += song.popularity.max(0) as f64 / self.max_popularity as f64;

        Candidate {
            song,
            score,
            reason: reason.unwrap_or(Reason::Popular),
        }
    }

    pub fn score_all(&self, pool: Vec<Song>) -> Vec<Candidate> {
        pool.into_iter().map(|song| self.score(song)).collect()
    }
}
