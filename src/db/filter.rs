use std::collections::BTreeSet;

use crate::models::{ArtistId, Song, SongId};

/// One signal dimension a candidate may match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalPredicate {
    ArtistIn(BTreeSet<ArtistId>),
    LanguageIn(BTreeSet<String>),
    GenreIn(BTreeSet<String>),
    MoodIn(BTreeSet<String>),
}

impl SignalPredicate {
    pub fn matches(&self, song: &Song) -> bool {
        match self {
            SignalPredicate::ArtistIn(ids) => ids.contains(&song.artist_id),
            SignalPredicate::LanguageIn(languages) => languages.contains(&song.language),
            SignalPredicate::GenreIn(genres) => genres.contains(&song.genre),
            SignalPredicate::MoodIn(moods) => moods.contains(&song.mood),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            SignalPredicate::ArtistIn(ids) => ids.is_empty(),
            SignalPredicate::LanguageIn(values)
            | SignalPredicate::GenreIn(values)
            | SignalPredicate::MoodIn(values) => values.is_empty(),
        }
    }
}

/// Songs matching at least one predicate, minus the excluded ids
///
/// An empty `any_of` is the vacuous filter: it matches nothing, and stores
/// answer it without issuing a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    pub any_of: Vec<SignalPredicate>,
    pub exclude: BTreeSet<SongId>,
}

impl CandidateFilter {
    pub fn excluding(exclude: BTreeSet<SongId>) -> Self {
        Self {
            any_of: Vec::new(),
            exclude,
        }
    }

    /// Adds a predicate unless its value set is empty
    pub fn or(mut self, predicate: SignalPredicate) -> Self {
        if !predicate.is_empty() {
            self.any_of.push(predicate);
        }
        self
    }

    pub fn is_vacuous(&self) -> bool {
        self.any_of.is_empty()
    }

    pub fn matches(&self, song: &Song) -> bool {
        !self.exclude.contains(&song.id) && self.any_of.iter().any(|p| p.matches(song))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn song(artist_id: ArtistId, genre: &str, mood: &str, language: &str) -> Song {
        Song {
            id: Uuid::new_v4(),
            title: "Test".to_string(),
            genre: genre.to_string(),
            mood: mood.to_string(),
            language: language.to_string(),
            artist_id,
            album_id: Uuid::new_v4(),
            popularity: 0,
            artist_name: None,
            album_title: None,
        }
    }

    #[test]
    fn test_empty_predicates_are_dropped() {
        let filter = CandidateFilter::default()
            .or(SignalPredicate::ArtistIn(BTreeSet::new()))
            .or(SignalPredicate::GenreIn(BTreeSet::new()));
        assert!(filter.is_vacuous());
    }

    #[test]
    fn test_single_dimension_is_enough() {
        let filter = CandidateFilter::default()
            .or(SignalPredicate::GenreIn(BTreeSet::from(["Rock".to_string()])))
            .or(SignalPredicate::LanguageIn(BTreeSet::from([
                "Hindi".to_string()
            ])));

        assert!(filter.matches(&song(Uuid::new_v4(), "Rock", "Sad", "English")));
        assert!(filter.matches(&song(Uuid::new_v4(), "Jazz", "Sad", "Hindi")));
        assert!(!filter.matches(&song(Uuid::new_v4(), "Jazz", "Sad", "English")));
    }

    #[test]
    fn test_excluded_ids_never_match() {
        let artist = Uuid::new_v4();
        let excluded = song(artist, "Rock", "Happy", "English");
        let filter = CandidateFilter::excluding(BTreeSet::from([excluded.id]))
            .or(SignalPredicate::ArtistIn(BTreeSet::from([artist])));

        assert!(!filter.matches(&excluded));
        assert!(filter.matches(&song(artist, "Rock", "Happy", "English")));
    }

    #[test]
    fn test_vacuous_filter_matches_nothing() {
        let filter = CandidateFilter::default();
        assert!(!filter.matches(&song(Uuid::new_v4(), "Rock", "Happy", "English")));
    }
}
