use crate::{
    db::{CandidateFilter, CatalogReader, SignalPredicate},
    error::AppResult,
    models::{Song, SongId},
};

use super::signals::TasteProfile;

/// Bounds on candidate retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalPolicy {
    /// Row cap for the signal-matched query
    pub primary_pool_cap: u32,
    /// Row cap for the popularity fallback
    pub fallback_pool_cap: u32,
    /// Fallback runs when the primary pool is smaller than this
    pub min_candidates: u32,
}

impl RetrievalPolicy {
    /// Primary pool size below which popular songs are added
    ///
    /// Never less than the requested page size, so a first page is full
    /// whenever the catalog can supply it (page sizes are capped at
    /// `fallback_pool_cap` by configuration).
    pub fn fallback_threshold(&self, page_size: u32) -> usize {
        self.min_candidates.max(page_size) as usize
    }
}

impl Default for RetrievalPolicy {
    fn default() -> Self {
        Self {
            primary_pool_cap: 100,
            fallback_pool_cap: 20,
            min_candidates: 10,
        }
    }
}

/// Builds the OR-filter over all non-empty signal dimensions
pub fn build_filter(profile: &TasteProfile) -> CandidateFilter {
    CandidateFilter::excluding(profile.favorite_song_ids.clone())
        .or(SignalPredicate::ArtistIn(profile.target_artist_ids.clone()))
        .or(SignalPredicate::LanguageIn(
            profile.preferred_languages.clone(),
        ))
        .or(SignalPredicate::GenreIn(profile.favorite_genres.clone()))
        .or(SignalPredicate::MoodIn(profile.favorite_moods.clone()))
}

/// Fetches the candidate pool: signal matches first, popular songs after
///
/// A user without signals gets a vacuous filter, so the whole pool comes from
/// the popularity fallback.
pub async fn retrieve_candidates(
    reader: &mut dyn CatalogReader,
    profile: &TasteProfile,
    policy: &RetrievalPolicy,
    page_size: u32,
) -> AppResult<Vec<Song>> {
    let filter = build_filter(profile);

    let mut candidates = if filter.is_vacuous() {
        Vec::new()
    } else {
        reader
            .fetch_matching_songs(&filter, policy.primary_pool_cap)
            .await?
    };
    candidates.retain(|s| !profile.favorite_song_ids.contains(&s.id));

    let primary_count = candidates.len();

    if primary_count < policy.fallback_threshold(page_size) {
        let exclude: Vec<SongId> = profile
            .favorite_song_ids
            .iter()
            .copied()
            .chain(candidates.iter().map(|s| s.id))
            .collect();

        let mut fallback = reader
            .fetch_popular_songs(&exclude, policy.fallback_pool_cap)
            .await?;
        fallback.retain(|s| !exclude.contains(&s.id));

        tracing::debug!(
            primary = primary_count,
            fallback = fallback.len(),
            "Primary pool below threshold, added popular songs"
        );

        candidates.extend(fallback);
    }

    tracing::debug!(
        predicates = filter.any_of.len(),
        primary = primary_count,
        total = candidates.len(),
        "Candidate pool retrieved"
    );

    Ok(candidates)
}
