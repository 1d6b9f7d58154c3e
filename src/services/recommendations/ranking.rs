use std::collections::HashSet;

use crate::models::Candidate;

/// Orders candidates by score and drops repeated songs
///
/// Ties on score fall back to raw popularity, then to pool order (the sort is
/// stable). Only the first, highest-ranked occurrence of a song id survives.
pub fn rank_and_dedupe(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.song.popularity.cmp(&a.song.popularity))
    });

    let mut seen = HashSet::with_capacity(candidates.len());
    candidates.retain(|c| seen.insert(c.song.id));
    candidates
}
