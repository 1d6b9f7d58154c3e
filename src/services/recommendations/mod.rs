use std::time::Instant;

use crate::{
    db::{CatalogReader, CatalogStore},
    error::{AppError, AppResult},
    models::{Candidate, Page, UserId},
};

pub mod pagination;
pub mod ranking;
pub mod retrieval;
pub mod scoring;
pub mod signals;

pub use pagination::{paginate, PageRequest};
pub use ranking::rank_and_dedupe;
pub use retrieval::{build_filter, retrieve_candidates, RetrievalPolicy};
pub use scoring::{Scorer, ScoringWeights, DEFAULT_WEIGHTS};
pub use signals::{extract_profile, TasteProfile};

/// Personalized song recommendations
///
/// Each call runs signal extraction, candidate retrieval, scoring, ranking and
/// pagination in sequence against one catalog snapshot. Nothing is shared
/// between calls besides the fixed policy and weights.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    policy: RetrievalPolicy,
    weights: ScoringWeights,
}

impl RecommendationEngine {
    pub fn new(policy: RetrievalPolicy, weights: ScoringWeights) -> Self {
        Self { policy, weights }
    }

    pub fn policy(&self) -> &RetrievalPolicy {
        &self.policy
    }

    /// Opens a catalog snapshot and computes one page of recommendations
    #[tracing::instrument(skip_all, fields(user_id = %user_id, store = store.name()))]
    pub async fn get_recommendations(
        &self,
        store: &dyn CatalogStore,
        user_id: UserId,
        request: PageRequest,
    ) -> AppResult<Page<Candidate>> {
        let mut reader = store.begin_read().await?;
        self.recommend(reader.as_mut(), user_id, request).await
    }

    /// Computes one page of recommendations from an open reader
    pub async fn recommend(
        &self,
        reader: &mut dyn CatalogReader,
        user_id: UserId,
        request: PageRequest,
    ) -> AppResult<Page<Candidate>> {
        let start = Instant::now();

        let user = reader
            .fetch_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let favorites = reader.fetch_songs_by_ids(&user.favorite_song_ids).await?;
        let profile = extract_profile(&user, &favorites);

        tracing::info!(
            favorites = profile.favorite_song_ids.len(),
            target_artists = profile.target_artist_ids.len(),
            languages = profile.preferred_languages.len(),
            cold_start = !profile.has_signals(),
            "Extracted taste profile"
        );

        let pool = retrieve_candidates(reader, &profile, &self.policy, request.limit()).await?;

        let scorer = Scorer::new(&self.weights, &profile, &pool);
        let ranked = rank_and_dedupe(scorer.score_all(pool));
        let page = paginate(ranked, request);

        tracing::info!(
            total_count = page.total_count,
            page = page.page_number,
            total_pages = page.total_pages,
            returned = page.items.len(),
            processing_time_ms = start.elapsed().as_millis(),
            "Recommendations computed"
        );

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryCatalog, MockCatalogReader};
    use crate::models::{Reason, Song, UserRecord};
    use std::collections::HashSet;
    use uuid::Uuid;

    fn song(artist_id: Uuid, genre: &str, language: &str, popularity: i64) -> Song {
        Song {
            id: Uuid::new_v4(),
            title: format!("{} {}", genre, popularity),
            genre: genre.to_string(),
            mood: "Neutral".to_string(),
            language: language.to_string(),
            artist_id,
            album_id: Uuid::new_v4(),
            popularity,
            artist_name: Some("Artist".to_string()),
            album_title: Some("Album".to_string()),
        }
    }

    fn first_page() -> PageRequest {
        PageRequest::new(1, 100).unwrap()
    }

    /// A catalog with a rock-loving user and a mix of matching and unrelated songs
    async fn seeded_catalog() -> (MemoryCatalog, UserRecord) {
        let catalog = MemoryCatalog::new();
        let artist_a = Uuid::new_v4();

        let favorites: Vec<Song> = [40, 30]
            .into_iter()
            .map(|popularity| Song {
                mood: "Angry".to_string(),
                ..song(artist_a, "Rock", "German", popularity)
            })
            .collect();
        catalog.insert_songs(favorites.clone()).await;

        catalog
            .insert_songs([
                song(artist_a, "Pop", "English", 80),
                song(Uuid::new_v4(), "Rock", "French", 20),
                song(Uuid::new_v4(), "Jazz", "English", 5),
                song(Uuid::new_v4(), "Metal", "Swedish", 100),
                song(Uuid::new_v4(), "Folk", "Irish", 0),
            ])
            .await;

        let user = UserRecord::new(Uuid::new_v4())
            .with_favorites(favorites.iter().map(|s| s.id))
            .with_preferred_languages(["English"]);
        catalog.insert_user(user.clone()).await;

        (catalog, user)
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let catalog = MemoryCatalog::new();
        let engine = RecommendationEngine::default();

        let result = engine
            .get_recommendations(&catalog, Uuid::new_v4(), first_page())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_favorites_never_recommended() {
        let (catalog, user) = seeded_catalog().await;
        let engine = RecommendationEngine::default();

        let page = engine
            .get_recommendations(&catalog, user.id, first_page())
            .await
            .unwrap();

        assert!(!page.items.is_empty());
        for candidate in &page.items {
            assert!(!user.favorite_song_ids.contains(&candidate.song.id));
            assert!(candidate.score >= 0.0);
        }
    }

    #[tokio::test]
    async fn test_results_are_unique_and_ranked() {
        let (catalog, user) = seeded_catalog().await;
        let engine = RecommendationEngine::default();

        let page = engine
            .get_recommendations(&catalog, user.id, first_page())
            .await
            .unwrap();

        let ids: HashSet<Uuid> = page.items.iter().map(|c| c.song.id).collect();
        assert_eq!(ids.len(), page.items.len());
        assert_eq!(page.total_count, page.items.len());
        assert!(page.items.windows(2).all(|w| w[0].score >= w[1].score));

        // Favorite artist + English + 80/100 popularity
        let top = &page.items[0];
        assert_eq!(top.song.genre, "Pop");
        assert!((top.score - 8.8).abs() < 1e-9);
        assert_eq!(top.reason, Reason::FavoriteArtist);
    }

    #[tokio::test]
    async fn test_repeated_calls_are_identical() {
        let (catalog, user) = seeded_catalog().await;
        let engine = RecommendationEngine::default();

        let first = engine
            .get_recommendations(&catalog, user.id, first_page())
            .await
            .unwrap();
        let second = engine
            .get_recommendations(&catalog, user.id, first_page())
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_cold_start_is_popularity_only() {
        let catalog = MemoryCatalog::new();
        let songs: Vec<Song> = (0..30)
            .map(|i| song(Uuid::new_v4(), "Pop", "English", i * 3))
            .collect();
        catalog.insert_songs(songs).await;
        let user = UserRecord::new(Uuid::new_v4());
        catalog.insert_user(user.clone()).await;

        let engine = RecommendationEngine::default();
        let page = engine
            .get_recommendations(&catalog, user.id, first_page())
            .await
            .unwrap();

        assert_eq!(page.total_count, engine.policy().fallback_pool_cap as usize);
        assert!(page.items.iter().all(|c| c.reason == Reason::Popular));
        assert!(page
            .items
            .windows(2)
            .all(|w| w[0].song.popularity >= w[1].song.popularity));
        assert_eq!(page.items[0].song.popularity, 87);
    }

    #[tokio::test]
    async fn test_cold_start_small_catalog_returns_everything() {
        let catalog = MemoryCatalog::new();
        catalog
            .insert_songs((0..4).map(|i| song(Uuid::new_v4(), "Pop", "English", i)))
            .await;
        let user = UserRecord::new(Uuid::new_v4());
        catalog.insert_user(user.clone()).await;

        let page = RecommendationEngine::default()
            .get_recommendations(&catalog, user.id, first_page())
            .await
            .unwrap();

        assert_eq!(page.total_count, 4);
    }

    #[tokio::test]
    async fn test_sparse_signals_are_topped_up_with_popular_songs() {
        let catalog = MemoryCatalog::new();
        let niche = song(Uuid::new_v4(), "Polka", "Czech", 1);
        catalog.insert_song(niche.clone()).await;
        catalog
            .insert_songs((0..5).map(|i| song(Uuid::new_v4(), "Pop", "English", 50 + i)))
            .await;
        let user = UserRecord::new(Uuid::new_v4()).with_preferred_languages(["Czech"]);
        catalog.insert_user(user.clone()).await;

        let page = RecommendationEngine::default()
            .get_recommendations(&catalog, user.id, first_page())
            .await
            .unwrap();

        assert_eq!(page.total_count, 6);
        assert_eq!(page.items[0].song.id, niche.id);
        assert_eq!(page.items[0].reason, Reason::PreferredLanguage("Czech".to_string()));
        assert!(page.items[1..].iter().all(|c| c.reason == Reason::Popular));
    }

    #[tokio::test]
    async fn test_pagination_metadata() {
        let catalog = MemoryCatalog::new();
        catalog
            .insert_songs((0..25).map(|i| song(Uuid::new_v4(), "Pop", "English", i)))
            .await;
        let user = UserRecord::new(Uuid::new_v4()).with_preferred_languages(["English"]);
        catalog.insert_user(user.clone()).await;
        let engine = RecommendationEngine::default();

        let third = engine
            .get_recommendations(&catalog, user.id, PageRequest::new(3, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(third.items.len(), 5);
        assert_eq!(third.total_pages, 3);
        assert_eq!(third.total_count, 25);

        let fourth = engine
            .get_recommendations(&catalog, user.id, PageRequest::new(4, 10).unwrap())
            .await
            .unwrap();
        assert!(fourth.items.is_empty());
        assert_eq!(fourth.total_pages, 3);
    }

    #[tokio::test]
    async fn test_store_failure_yields_no_page() {
        let user = UserRecord::new(Uuid::new_v4()).with_preferred_languages(["English"]);
        let user_id = user.id;

        let mut reader = MockCatalogReader::new();
        reader
            .expect_fetch_user()
            .returning(move |_| Ok(Some(user.clone())));
        reader
            .expect_fetch_songs_by_ids()
            .returning(|_| Ok(Vec::new()));
        reader
            .expect_fetch_matching_songs()
            .returning(|_, _| Err(sqlx::Error::PoolTimedOut.into()));

        let result = RecommendationEngine::default()
            .recommend(&mut reader, user_id, first_page())
            .await;

        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_user_lookup_failure_stops_pipeline() {
        let mut reader = MockCatalogReader::new();
        reader
            .expect_fetch_user()
            .returning(|_| Err(sqlx::Error::PoolClosed.into()));
        reader.expect_fetch_songs_by_ids().never();
        reader.expect_fetch_matching_songs().never();
        reader.expect_fetch_popular_songs().never();

        let result = RecommendationEngine::default()
            .recommend(&mut reader, Uuid::new_v4(), first_page())
            .await;

        assert!(result.is_err());
    }
}
