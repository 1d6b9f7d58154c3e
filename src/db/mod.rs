//! Catalog store abstraction
//!
//! The recommendation engine only reads from the catalog. Every read made while
//! serving one request goes through a single `CatalogReader`, so an
//! implementation can pin all of them to one consistent snapshot.

use crate::{
    error::AppResult,
    models::{Song, SongId, UserId, UserRecord},
};

pub mod filter;
pub mod memory;
pub mod postgres;

pub use filter::{CandidateFilter, SignalPredicate};
pub use memory::MemoryCatalog;
pub use postgres::{create_pool, run_migrations, PgCatalogStore};

/// Entry point to the catalog
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Opens a read-only view of the catalog for the duration of one request
    async fn begin_read(&self) -> AppResult<Box<dyn CatalogReader>>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Read queries required by the recommendation engine
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogReader: Send {
    /// Fetch a user's stored taste fields, `None` when the user does not exist
    async fn fetch_user(&mut self, user_id: UserId) -> AppResult<Option<UserRecord>>;

    /// Fetch full song records for the given ids; unknown ids are skipped
    async fn fetch_songs_by_ids(&mut self, ids: &[SongId]) -> AppResult<Vec<Song>>;

    /// Fetch up to `limit` songs matching the filter, ordered by id
    async fn fetch_matching_songs(
        &mut self,
        filter: &CandidateFilter,
        limit: u32,
    ) -> AppResult<Vec<Song>>;

    /// Fetch the `limit` most popular songs not in `exclude`
    ///
    /// Ordered by popularity descending, ties by id ascending.
    async fn fetch_popular_songs(
        &mut self,
        exclude: &[SongId],
        limit: u32,
    ) -> AppResult<Vec<Song>>;
}
