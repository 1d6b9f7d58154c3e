use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::{CandidateFilter, CatalogReader, CatalogStore},
    error::AppResult,
    models::{Song, SongId, UserId, UserRecord},
};

/// In-memory catalog, used for tests and local demos
#[derive(Clone, Default)]
pub struct MemoryCatalog {
    inner: Arc<RwLock<CatalogData>>,
}

#[derive(Clone, Default)]
struct CatalogData {
    songs: Vec<Song>,
    users: HashMap<UserId, UserRecord>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a song, replacing any song with the same id
    pub async fn insert_song(&self, song: Song) {
        let mut inner = self.inner.write().await;
        match inner.songs.iter_mut().find(|s| s.id == song.id) {
            Some(existing) => *existing = song,
            None => inner.songs.push(song),
        }
    }

    pub async fn insert_songs(&self, songs: impl IntoIterator<Item = Song>) {
        for song in songs {
            self.insert_song(song).await;
        }
    }

    pub async fn insert_user(&self, user: UserRecord) {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.id, user);
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryCatalog {
    async fn begin_read(&self) -> AppResult<Box<dyn CatalogReader>> {
        let snapshot = self.inner.read().await.clone();
        Ok(Box::new(MemoryReader { snapshot }))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Owned copy of the catalog taken when the read began
struct MemoryReader {
    snapshot: CatalogData,
}

impl MemoryReader {
    fn sorted_by_id(mut songs: Vec<Song>) -> Vec<Song> {
        songs.sort_by_key(|s| s.id);
        songs
    }
}

#[async_trait::async_trait]
impl CatalogReader for MemoryReader {
    async fn fetch_user(&mut self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self.snapshot.users.get(&user_id).cloned())
    }

    async fn fetch_songs_by_ids(&mut self, ids: &[SongId]) -> AppResult<Vec<Song>> {
        let songs = self
            .snapshot
            .songs
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect();
        Ok(Self::sorted_by_id(songs))
    }

    async fn fetch_matching_songs(
        &mut self,
        filter: &CandidateFilter,
        limit: u32,
    ) -> AppResult<Vec<Song>> {
        if filter.is_vacuous() {
            return Ok(Vec::new());
        }

        let matching = self
            .snapshot
            .songs
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();

        Ok(Self::sorted_by_id(matching)
            .into_iter()
            .take(limit as usize)
            .collect())
    }

    async fn fetch_popular_songs(
        &mut self,
        exclude: &[SongId],
        limit: u32,
    ) -> AppResult<Vec<Song>> {
        let mut songs: Vec<Song> = self
            .snapshot
            .songs
            .iter()
            .filter(|s| !exclude.contains(&s.id))
            .cloned()
            .collect();

        songs.sort_by(|a, b| b.popularity.cmp(&a.popularity).then(a.id.cmp(&b.id)));
        songs.truncate(limit as usize);

        Ok(songs)
    }
}
