use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::{
    db::{CandidateFilter, CatalogReader, CatalogStore, SignalPredicate},
    error::AppResult,
    models::{Song, SongId, UserId, UserRecord},
};

const SONG_SELECT: &str = r#"
    SELECT s.id, s.title, s.genre, s.mood, s.language, s.artist_id, s.album_id, s.popularity,
           ar.name AS artist_name, al.title AS album_title
    FROM songs s
    LEFT JOIN artists ar ON ar.id = s.artist_id
    LEFT JOIN albums al ON al.id = s.album_id
"#;

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Catalog store backed by PostgreSQL
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalogStore {
    async fn begin_read(&self) -> AppResult<Box<dyn CatalogReader>> {
        let mut tx = self.pool.begin().await?;

        // Every read of this request observes the same snapshot
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        Ok(Box::new(PgCatalogReader { tx }))
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

/// Snapshot reader; the transaction is rolled back when dropped
pub struct PgCatalogReader {
    tx: Transaction<'static, Postgres>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    favorite_song_ids: Vec<Uuid>,
    preferred_artist_ids: Vec<Uuid>,
    preferred_languages: Vec<String>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            favorite_song_ids: row.favorite_song_ids,
            preferred_artist_ids: row.preferred_artist_ids,
            preferred_languages: row.preferred_languages,
        }
    }
}

fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &SignalPredicate) {
    match predicate {
        SignalPredicate::ArtistIn(ids) => {
            builder.push("s.artist_id = ANY(");
            builder.push_bind(ids.iter().copied().collect::<Vec<Uuid>>());
        }
        SignalPredicate::LanguageIn(values) => {
            builder.push("s.language = ANY(");
            builder.push_bind(values.iter().cloned().collect::<Vec<String>>());
        }
        SignalPredicate::GenreIn(values) => {
            builder.push("s.genre = ANY(");
            builder.push_bind(values.iter().cloned().collect::<Vec<String>>());
        }
        SignalPredicate::MoodIn(values) => {
            builder.push("s.mood = ANY(");
            builder.push_bind(values.iter().cloned().collect::<Vec<String>>());
        }
    }
    builder.push(")");
}

/// Songs outside `filter.exclude` matching any of its predicates, ordered by id
fn matching_songs_query(filter: &CandidateFilter, limit: u32) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(SONG_SELECT);
    builder.push(" WHERE NOT (s.id = ANY(");
    builder.push_bind(filter.exclude.iter().copied().collect::<Vec<Uuid>>());
    builder.push(")) AND (");
    for (i, predicate) in filter.any_of.iter().enumerate() {
        if i > 0 {
            builder.push(" OR ");
        }
        push_predicate(&mut builder, predicate);
    }
    builder.push(") ORDER BY s.id LIMIT ");
    builder.push_bind(i64::from(limit));
    builder
}

fn popular_songs_query(exclude: &[SongId], limit: u32) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(SONG_SELECT);
    builder.push(" WHERE NOT (s.id = ANY(");
    builder.push_bind(exclude.to_vec());
    builder.push(")) ORDER BY s.popularity DESC, s.id ASC LIMIT ");
    builder.push_bind(i64::from(limit));
    builder
}

#[async_trait::async_trait]
impl CatalogReader for PgCatalogReader {
    async fn fetch_user(&mut self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT u.id,
                   ARRAY(SELECT f.song_id FROM user_favorites f
                         WHERE f.user_id = u.id ORDER BY f.created_at, f.song_id) AS favorite_song_ids,
                   ARRAY(SELECT pa.artist_id FROM user_preferred_artists pa
                         WHERE pa.user_id = u.id ORDER BY pa.artist_id) AS preferred_artist_ids,
                   ARRAY(SELECT pl.language FROM user_preferred_languages pl
                         WHERE pl.user_id = u.id ORDER BY pl.language) AS preferred_languages
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(UserRecord::from))
    }

    async fn fetch_songs_by_ids(&mut self, ids: &[SongId]) -> AppResult<Vec<Song>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Postgres>::new(SONG_SELECT);
        builder.push(" WHERE s.id = ANY(");
        builder.push_bind(ids.to_vec());
        builder.push(") ORDER BY s.id");

        let songs = builder
            .build_query_as::<Song>()
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(songs)
    }

    async fn fetch_matching_songs(
        &mut self,
        filter: &CandidateFilter,
        limit: u32,
    ) -> AppResult<Vec<Song>> {
        if filter.is_vacuous() {
            return Ok(Vec::new());
        }

        let mut builder = matching_songs_query(filter, limit);

        let songs = builder
            .build_query_as::<Song>()
            .fetch_all(&mut *self.tx)
            .await?;

        tracing::debug!(
            predicates = filter.any_of.len(),
            excluded = filter.exclude.len(),
            rows = songs.len(),
            "Fetched signal-matched songs"
        );

        Ok(songs)
    }

    async fn fetch_popular_songs(
        &mut self,
        exclude: &[SongId],
        limit: u32,
    ) -> AppResult<Vec<Song>> {
        let mut builder = popular_songs_query(exclude, limit);

        let songs = builder
            .build_query_as::<Song>()
            .fetch_all(&mut *self.tx)
            .await?;

        tracing::debug!(
            excluded = exclude.len(),
            rows = songs.len(),
            "Fetched popular songs"
        );

        Ok(songs)
    }
}
