use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Movie, MovieInput, MovieRow, User, UserRow};
use crate::database::repository::{MovieRepository, RecordStore, UserRepository};
use crate::types::RecordId;

const USER_COLUMNS: &str = "id, username, password_hash, tokens, created_at, updated_at";
const MOVIE_COLUMNS: &str = "id, title, plot, genre, creator, poster, created_at, updated_at";
// Listings never carry poster bytes
const LISTING_COLUMNS: &str =
    "id, title, plot, genre, creator, NULL::BYTEA AS poster, created_at, updated_at";

/// PostgreSQL-backed record store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn user_from_row(row: UserRow) -> Result<User, DatabaseError> {
        User::try_from(row).map_err(|e| DatabaseError::QueryError(e.to_string()))
    }

    fn movie_from_row(row: MovieRow) -> Result<Movie, DatabaseError> {
        Movie::try_from(row).map_err(DatabaseError::QueryError)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO users (id, username, password_hash, tokens, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id.as_str())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.tokens)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_insert(e, "username"))?;
        Ok(())
    }

    async fn find_user(&self, id: &RecordId) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Self::user_from_row)
            .transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .map(Self::user_from_row)
            .transpose()
    }

    async fn find_user_with_token(
        &self,
        id: &RecordId,
        token: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = $1 AND $2 = ANY(tokens)",
            USER_COLUMNS
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_str())
            .bind(token)
            .fetch_optional(&self.pool)
            .await?
            .map(Self::user_from_row)
            .transpose()
    }

    async fn push_token(&self, id: &RecordId, token: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET tokens = array_append(tokens, $2), updated_at = $3 WHERE id = $1",
        )
        .bind(id.as_str())
        .bind(token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn pull_token(&self, id: &RecordId, token: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET tokens = array_remove(tokens, $2), updated_at = $3 WHERE id = $1",
        )
        .bind(id.as_str())
        .bind(token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_tokens(&self, id: &RecordId) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE users SET tokens = '{}', updated_at = $2 WHERE id = $1")
            .bind(id.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_password(&self, id: &RecordId, password_hash: &str) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(id.as_str())
            .bind(password_hash)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: &RecordId) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MovieRepository for PgStore {
    async fn insert_movie(&self, movie: &Movie) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO movies (id, title, plot, genre, creator, poster, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(movie.id.as_str())
        .bind(&movie.title)
        .bind(&movie.plot)
        .bind(movie.genre.map(|g| g.as_str()))
        .bind(movie.creator.as_ref().map(|c| c.as_str()))
        .bind(&movie.poster)
        .bind(movie.created_at)
        .bind(movie.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_insert(e, "title"))?;
        Ok(())
    }

    async fn find_movie(&self, id: &RecordId) -> Result<Option<Movie>, DatabaseError> {
        let sql = format!("SELECT {} FROM movies WHERE id = $1", MOVIE_COLUMNS);
        sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Self::movie_from_row)
            .transpose()
    }

    async fn find_movie_by_title(&self, title: &str) -> Result<Option<Movie>, DatabaseError> {
        let sql = format!("SELECT {} FROM movies WHERE title = $1", MOVIE_COLUMNS);
        sqlx::query_as::<_, MovieRow>(&sql)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?
            .map(Self::movie_from_row)
            .transpose()
    }

    async fn list_movies(&self) -> Result<Vec<Movie>, DatabaseError> {
        let sql = format!("SELECT {} FROM movies ORDER BY created_at, id", LISTING_COLUMNS);
        sqlx::query_as::<_, MovieRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Self::movie_from_row)
            .collect()
    }

    async fn update_movie(
        &self,
        id: &RecordId,
        changes: &MovieInput,
    ) -> Result<Option<Movie>, DatabaseError> {
        let sql = format!(
            "UPDATE movies
             SET title = COALESCE($2, title),
                 plot = COALESCE($3, plot),
                 genre = COALESCE($4, genre),
                 updated_at = $5
             WHERE id = $1
             RETURNING {}",
            MOVIE_COLUMNS
        );
        sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id.as_str())
            .bind(changes.title.as_deref())
            .bind(changes.plot.as_deref())
            .bind(changes.genre.map(|g| g.as_str()))
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_insert(e, "title"))?
            .map(Self::movie_from_row)
            .transpose()
    }

    async fn set_poster(&self, id: &RecordId, poster: Option<&[u8]>) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE movies SET poster = $2, updated_at = $3 WHERE id = $1")
            .bind(id.as_str())
            .bind(poster)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_movie(&self, id: &RecordId) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl RecordStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::types::Genre;
    use tokio::sync::OnceCell;

    static SCHEMA_READY: OnceCell<()> = OnceCell::const_new();

    /// Runs against the database named by `DATABASE_URL`; skipped when unset
    async fn store() -> Option<PgStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let config = DatabaseConfig {
            url: Some(url),
            max_connections: 5,
            connection_timeout: 5,
        };
        let pool = DatabaseManager::connect(&config).await.unwrap();
        SCHEMA_READY
            .get_or_init(|| async { DatabaseManager::ensure_schema(&pool).await.unwrap() })
            .await;
        Some(PgStore::new(pool))
    }

    fn unique(name: &str) -> String {
        format!("{}-{}", name, RecordId::generate())
    }

    #[tokio::test]
    async fn rejects_duplicate_usernames() {
        let Some(store) = store().await else { return };
        let username = unique("jomarch");
        let first = User::new(username.clone(), "h1");
        store.insert_user(&first).await.unwrap();

        let err = store.insert_user(&User::new(username.clone(), "h2")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate("username")));

        let found = store.find_user_by_username(&username).await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.password_hash, "h1");

        assert!(store.delete_user(&first.id).await.unwrap());
        assert!(store.find_user(&first.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn token_list_updates() {
        let Some(store) = store().await else { return };
        let user = User::new(unique("elizabethbennet"), "hash");
        store.insert_user(&user).await.unwrap();

        assert!(store.push_token(&user.id, "a").await.unwrap());
        assert!(store.push_token(&user.id, "b").await.unwrap());
        let found = store.find_user_with_token(&user.id, "a").await.unwrap().unwrap();
        assert_eq!(found.tokens, ["a", "b"]);

        store.pull_token(&user.id, "a").await.unwrap();
        assert!(store.find_user_with_token(&user.id, "a").await.unwrap().is_none());
        assert!(store.find_user_with_token(&user.id, "b").await.unwrap().is_some());

        store.clear_tokens(&user.id).await.unwrap();
        assert!(store.find_user_with_token(&user.id, "b").await.unwrap().is_none());

        assert!(!store.push_token(&RecordId::generate(), "c").await.unwrap());
        store.delete_user(&user.id).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_duplicate_titles_on_insert_and_update() {
        let Some(store) = store().await else { return };
        let alien = Movie::new(unique("Alien"), None);
        let booksmart = Movie::new(unique("Booksmart"), None);
        store.insert_movie(&alien).await.unwrap();
        store.insert_movie(&booksmart).await.unwrap();

        let err = store.insert_movie(&Movie::new(alien.title.clone(), None)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate("title")));

        let changes = MovieInput {
            title: Some(alien.title.clone()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_movie(&booksmart.id, &changes).await,
            Err(DatabaseError::Duplicate("title"))
        ));
        assert!(store
            .update_movie(&RecordId::generate(), &changes)
            .await
            .unwrap()
            .is_none());

        store.delete_movie(&alien.id).await.unwrap();
        store.delete_movie(&booksmart.id).await.unwrap();
    }

    #[tokio::test]
    async fn list_preserves_insertion_order_without_posters() {
        let Some(store) = store().await else { return };
        let mut inserted = Vec::new();
        for title in ["Alien", "Booksmart", "Star Wars"] {
            let movie = Movie::new(unique(title), None);
            store.insert_movie(&movie).await.unwrap();
            store.set_poster(&movie.id, Some(b"jpeg")).await.unwrap();
            inserted.push(movie);
        }

        let listed: Vec<_> = store
            .list_movies()
            .await
            .unwrap()
            .into_iter()
            .filter(|m| inserted.iter().any(|i| i.id == m.id))
            .collect();
        let ids: Vec<_> = listed.iter().map(|m| m.id.clone()).collect();
        let expected: Vec<_> = inserted.iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids, expected);
        assert!(listed.iter().all(|m| m.poster.is_none()));

        for movie in inserted {
            store.delete_movie(&movie.id).await.unwrap();
        }
    }

    #[tokio::test]
    async fn update_and_poster_writes_touch_separate_fields() {
        let Some(store) = store().await else { return };
        let creator = RecordId::generate();
        let mut movie = Movie::new(unique("Paprika"), Some(creator.clone()));
        movie.genre = Some(Genre::Drama);
        store.insert_movie(&movie).await.unwrap();

        assert!(store.set_poster(&movie.id, Some(b"jpeg")).await.unwrap());
        let changes = MovieInput {
            plot: Some("A dream detective".to_string()),
            ..Default::default()
        };
        let updated = store.update_movie(&movie.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.title, movie.title);
        assert_eq!(updated.genre, Some(Genre::Drama));
        assert_eq!(updated.creator, Some(creator));
        assert_eq!(updated.poster.as_deref(), Some(&b"jpeg"[..]));

        assert!(store.set_poster(&movie.id, None).await.unwrap());
        let stored = store.find_movie(&movie.id).await.unwrap().unwrap();
        assert_eq!(stored.plot.as_deref(), Some("A dream detective"));
        assert!(stored.poster.is_none());

        assert!(store.delete_movie(&movie.id).await.unwrap());
        assert!(!store.set_poster(&movie.id, None).await.unwrap());
    }
}
