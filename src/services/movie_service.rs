use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::database::models::{Movie, MovieInput};
use crate::database::{MovieRepository, RecordStore};
use crate::filter::{MovieFilter, MovieQuery};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::poster_store::PosterStore;
use crate::types::RecordId;

/// Catalogue rules: title uniqueness, partial updates and the poster lifecycle
#[derive(Clone)]
pub struct MovieService {
    store: Arc<dyn RecordStore>,
    posters: PosterStore,
    max_poster_bytes: usize,
}

impl MovieService {
    pub fn new(store: Arc<dyn RecordStore>, posters: PosterStore, max_poster_bytes: usize) -> Self {
        Self {
            store,
            posters,
            max_poster_bytes,
        }
    }

    pub fn posters(&self) -> &PosterStore {
        &self.posters
    }

    pub fn max_poster_bytes(&self) -> usize {
        self.max_poster_bytes
    }

    fn validate_input(input: &MovieInput) -> ServiceResult<()> {
        if matches!(&input.title, Some(title) if title.trim().is_empty()) {
            return Err(ServiceError::field("title", "Title must not be empty"));
        }
        if matches!(&input.plot, Some(plot) if plot.trim().is_empty()) {
            return Err(ServiceError::field("plot", "Plot must not be empty"));
        }
        Ok(())
    }

    async fn load(&self, id: &RecordId) -> ServiceResult<Movie> {
        self.store
            .find_movie(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Movie not found".to_string()))
    }

    pub async fn create(&self, input: MovieInput, creator: &RecordId) -> ServiceResult<Movie> {
        Self::validate_input(&input)?;
        let Some(title) = input.title.clone() else {
            return Err(ServiceError::field("title", "Title is required"));
        };

        if self.store.find_movie_by_title(&title).await?.is_some() {
            return Err(ServiceError::Conflict("A movie with this title already exists".to_string()));
        }

        let mut movie = Movie::new(title, Some(creator.clone()));
        movie.apply(input);
        movie.updated_at = movie.created_at;
        self.store.insert_movie(&movie).await?;

        info!("Created movie '{}' ({}) for user {}", movie.title, movie.id, creator);
        Ok(movie)
    }

    /// Apply the fields present in `input`. A changed title must still be unique.
    pub async fn update(&self, id: &RecordId, input: MovieInput) -> ServiceResult<Movie> {
        Self::validate_input(&input)?;
        self.load(id).await?;

        if let Some(title) = &input.title {
            if let Some(other) = self.store.find_movie_by_title(title).await? {
                if &other.id != id {
                    return Err(ServiceError::Conflict(
                        "A movie with this title already exists".to_string(),
                    ));
                }
            }
        }

        let movie = self
            .store
            .update_movie(id, &input)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Movie not found".to_string()))?;

        debug!("Updated movie {}", movie.id);
        Ok(movie)
    }

    /// Delete the record, then its poster file. A poster cleanup failure is logged
    /// and does not undo the deletion.
    pub async fn remove(&self, id: &RecordId) -> ServiceResult<Movie> {
        let movie = self.load(id).await?;
        if !self.store.delete_movie(id).await? {
            return Err(ServiceError::NotFound("Movie not found".to_string()));
        }

        match self.posters.remove(id).await {
            Ok(true) => debug!("Removed poster file for deleted movie {}", id),
            Ok(false) => {}
            Err(e) => warn!("Movie {} deleted but its poster file could not be removed: {}", id, e),
        }

        info!("Deleted movie '{}' ({})", movie.title, movie.id);
        Ok(movie)
    }

    /// Store a poster. The file only becomes visible once the record carries the
    /// same bytes; any failure before that leaves the previous poster in place.
    pub async fn attach_poster(&self, id: &RecordId, bytes: &[u8]) -> ServiceResult<Movie> {
        let previous = self.load(id).await?.poster;
        if bytes.len() > self.max_poster_bytes {
            return Err(ServiceError::PayloadTooLarge {
                size: bytes.len(),
                limit: self.max_poster_bytes,
            });
        }
        if bytes.is_empty() {
            return Err(ServiceError::validation("Poster image must not be empty"));
        }

        let staged = self.posters.stage(id, bytes).await?;
        match self.store.set_poster(id, Some(bytes)).await {
            Ok(true) => {}
            Ok(false) => {
                // Deleted while uploading
                staged.discard().await;
                return Err(ServiceError::NotFound("Movie not found".to_string()));
            }
            Err(e) => {
                staged.discard().await;
                return Err(e.into());
            }
        }

        if let Err(e) = self.posters.commit(staged).await {
            if let Err(restore) = self.store.set_poster(id, previous.as_deref()).await {
                warn!("Could not restore poster column for movie {}: {}", id, restore);
            }
            return Err(e.into());
        }

        info!("Stored {} byte poster for movie {}", bytes.len(), id);
        self.load(id).await
    }

    pub async fn fetch_poster(&self, id: &RecordId) -> ServiceResult<Vec<u8>> {
        self.load(id).await?;
        self.posters
            .read(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("This movie has no poster".to_string()))
    }

    pub async fn remove_poster(&self, id: &RecordId) -> ServiceResult<Movie> {
        self.load(id).await?;
        if !self.posters.remove(id).await? {
            return Err(ServiceError::NotFound("This movie has no poster".to_string()));
        }
        if !self.store.set_poster(id, None).await? {
            return Err(ServiceError::NotFound("Movie not found".to_string()));
        }

        info!("Removed poster for movie {}", id);
        self.load(id).await
    }

    /// Filtered listing. An empty vector is the "nothing matched" result, not an error.
    pub async fn list(&self, query: &MovieQuery) -> ServiceResult<Vec<Movie>> {
        let filter = MovieFilter::new(query)
            .map_err(|e| ServiceError::field(e.field(), e.to_string()))?;
        let movies = self.store.list_movies().await?;
        Ok(filter.apply(movies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{PosterWriteFailingStore, TestContext};
    use crate::types::Genre;

    fn input(title: &str, genre: Option<Genre>) -> MovieInput {
        MovieInput {
            title: Some(title.to_string()),
            plot: None,
            genre,
        }
    }

    async fn seeded(ctx: &TestContext) -> Vec<Movie> {
        let creator = RecordId::generate();
        let mut movies = Vec::new();
        for (title, genre) in [
            ("Alien: el octavo pasajero", Genre::Terror),
            ("Booksmart", Genre::Comedia),
            ("Star Wars: A New Hope", Genre::Accion),
        ] {
            movies.push(ctx.movies.create(input(title, Some(genre)), &creator).await.unwrap());
        }
        movies
    }

    #[tokio::test]
    async fn create_requires_non_empty_unique_title() {
        let ctx = TestContext::new();
        let creator = RecordId::generate();

        let missing = ctx.movies.create(MovieInput::default(), &creator).await;
        assert!(matches!(missing, Err(ServiceError::Validation { .. })));

        let blank = ctx.movies.create(input("  ", None), &creator).await;
        assert!(matches!(blank, Err(ServiceError::Validation { .. })));

        let movie = ctx.movies.create(input("Barry Lyndon", None), &creator).await.unwrap();
        assert_eq!(movie.creator.as_ref(), Some(&creator));

        let again = ctx.movies.create(input("Barry Lyndon", None), &creator).await;
        assert!(matches!(again, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_applies_present_fields_only() {
        let ctx = TestContext::new();
        let movies = seeded(&ctx).await;
        let booksmart = &movies[1];

        let patch = MovieInput {
            plot: Some("Two overachievers cram four years of fun into one night".to_string()),
            ..Default::default()
        };
        let updated = ctx.movies.update(&booksmart.id, patch).await.unwrap();
        assert_eq!(updated.title, "Booksmart");
        assert_eq!(updated.genre, Some(Genre::Comedia));
        assert!(updated.plot.is_some());
    }

    #[tokio::test]
    async fn update_to_taken_title_conflicts() {
        let ctx = TestContext::new();
        let movies = seeded(&ctx).await;

        let err = ctx
            .movies
            .update(&movies[1].id, input("Star Wars: A New Hope", None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // Re-sending the current title is not a conflict
        assert!(ctx.movies.update(&movies[1].id, input("Booksmart", None)).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let ctx = TestContext::new();
        let id = RecordId::generate();

        assert!(matches!(ctx.movies.update(&id, input("X", None)).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(ctx.movies.remove(&id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(ctx.movies.attach_poster(&id, b"jpeg").await, Err(ServiceError::NotFound(_))));
        assert!(matches!(ctx.movies.fetch_poster(&id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(ctx.movies.remove_poster(&id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn poster_lifecycle() {
        let ctx = TestContext::new();
        let movie = seeded(&ctx).await.remove(0);

        assert!(matches!(ctx.movies.fetch_poster(&movie.id).await, Err(ServiceError::NotFound(_))));

        let stored = ctx.movies.attach_poster(&movie.id, b"\xff\xd8jpeg").await.unwrap();
        assert!(stored.has_poster());
        assert_eq!(ctx.movies.fetch_poster(&movie.id).await.unwrap(), b"\xff\xd8jpeg");

        let cleared = ctx.movies.remove_poster(&movie.id).await.unwrap();
        assert!(!cleared.has_poster());
        assert!(matches!(ctx.movies.fetch_poster(&movie.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(ctx.movies.remove_poster(&movie.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn oversize_poster_writes_nothing() {
        let ctx = TestContext::new();
        let movie = seeded(&ctx).await.remove(0);
        let payload = vec![0u8; ctx.movies.max_poster_bytes() + 1];

        let err = ctx.movies.attach_poster(&movie.id, &payload).await.unwrap_err();
        assert!(matches!(err, ServiceError::PayloadTooLarge { .. }));
        assert!(!ctx.movies.posters().exists(&movie.id).await.unwrap());
    }

    #[tokio::test]
    async fn remove_deletes_poster_file() {
        let ctx = TestContext::new();
        let movie = seeded(&ctx).await.remove(0);
        ctx.movies.attach_poster(&movie.id, b"jpeg").await.unwrap();

        ctx.movies.remove(&movie.id).await.unwrap();
        assert!(!ctx.movies.posters().exists(&movie.id).await.unwrap());
        assert!(ctx.store.find_movie(&movie.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_seeded_catalogue() {
        let ctx = TestContext::new();
        seeded(&ctx).await;

        let all = ctx.movies.list(&MovieQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let alien = ctx
            .movies
            .list(&MovieQuery {
                name: Some("alien".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(alien.len(), 1);
        assert_eq!(alien[0].title, "Alien: el octavo pasajero");

        let none = ctx
            .movies
            .list(&MovieQuery {
                genre: Some("comedia".to_string()),
                name: Some("alien".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.is_empty());

        let limited = ctx
            .movies
            .list(&MovieQuery {
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);

        let skipped = ctx
            .movies
            .list(&MovieQuery {
                skip: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(skipped.len(), 2);
        assert_eq!(skipped[0].title, "Booksmart");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_patch_and_poster_upload_both_persist() {
        let ctx = TestContext::new();
        let creator = RecordId::generate();

        for round in 0..50 {
            let movie = ctx
                .movies
                .create(input(&format!("Solaris {}", round), None), &creator)
                .await
                .unwrap();
            let plot = format!("Ocean planet, take {}", round);

            let patch = {
                let movies = ctx.movies.clone();
                let id = movie.id.clone();
                let plot = plot.clone();
                tokio::spawn(async move {
                    let changes = MovieInput {
                        plot: Some(plot),
                        ..Default::default()
                    };
                    movies.update(&id, changes).await
                })
            };
            let upload = {
                let movies = ctx.movies.clone();
                let id = movie.id.clone();
                tokio::spawn(async move { movies.attach_poster(&id, b"jpeg").await })
            };
            patch.await.unwrap().unwrap();
            upload.await.unwrap().unwrap();

            let stored = ctx.store.find_movie(&movie.id).await.unwrap().unwrap();
            assert_eq!(stored.plot.as_deref(), Some(plot.as_str()));
            assert!(stored.has_poster(), "poster lost in round {}", round);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_patches_of_different_fields_both_persist() {
        let ctx = TestContext::new();
        let creator = RecordId::generate();

        for round in 0..50 {
            let movie = ctx
                .movies
                .create(input(&format!("Stalker {}", round), None), &creator)
                .await
                .unwrap();
            let title = format!("Stalker (1979) {}", round);

            let retitle = {
                let movies = ctx.movies.clone();
                let id = movie.id.clone();
                let title = title.clone();
                tokio::spawn(async move { movies.update(&id, input(&title, None)).await })
            };
            let regenre = {
                let movies = ctx.movies.clone();
                let id = movie.id.clone();
                tokio::spawn(async move {
                    let changes = MovieInput {
                        genre: Some(Genre::Drama),
                        ..Default::default()
                    };
                    movies.update(&id, changes).await
                })
            };
            retitle.await.unwrap().unwrap();
            regenre.await.unwrap().unwrap();

            let stored = ctx.store.find_movie(&movie.id).await.unwrap().unwrap();
            assert_eq!(stored.title, title);
            assert_eq!(stored.genre, Some(Genre::Drama));
        }
    }

    #[tokio::test]
    async fn failed_poster_write_leaves_no_file() {
        let ctx = TestContext::with_store(Arc::new(PosterWriteFailingStore::default()));
        let movie = ctx
            .movies
            .create(input("Nosferatu", None), &RecordId::generate())
            .await
            .unwrap();

        let err = ctx.movies.attach_poster(&movie.id, b"jpeg").await.unwrap_err();
        assert!(matches!(err, ServiceError::Database(_)));
        assert!(!ctx.movies.posters().exists(&movie.id).await.unwrap());
        assert!(matches!(ctx.movies.fetch_poster(&movie.id).await, Err(ServiceError::NotFound(_))));

        let poster_dir = ctx.movies.posters().path_for(&movie.id);
        let leftovers = std::fs::read_dir(poster_dir.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn bad_query_is_a_validation_error() {
        let ctx = TestContext::new();
        let err = ctx
            .movies
            .list(&MovieQuery {
                letter: Some("ab".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }
}
