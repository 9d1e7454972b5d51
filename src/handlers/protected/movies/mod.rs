// handlers/protected/movies/mod.rs - Catalogue writes
//
// Any authenticated caller may edit or delete any movie; `creator` is recorded
// on create and never checked.

pub mod poster; // POST|DELETE /movies/:id/poster
pub mod record; // PATCH|DELETE /movies/:id
pub mod create; // POST /movies

pub use create::movies_post;
pub use poster::{poster_delete, poster_post};
pub use record::{movie_delete, movie_patch};
