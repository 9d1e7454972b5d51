// handlers/public/movies/mod.rs - Read-only catalogue access

pub mod list;   // GET /movies
pub mod poster; // GET /movies/:id/poster

pub use list::movies_get;
pub use poster::poster_get;
