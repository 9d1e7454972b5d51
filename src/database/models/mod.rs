pub mod movie;
pub mod user;

pub use movie::{Movie, MovieInput, MovieRow};
pub use user::{User, UserRow};
