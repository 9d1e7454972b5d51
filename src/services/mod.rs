pub mod error;
pub mod movie_service;
pub mod poster_store;
pub mod user_service;

pub use error::{ServiceError, ServiceResult};
pub use movie_service::MovieService;
pub use poster_store::{PosterStore, POSTER_CONTENT_TYPE};
pub use user_service::{Credentials, PasswordChange, UserService};
