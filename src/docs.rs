// docs.rs - OpenAPI document and the interactive documentation page
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::database::models::{Movie, MovieInput};
use crate::handlers::{protected, public};
use crate::services::{Credentials, PasswordChange};
use crate::types::Genre;

pub const DOCUMENTATION_PATH: &str = "/documentation";
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "movies-api", description = "Movie catalogue with user accounts and poster images"),
    paths(
        public::root,
        public::ping,
        public::users::register::register_post,
        public::users::login::login_post,
        public::movies::list::movies_get,
        public::movies::poster::poster_get,
        protected::users::session::logout_post,
        protected::users::session::logout_all_post,
        protected::users::me::me_get,
        protected::users::me::me_patch,
        protected::users::me::me_delete,
        protected::movies::create::movies_post,
        protected::movies::record::movie_patch,
        protected::movies::record::movie_delete,
        protected::movies::poster::poster_post,
        protected::movies::poster::poster_delete,
    ),
    components(schemas(Movie, MovieInput, Genre, Credentials, PasswordChange)),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "users", description = "Accounts and bearer tokens"),
        (name = "movies", description = "Catalogue records"),
        (name = "posters", description = "Poster images")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme referenced by protected routes
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new(DOCUMENTATION_PATH).url(OPENAPI_PATH, ApiDoc::openapi())
}
