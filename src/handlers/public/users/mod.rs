// handlers/public/users/mod.rs - Account acquisition

pub mod login;    // POST /users/login - check credentials, issue a token
pub mod register; // POST /users - create an account, issue a token

pub use login::login_post;
pub use register::register_post;
