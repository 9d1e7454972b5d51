// handlers/protected/users/mod.rs - The caller's sessions and account

pub mod me;      // GET|PATCH|DELETE /users/me
pub mod session; // POST /users/logout, POST /users/logoutAll

pub use me::{me_delete, me_get, me_patch};
pub use session::{logout_all_post, logout_post};
