// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind require_auth, which places an AuthContext
// (resolved user plus the raw token) in the request extensions.

pub mod movies; // Catalogue writes and poster management
pub mod users;  // Session and account management for the caller
