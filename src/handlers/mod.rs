// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (live bearer token required)
pub mod protected; // Routes wrapped in require_auth
pub mod public;    // Anonymous access

/// Parse a movie id from the path, reporting a malformed id as a 400
pub(crate) fn parse_id(raw: &str) -> Result<crate::types::RecordId, crate::error::ApiError> {
    Ok(crate::types::RecordId::parse(raw)?)
}
