use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::TokenIssuer;
use crate::database::models::User;
use crate::database::{RecordStore, UserRepository};
use crate::services::error::{ServiceError, ServiceResult};

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 30;

/// Body of signup and login requests
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    #[schema(example = "jomarch")]
    pub username: String,
    pub password: String,
}

/// Body of an authenticated password change
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

/// Account rules: signup, credential checks and the per-user token list
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn RecordStore>,
    tokens: TokenIssuer,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(store: Arc<dyn RecordStore>, tokens: TokenIssuer, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn validate_username(username: &str) -> ServiceResult<()> {
        let length = username.chars().count();
        if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&length) {
            return Err(ServiceError::field(
                "username",
                format!(
                    "Username must be between {} and {} characters long",
                    USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH
                ),
            ));
        }
        Ok(())
    }

    /// Register a new account with a hashed password
    pub async fn create(&self, username: &str, password: &str) -> ServiceResult<User> {
        Self::validate_username(username)?;
        validate_password_strength(password)?;

        if self.store.find_user_by_username(username).await?.is_some() {
            return Err(ServiceError::Conflict("This username is already taken".to_string()));
        }

        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        let user = User::new(username, password_hash);
        // The store enforces uniqueness again, covering signups racing past the check above
        self.store.insert_user(&user).await?;

        info!("Created user {} ({})", user.username, user.id);
        Ok(user)
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<User> {
        let invalid = || ServiceError::Unauthorized("Invalid username or password".to_string());

        let Some(user) = self.store.find_user_by_username(username).await? else {
            debug!("Login rejected: unknown username '{}'", username);
            return Err(invalid());
        };
        if !verify_password(password, &user.password_hash).await? {
            warn!("Login rejected: wrong password for user {}", user.id);
            return Err(invalid());
        }
        Ok(user)
    }

    /// Sign a new token for the user and add it to their live token list.
    /// Tokens in the list that no longer verify are dropped along the way.
    pub async fn issue_token(&self, user: &User) -> ServiceResult<String> {
        let token = self.tokens.issue(&user.id)?;
        if !self.store.push_token(&user.id, &token).await? {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        let stale: Vec<&String> = user
            .tokens
            .iter()
            .filter(|t| self.tokens.verify(t).is_err())
            .collect();
        for old in &stale {
            self.store.pull_token(&user.id, old).await?;
        }
        if !stale.is_empty() {
            debug!("Dropped {} expired tokens for user {}", stale.len(), user.id);
        }

        debug!("Issued token for user {}", user.id);
        Ok(token)
    }

    pub async fn revoke_token(&self, user: &User, token: &str) -> ServiceResult<()> {
        if !self.store.pull_token(&user.id, token).await? {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }
        debug!("Revoked one token for user {}", user.id);
        Ok(())
    }

    pub async fn revoke_all_tokens(&self, user: &User) -> ServiceResult<()> {
        if !self.store.clear_tokens(&user.id).await? {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }
        info!("Revoked all tokens for user {}", user.id);
        Ok(())
    }

    /// Replace the password after re-checking the old one. Issued tokens stay valid.
    pub async fn change_password(
        &self,
        user: &User,
        old_password: &str,
        new_password: &str,
    ) -> ServiceResult<User> {
        if !verify_password(old_password, &user.password_hash).await? {
            warn!("Password change rejected for user {}: old password mismatch", user.id);
            return Err(ServiceError::Unauthorized("The old password is not correct".to_string()));
        }
        validate_password_strength(new_password)?;

        let password_hash = hash_password(new_password, self.bcrypt_cost).await?;
        if !self.store.update_password(&user.id, &password_hash).await? {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        info!("Password changed for user {}", user.id);
        self.store
            .find_user(&user.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// Resolve a bearer token to its user. The token must verify and still be
    /// present in that user's token list.
    pub async fn resolve_token(&self, token: &str) -> ServiceResult<User> {
        let claims = self.tokens.verify(token)?;
        let user_id = claims.user_id()?;

        self.store
            .find_user_with_token(&user_id, token)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Please authenticate".to_string()))
    }

    pub async fn delete(&self, user: &User) -> ServiceResult<()> {
        if !self.store.delete_user(&user.id).await? {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }
        info!("Deleted user {} ({})", user.username, user.id);
        Ok(())
    }
}
