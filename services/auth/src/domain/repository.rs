#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{
    CodePurpose, ExternalProfile, Identity, NewRating, OutboxEvent, Rating, VerificationCode,
};
use crate::error::AuthServiceError;

/// Store of identities. Implementations stamp `updated_at` on every write.
pub trait IdentityRepository: Send + Sync {
    /// Look up by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AuthServiceError>;

    /// Insert a new identity. Fails with [`AuthServiceError::EmailTaken`] on a
    /// duplicate email.
    async fn create(&self, identity: &Identity) -> Result<(), AuthServiceError>;

    /// Insert a new identity with its first verification code and the outbox
    /// event announcing it, in one transaction. Fails with
    /// [`AuthServiceError::EmailTaken`] on a duplicate email and writes nothing.
    async fn register(
        &self,
        identity: &Identity,
        code: &VerificationCode,
        event: &OutboxEvent,
    ) -> Result<(), AuthServiceError>;

    /// Overwrite the stored refresh token (`None` ends the session).
    async fn set_refresh_token(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<(), AuthServiceError>;

    /// Replace the stored refresh token only if it still equals `current`.
    /// Returns `false` when another request rotated or cleared it first.
    async fn swap_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, AuthServiceError>;

    async fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<(), AuthServiceError>;

    /// Store a new password hash and clear the refresh token in one write.
    async fn reset_password(&self, id: Uuid, password_hash: &str)
    -> Result<(), AuthServiceError>;
}

/// Repository for one-time verification and password-reset codes.
pub trait VerificationCodeRepository: Send + Sync {
    /// Count active (unused and unexpired) codes for a user and purpose.
    async fn count_active(
        &self,
        user_id: Uuid,
        purpose: CodePurpose,
    ) -> Result<u64, AuthServiceError>;

    /// Insert a code and the outbox event announcing it in one transaction.
    async fn create_with_outbox(
        &self,
        code: &VerificationCode,
        event: &OutboxEvent,
    ) -> Result<(), AuthServiceError>;

    /// Find a valid (unused, unexpired) code by user + purpose + code string.
    async fn find_valid(
        &self,
        user_id: Uuid,
        purpose: CodePurpose,
        code: &str,
    ) -> Result<Option<VerificationCode>, AuthServiceError>;

    /// Mark a code as used (sets used_at = now) if it is still unused.
    /// Returns `false` when another request consumed it first.
    async fn mark_used(&self, id: Uuid) -> Result<bool, AuthServiceError>;
}

/// Client for the external identity provider (Google userinfo).
pub trait ExternalIdentityPort: Send + Sync {
    /// Resolve a third-party bearer token to a profile. Any failure, including
    /// a non-200 answer, is [`AuthServiceError::ExternalAuth`].
    async fn fetch_profile(&self, access_token: &str)
    -> Result<ExternalProfile, AuthServiceError>;
}

/// Store of ratings. Audit fields are assigned here, from the explicit actor.
pub trait RatingRepository: Send + Sync {
    /// Insert `rating`, stamping `created_at`/`created_by` with `actor`.
    /// Returns the stored rating.
    async fn create(&self, rating: NewRating, actor: &str) -> Result<Rating, AuthServiceError>;

    /// Set the admin response, stamping `updated_at`/`updated_by` with `actor`.
    /// Returns `None` if the rating does not exist.
    async fn respond(
        &self,
        id: Uuid,
        response: &str,
        actor: &str,
    ) -> Result<Option<Rating>, AuthServiceError>;

    /// Ratings for a product, newest first.
    async fn list_by_product(&self, product_id: i64) -> Result<Vec<Rating>, AuthServiceError>;
}
