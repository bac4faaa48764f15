use chrono::{Duration, Utc};
use rand::RngExt;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use datn_domain::user::{UserRole, is_plausible_email, normalize_email};

use crate::domain::repository::{IdentityRepository, VerificationCodeRepository};
use crate::domain::types::{
    CODE_LEN, CODE_TTL_SECS, CodePurpose, Identity, MAX_ACTIVE_CODES, MIN_PASSWORD_LEN,
    OutboxEvent, VerificationCode,
};
use crate::error::AuthServiceError;
use crate::usecase::password::hash_password;

/// Charset for generating random codes (uppercase alphanumeric).
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

fn check_password(password: &str) -> Result<(), AuthServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthServiceError::WeakPassword);
    }
    Ok(())
}

/// Build a fresh code for `identity` together with the outbox event that asks
/// the mailer to deliver it.
fn new_code(identity: &Identity, purpose: CodePurpose) -> (VerificationCode, OutboxEvent) {
    let now = Utc::now();
    let code = VerificationCode {
        id: Uuid::new_v4(),
        user_id: identity.id,
        purpose,
        code: generate_code(),
        expires_at: now + Duration::seconds(CODE_TTL_SECS),
        used_at: None,
        created_at: now,
    };

    let kind = purpose.event_kind();
    let event = OutboxEvent {
        id: Uuid::new_v4(),
        user_id: identity.id,
        kind: kind.to_owned(),
        payload: json!({
            "email": identity.email,
            "name": identity.name,
            "code": code.code,
            "expiresAt": code.expires_at,
        }),
        idempotency_key: format!("{kind}:{}", code.id),
    };
    (code, event)
}

/// Write a fresh code for an existing identity, up to the active-code cap.
async fn issue_code<C: VerificationCodeRepository>(
    codes: &C,
    identity: &Identity,
    purpose: CodePurpose,
) -> Result<(), AuthServiceError> {
    let active = codes.count_active(identity.id, purpose).await?;
    if active >= MAX_ACTIVE_CODES {
        return Err(AuthServiceError::TooManyVerificationCodes);
    }
    let (code, event) = new_code(identity, purpose);
    codes.create_with_outbox(&code, &event).await
}

/// Resolve a normalized email to an identity, or 404.
async fn identity_by_email<R: IdentityRepository>(
    identities: &R,
    email: &str,
) -> Result<Identity, AuthServiceError> {
    identities
        .find_by_email(&normalize_email(email))
        .await?
        .ok_or(AuthServiceError::UserNotFound)
}

/// Consume a valid code of `purpose` for `identity`. Of two requests racing on
/// the same code only one gets past `mark_used`.
async fn redeem_code<C: VerificationCodeRepository>(
    codes: &C,
    identity: &Identity,
    purpose: CodePurpose,
    code: &str,
) -> Result<(), AuthServiceError> {
    let found = codes
        .find_valid(identity.id, purpose, code.trim())
        .await?
        .ok_or(AuthServiceError::InvalidVerificationCode)?;
    if !codes.mark_used(found.id).await? {
        return Err(AuthServiceError::InvalidVerificationCode);
    }
    Ok(())
}

// ── Register ──────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub struct RegisterUseCase<R: IdentityRepository> {
    pub identities: R,
}

impl<R: IdentityRepository> RegisterUseCase<R> {
    /// Create a disabled identity and queue its activation code. Both land in
    /// one write, so a lost duplicate-email race leaves no orphan code.
    pub async fn execute(&self, input: RegisterInput) -> Result<Identity, AuthServiceError> {
        let email = normalize_email(&input.email);
        if !is_plausible_email(&email) {
            return Err(AuthServiceError::InvalidEmail);
        }
        check_password(&input.password)?;

        if self.identities.find_by_email(&email).await?.is_some() {
            return Err(AuthServiceError::EmailTaken);
        }

        let name = match input.name.trim() {
            "" => email.split('@').next().unwrap_or_default().to_owned(),
            name => name.to_owned(),
        };
        let now = Utc::now();
        let identity = Identity {
            id: Uuid::new_v4(),
            email,
            name,
            role: UserRole::User,
            enabled: false,
            password_hash: hash_password(&input.password)?,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        let (code, event) = new_code(&identity, CodePurpose::Verify);
        self.identities.register(&identity, &code, &event).await?;

        info!(user_id = %identity.id, "registered");
        Ok(identity)
    }
}

// ── Resend ────────────────────────────────────────────────────────────────────

pub struct ResendVerificationUseCase<R, C>
where
    R: IdentityRepository,
    C: VerificationCodeRepository,
{
    pub identities: R,
    pub codes: C,
}

impl<R, C> ResendVerificationUseCase<R, C>
where
    R: IdentityRepository,
    C: VerificationCodeRepository,
{
    pub async fn execute(&self, email: &str) -> Result<(), AuthServiceError> {
        let identity = identity_by_email(&self.identities, email).await?;
        if identity.enabled {
            return Err(AuthServiceError::AlreadyVerified);
        }
        issue_code(&self.codes, &identity, CodePurpose::Verify).await?;
        info!(user_id = %identity.id, "verification code resent");
        Ok(())
    }
}

// ── Verify ────────────────────────────────────────────────────────────────────

pub struct VerifyEmailInput {
    pub email: String,
    pub code: String,
}

pub struct VerifyEmailUseCase<R, C>
where
    R: IdentityRepository,
    C: VerificationCodeRepository,
{
    pub identities: R,
    pub codes: C,
}

impl<R, C> VerifyEmailUseCase<R, C>
where
    R: IdentityRepository,
    C: VerificationCodeRepository,
{
    pub async fn execute(&self, input: VerifyEmailInput) -> Result<(), AuthServiceError> {
        let identity = identity_by_email(&self.identities, &input.email).await?;
        if identity.enabled {
            return Err(AuthServiceError::AlreadyVerified);
        }
        redeem_code(&self.codes, &identity, CodePurpose::Verify, &input.code).await?;
        self.identities.set_enabled(identity.id, true).await?;
        info!(user_id = %identity.id, "email verified");
        Ok(())
    }
}

// ── Forgot ────────────────────────────────────────────────────────────────────

pub struct ForgotPasswordUseCase<R, C>
where
    R: IdentityRepository,
    C: VerificationCodeRepository,
{
    pub identities: R,
    pub codes: C,
}

impl<R, C> ForgotPasswordUseCase<R, C>
where
    R: IdentityRepository,
    C: VerificationCodeRepository,
{
    pub async fn execute(&self, email: &str) -> Result<(), AuthServiceError> {
        let identity = identity_by_email(&self.identities, email).await?;
        issue_code(&self.codes, &identity, CodePurpose::Reset).await?;
        info!(user_id = %identity.id, "password reset requested");
        Ok(())
    }
}

// ── Reset ─────────────────────────────────────────────────────────────────────

pub struct ResetPasswordInput {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<R, C>
where
    R: IdentityRepository,
    C: VerificationCodeRepository,
{
    pub identities: R,
    pub codes: C,
}

impl<R, C> ResetPasswordUseCase<R, C>
where
    R: IdentityRepository,
    C: VerificationCodeRepository,
{
    /// Set a new password and end the live session, if any.
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), AuthServiceError> {
        check_password(&input.new_password)?;
        let identity = identity_by_email(&self.identities, &input.email).await?;
        redeem_code(&self.codes, &identity, CodePurpose::Reset, &input.code).await?;

        let hash = hash_password(&input.new_password)?;
        self.identities.reset_password(identity.id, &hash).await?;
        info!(user_id = %identity.id, "password reset");
        Ok(())
    }
}
