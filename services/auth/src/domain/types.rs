use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use datn_auth_types::token::SessionClaims;
use datn_domain::audit::Audit;
use datn_domain::user::UserRole;

/// Authenticated subject as stored by the auth service.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    /// Normalized (trimmed, lowercase).
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub enabled: bool,
    pub password_hash: String,
    /// The single live refresh token, if a session is active.
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Claims embedded in access tokens for this identity.
    pub fn session_claims(&self) -> SessionClaims {
        SessionClaims {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Access/refresh token pair. Never persisted as such; only the refresh token
/// is stored, against its identity.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub access_token_exp: u64,
    pub refresh_token: String,
    pub refresh_token_exp: u64,
}

/// Profile returned by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    pub email: String,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

impl ExternalProfile {
    /// Display name for a newly created identity. Falls back to the email's
    /// local part when the provider sends no names.
    pub fn display_name(&self) -> String {
        let joined = [self.given_name.as_deref(), self.family_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            self.email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_owned()
        } else {
            joined
        }
    }
}

/// What a one-time code authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodePurpose {
    Verify,
    Reset,
}

impl CodePurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Verify => "verify",
            Self::Reset => "reset",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "verify" => Some(Self::Verify),
            "reset" => Some(Self::Reset),
            _ => None,
        }
    }

    /// Outbox event kind announcing a new code of this purpose.
    pub fn event_kind(self) -> &'static str {
        match self {
            Self::Verify => "verification_code_created",
            Self::Reset => "password_reset_requested",
        }
    }
}

/// One-time code for account activation or password reset.
#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub purpose: CodePurpose,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn is_valid(&self) -> bool {
        self.used_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Outbox event for async delivery by the mailer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

/// Rating content as submitted, before the store assigns its audit fields.
#[derive(Debug, Clone)]
pub struct NewRating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: i64,
    pub content: String,
    pub number_stars: u8,
}

impl NewRating {
    /// The stored form of this rating, created now by `actor`.
    pub fn into_rating(self, actor: &str) -> Rating {
        Rating {
            id: self.id,
            user_id: self.user_id,
            product_id: self.product_id,
            content: self.content,
            number_stars: self.number_stars,
            admin_response: None,
            audit: Audit::created_by(actor),
        }
    }
}

/// Product rating with explicit audit fields.
#[derive(Debug, Clone)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: i64,
    pub content: String,
    pub number_stars: u8,
    pub admin_response: Option<String>,
    pub audit: Audit,
}

/// Maximum number of active (unused, unexpired) codes per user and purpose.
pub const MAX_ACTIVE_CODES: u64 = 5;

/// Code length in characters.
pub const CODE_LEN: usize = 12;

/// Code time-to-live in seconds.
pub const CODE_TTL_SECS: i64 = 600;

/// Minimum password length for registration and reset.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Accepted star range for ratings.
pub const STARS_RANGE: std::ops::RangeInclusive<u8> = 1..=5;
