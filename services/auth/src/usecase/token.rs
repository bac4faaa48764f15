use jsonwebtoken::{EncodingKey, Header, encode};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use uuid::Uuid;

use datn_auth_types::token::{AccessClaims, RefreshClaims, SessionClaims, TokenVerifier};
use datn_domain::user::normalize_email;

use crate::domain::repository::IdentityRepository;
use crate::domain::types::{Identity, TokenPair};
use crate::error::AuthServiceError;
use crate::usecase::password::verify_password;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

// ── TokenIssuer ───────────────────────────────────────────────────────────────

/// Mints and validates access/refresh token pairs.
///
/// Holds only read-only key material; storing the refresh token against the
/// identity is the caller's job (see [`rotate_refresh_token`]).
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    verifier: TokenVerifier,
    access_ttl: u64,
    refresh_ttl: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, access_ttl: u64, refresh_ttl: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            verifier: TokenVerifier::new(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn refresh_ttl(&self) -> u64 {
        self.refresh_ttl
    }

    fn sign<T: serde::Serialize>(&self, claims: &T) -> Result<String, AuthServiceError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| AuthServiceError::Internal(e.into()))
    }

    /// Issue a fresh pair for a verified identity. Disabled identities get nothing.
    pub fn issue_tokens(&self, identity: &Identity) -> Result<TokenPair, AuthServiceError> {
        if !identity.enabled {
            return Err(AuthServiceError::AccountDisabled);
        }

        let iat = now_secs();
        let access_token_exp = iat + self.access_ttl;
        let refresh_token_exp = iat + self.refresh_ttl;

        let access_token = self.sign(&AccessClaims {
            sub: identity.id.to_string(),
            user: identity.session_claims(),
            iat,
            exp: access_token_exp,
        })?;
        let refresh_token = self.sign(&RefreshClaims {
            sub: identity.id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat,
            exp: refresh_token_exp,
        })?;

        Ok(TokenPair {
            access_token,
            access_token_exp,
            refresh_token,
            refresh_token_exp,
        })
    }

    pub fn validate_access_token(&self, token: &str) -> Result<SessionClaims, AuthServiceError> {
        Ok(self.verifier.verify_access(token)?)
    }

    /// Check signature and expiry and return the subject. The stored-token
    /// comparison is [`TokenIssuer::check_refresh_token`].
    pub fn validate_refresh_token(&self, token: &str) -> Result<Uuid, AuthServiceError> {
        let claims = self.verifier.verify_refresh(token)?;
        claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| AuthServiceError::InvalidToken)
    }

    /// A refresh token is live only while it equals the value stored for its identity.
    pub fn check_refresh_token(identity: &Identity, presented: &str) -> Result<(), AuthServiceError> {
        match identity.refresh_token.as_deref() {
            Some(stored) if stored == presented => Ok(()),
            _ => Err(AuthServiceError::RevokedToken),
        }
    }
}

/// Overwrite the identity's stored refresh token: a new value on login,
/// `None` on logout. Any previously issued refresh token stops working.
pub async fn rotate_refresh_token<R: IdentityRepository>(
    identities: &R,
    identity_id: Uuid,
    token: Option<&str>,
) -> Result<(), AuthServiceError> {
    identities.set_refresh_token(identity_id, token).await
}

/// Result of every flow that opens or renews a session.
#[derive(Debug)]
pub struct SessionOutput {
    pub user: SessionClaims,
    pub tokens: TokenPair,
}

/// Issue a pair for `identity` and make its refresh token the live one.
pub(crate) async fn open_session<R: IdentityRepository>(
    identities: &R,
    issuer: &TokenIssuer,
    identity: &Identity,
) -> Result<SessionOutput, AuthServiceError> {
    let tokens = issuer.issue_tokens(identity)?;
    rotate_refresh_token(identities, identity.id, Some(&tokens.refresh_token)).await?;
    Ok(SessionOutput {
        user: identity.session_claims(),
        tokens,
    })
}

// ── Login ─────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub username: String,
    pub password: String,
}

pub struct LoginUseCase<R: IdentityRepository> {
    pub identities: R,
    pub issuer: TokenIssuer,
}

impl<R: IdentityRepository> LoginUseCase<R> {
    pub async fn execute(&self, input: LoginInput) -> Result<SessionOutput, AuthServiceError> {
        let email = normalize_email(&input.username);

        // Unknown email and wrong password are indistinguishable to the caller.
        let identity = self
            .identities
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;
        if !verify_password(&input.password, &identity.password_hash)? {
            return Err(AuthServiceError::InvalidCredentials);
        }

        let out = open_session(&self.identities, &self.issuer, &identity).await?;
        info!(user_id = %identity.id, "login");
        Ok(out)
    }
}

// ── RefreshToken ─────────────────────────────────────────────────────────────

pub struct RefreshTokenUseCase<R: IdentityRepository> {
    pub identities: R,
    pub issuer: TokenIssuer,
}

impl<R: IdentityRepository> RefreshTokenUseCase<R> {
    pub async fn execute(
        &self,
        refresh_token_value: &str,
    ) -> Result<SessionOutput, AuthServiceError> {
        let user_id = self.issuer.validate_refresh_token(refresh_token_value)?;

        let identity = self
            .identities
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::InvalidToken)?;

        if let Err(e) = TokenIssuer::check_refresh_token(&identity, refresh_token_value) {
            warn!(user_id = %identity.id, "stale refresh token presented");
            return Err(e);
        }

        let tokens = self.issuer.issue_tokens(&identity)?;

        // Compare-and-swap: of two concurrent refreshes with the same token,
        // only one rotates; the other sees a revoked token.
        let swapped = self
            .identities
            .swap_refresh_token(identity.id, refresh_token_value, &tokens.refresh_token)
            .await?;
        if !swapped {
            warn!(user_id = %identity.id, "refresh token rotated concurrently");
            return Err(AuthServiceError::RevokedToken);
        }

        info!(user_id = %identity.id, "refresh");
        Ok(SessionOutput {
            user: identity.session_claims(),
            tokens,
        })
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<R: IdentityRepository> {
    pub identities: R,
}

impl<R: IdentityRepository> LogoutUseCase<R> {
    pub async fn execute(&self, session: &SessionClaims) -> Result<(), AuthServiceError> {
        rotate_refresh_token(&self.identities, session.id, None).await?;
        info!(user_id = %session.id, "logout");
        Ok(())
    }
}
