use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use datn_auth_types::token::TokenError;

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account disabled")]
    AccountDisabled,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("refresh token revoked")]
    RevokedToken,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("external authentication failed")]
    ExternalAuth,
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("rating not found")]
    RatingNotFound,
    #[error("email already registered")]
    EmailTaken,
    #[error("account already verified")]
    AlreadyVerified,
    #[error("invalid email")]
    InvalidEmail,
    #[error("password too weak")]
    WeakPassword,
    #[error("invalid verification code")]
    InvalidVerificationCode,
    #[error("invalid rating")]
    InvalidRating,
    #[error("too many verification codes")]
    TooManyVerificationCodes,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountDisabled => "ACCOUNT_DISABLED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::ExpiredToken => "EXPIRED_TOKEN",
            Self::RevokedToken => "REVOKED_TOKEN",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::ExternalAuth => "EXTERNAL_AUTH",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::RatingNotFound => "RATING_NOT_FOUND",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::AlreadyVerified => "ALREADY_VERIFIED",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::InvalidVerificationCode => "INVALID_VERIFICATION_CODE",
            Self::InvalidRating => "INVALID_RATING",
            Self::TooManyVerificationCodes => "TOO_MANY_VERIFICATION_CODES",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials
            | Self::AccountDisabled
            | Self::InvalidToken
            | Self::ExpiredToken
            | Self::ExternalAuth => StatusCode::UNAUTHORIZED,
            Self::RevokedToken | Self::InvalidRefreshToken | Self::Forbidden => {
                StatusCode::FORBIDDEN
            }
            Self::UserNotFound | Self::RatingNotFound => StatusCode::NOT_FOUND,
            Self::EmailTaken | Self::AlreadyVerified => StatusCode::CONFLICT,
            Self::InvalidEmail
            | Self::WeakPassword
            | Self::InvalidVerificationCode
            | Self::InvalidRating => StatusCode::BAD_REQUEST,
            Self::TooManyVerificationCodes => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// On the refresh endpoint a bad or expired refresh token is a 403, not a 401:
    /// the client must sign in again rather than retry.
    pub fn into_refresh_error(self) -> Self {
        match self {
            Self::InvalidToken | Self::ExpiredToken => Self::InvalidRefreshToken,
            other => other,
        }
    }
}

impl From<TokenError> for AuthServiceError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => Self::ExpiredToken,
            TokenError::InvalidSignature | TokenError::Malformed => Self::InvalidToken,
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client errors and TraceLayer already records them.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
