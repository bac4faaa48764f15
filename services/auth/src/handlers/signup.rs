use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use datn_domain::user::UserRole;

use crate::domain::types::Identity;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::signup::{
    ForgotPasswordUseCase, RegisterInput, RegisterUseCase, ResendVerificationUseCase,
    ResetPasswordInput, ResetPasswordUseCase, VerifyEmailInput, VerifyEmailUseCase,
};

#[derive(Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub enabled: bool,
}

impl From<Identity> for UserSummary {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            email: identity.email,
            name: identity.name,
            role: identity.role,
            enabled: identity.enabled,
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// ── POST /register ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserSummary>), AuthServiceError> {
    let usecase = RegisterUseCase {
        identities: state.identity_repo(),
    };
    let identity = usecase
        .execute(RegisterInput {
            email: body.email,
            password: body.password,
            name: body.name,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(identity.into())))
}

// ── POST /resend?email= ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResendQuery {
    pub email: String,
}

pub async fn resend(
    State(state): State<AppState>,
    Query(query): Query<ResendQuery>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let usecase = ResendVerificationUseCase {
        identities: state.identity_repo(),
        codes: state.verification_code_repo(),
    };
    usecase.execute(&query.email).await?;
    Ok(Json(MessageResponse {
        message: "verification code sent",
    }))
}

// ── POST /verify ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

pub async fn verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let usecase = VerifyEmailUseCase {
        identities: state.identity_repo(),
        codes: state.verification_code_repo(),
    };
    usecase
        .execute(VerifyEmailInput {
            email: body.email,
            code: body.code,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /forgot ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ForgotRequest {
    pub email: String,
}

pub async fn forgot(
    State(state): State<AppState>,
    Json(body): Json<ForgotRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let usecase = ForgotPasswordUseCase {
        identities: state.identity_repo(),
        codes: state.verification_code_repo(),
    };
    usecase.execute(&body.email).await?;
    Ok(Json(MessageResponse {
        message: "password reset code sent",
    }))
}

// ── POST /reset ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

pub async fn reset(
    State(state): State<AppState>,
    Json(body): Json<ResetRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let usecase = ResetPasswordUseCase {
        identities: state.identity_repo(),
        codes: state.verification_code_repo(),
    };
    usecase
        .execute(ResetPasswordInput {
            email: body.email,
            code: body.code,
            new_password: body.new_password,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
