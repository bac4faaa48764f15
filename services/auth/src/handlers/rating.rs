use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use datn_auth_types::session::Session;
use datn_core::serde::{to_rfc3339_ms, to_rfc3339_ms_opt};

use crate::domain::types::Rating;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::rating::{
    CreateRatingInput, CreateRatingUseCase, ListRatingsUseCase, RespondRatingUseCase,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: i64,
    pub content: String,
    pub number_stars: u8,
    pub admin_response: Option<String>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    #[serde(serialize_with = "to_rfc3339_ms_opt")]
    pub updated_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
}

impl From<Rating> for RatingResponse {
    fn from(r: Rating) -> Self {
        let (updated_at, updated_by) = match r.audit.updated {
            Some(stamp) => (Some(stamp.at), Some(stamp.by)),
            None => (None, None),
        };
        Self {
            id: r.id,
            user_id: r.user_id,
            product_id: r.product_id,
            content: r.content,
            number_stars: r.number_stars,
            admin_response: r.admin_response,
            created_at: r.audit.created.at,
            created_by: r.audit.created.by,
            updated_at,
            updated_by,
        }
    }
}

// ── POST /ratings ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatingRequest {
    pub product_id: i64,
    pub content: String,
    pub number_stars: i64,
}

pub async fn create_rating(
    State(state): State<AppState>,
    Session(session): Session,
    Json(body): Json<CreateRatingRequest>,
) -> Result<(StatusCode, Json<RatingResponse>), AuthServiceError> {
    let usecase = CreateRatingUseCase {
        ratings: state.rating_repo(),
    };
    let rating = usecase
        .execute(
            &session,
            CreateRatingInput {
                product_id: body.product_id,
                content: body.content,
                number_stars: body.number_stars,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(rating.into())))
}

// ── GET /ratings?productId= ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRatingsQuery {
    pub product_id: i64,
}

pub async fn list_ratings(
    State(state): State<AppState>,
    Query(query): Query<ListRatingsQuery>,
) -> Result<Json<Vec<RatingResponse>>, AuthServiceError> {
    let usecase = ListRatingsUseCase {
        ratings: state.rating_repo(),
    };
    let ratings = usecase.execute(query.product_id).await?;
    Ok(Json(ratings.into_iter().map(Into::into).collect()))
}

// ── PATCH /ratings/{id} ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRatingRequest {
    pub admin_response: String,
}

pub async fn respond_rating(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<Uuid>,
    Json(body): Json<RespondRatingRequest>,
) -> Result<Json<RatingResponse>, AuthServiceError> {
    let usecase = RespondRatingUseCase {
        ratings: state.rating_repo(),
    };
    let rating = usecase
        .execute(&session, id, &body.admin_response)
        .await?;
    Ok(Json(rating.into()))
}
