use tracing::info;
use uuid::Uuid;

use datn_auth_types::token::SessionClaims;

use crate::domain::repository::RatingRepository;
use crate::domain::types::{NewRating, Rating, STARS_RANGE};
use crate::error::AuthServiceError;

// ── Create ────────────────────────────────────────────────────────────────────

pub struct CreateRatingInput {
    pub product_id: i64,
    pub content: String,
    pub number_stars: i64,
}

pub struct CreateRatingUseCase<R: RatingRepository> {
    pub ratings: R,
}

impl<R: RatingRepository> CreateRatingUseCase<R> {
    pub async fn execute(
        &self,
        session: &SessionClaims,
        input: CreateRatingInput,
    ) -> Result<Rating, AuthServiceError> {
        let number_stars = u8::try_from(input.number_stars)
            .ok()
            .filter(|n| STARS_RANGE.contains(n))
            .ok_or(AuthServiceError::InvalidRating)?;
        let content = input.content.trim();
        if content.is_empty() {
            return Err(AuthServiceError::InvalidRating);
        }

        let rating = NewRating {
            id: Uuid::new_v4(),
            user_id: session.id,
            product_id: input.product_id,
            content: content.to_owned(),
            number_stars,
        };
        let stored = self.ratings.create(rating, &session.email).await?;
        info!(rating_id = %stored.id, product_id = stored.product_id, "rating created");
        Ok(stored)
    }
}

// ── List ──────────────────────────────────────────────────────────────────────

pub struct ListRatingsUseCase<R: RatingRepository> {
    pub ratings: R,
}

impl<R: RatingRepository> ListRatingsUseCase<R> {
    pub async fn execute(&self, product_id: i64) -> Result<Vec<Rating>, AuthServiceError> {
        self.ratings.list_by_product(product_id).await
    }
}

// ── Respond ───────────────────────────────────────────────────────────────────

pub struct RespondRatingUseCase<R: RatingRepository> {
    pub ratings: R,
}

impl<R: RatingRepository> RespondRatingUseCase<R> {
    /// Admin-only: attach a response to a rating.
    pub async fn execute(
        &self,
        session: &SessionClaims,
        rating_id: Uuid,
        response: &str,
    ) -> Result<Rating, AuthServiceError> {
        if !session.role.is_admin() {
            return Err(AuthServiceError::Forbidden);
        }
        let response = response.trim();
        if response.is_empty() {
            return Err(AuthServiceError::InvalidRating);
        }

        let updated = self
            .ratings
            .respond(rating_id, response, &session.email)
            .await?
            .ok_or(AuthServiceError::RatingNotFound)?;
        info!(rating_id = %updated.id, "rating answered");
        Ok(updated)
    }
}
