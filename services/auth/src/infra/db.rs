use anyhow::{Context as _, anyhow};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, IntoActiveModel as _, PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
    TransactionError, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use datn_auth_schema::{outbox_events, ratings, users, verification_codes};
use datn_domain::audit::{Audit, AuditStamp};
use datn_domain::user::UserRole;

use crate::domain::repository::{
    IdentityRepository, RatingRepository, VerificationCodeRepository,
};
use crate::domain::types::{
    CodePurpose, Identity, NewRating, OutboxEvent, Rating, VerificationCode,
};
use crate::error::AuthServiceError;

// ── Identity repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbIdentityRepository {
    pub db: DatabaseConnection,
}

impl IdentityRepository for DbIdentityRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find identity by email")?;
        Ok(model.map(identity_from_model).transpose()?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find identity by id")?;
        Ok(model.map(identity_from_model).transpose()?)
    }

    async fn create(&self, identity: &Identity) -> Result<(), AuthServiceError> {
        match identity_active_model(identity).insert(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(AuthServiceError::EmailTaken),
            Err(e) => Err(anyhow::Error::new(e).context("create identity").into()),
        }
    }

    async fn register(
        &self,
        identity: &Identity,
        code: &VerificationCode,
        event: &OutboxEvent,
    ) -> Result<(), AuthServiceError> {
        let result = self
            .db
            .transaction::<_, (), DbErr>(|txn| {
                let identity = identity_active_model(identity);
                let code = code.clone();
                let event = event.clone();
                Box::pin(async move {
                    identity.insert(txn).await?;
                    insert_verification_code(txn, &code).await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await;

        match result {
            Ok(()) => Ok(()),
            Err(TransactionError::Connection(e) | TransactionError::Transaction(e))
                if is_unique_violation(&e) =>
            {
                Err(AuthServiceError::EmailTaken)
            }
            Err(e) => Err(anyhow::Error::new(e).context("register identity").into()),
        }
    }

    async fn set_refresh_token(
        &self,
        id: Uuid,
        token: Option<&str>,
    ) -> Result<(), AuthServiceError> {
        users::Entity::update_many()
            .col_expr(
                users::Column::RefreshToken,
                Expr::value(token.map(str::to_owned)),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("set refresh token")?;
        Ok(())
    }

    async fn swap_refresh_token(
        &self,
        id: Uuid,
        current: &str,
        next: &str,
    ) -> Result<bool, AuthServiceError> {
        let result = users::Entity::update_many()
            .col_expr(users::Column::RefreshToken, Expr::value(next.to_owned()))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::RefreshToken.eq(current))
            .exec(&self.db)
            .await
            .context("swap refresh token")?;
        Ok(result.rows_affected > 0)
    }

    async fn set_enabled(&self, id: Uuid, enabled: bool) -> Result<(), AuthServiceError> {
        users::Entity::update_many()
            .col_expr(users::Column::Enabled, Expr::value(enabled))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("set identity enabled")?;
        Ok(())
    }

    async fn reset_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthServiceError> {
        users::Entity::update_many()
            .col_expr(
                users::Column::PasswordHash,
                Expr::value(password_hash.to_owned()),
            )
            .col_expr(users::Column::RefreshToken, Expr::value(Option::<String>::None))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("reset password")?;
        Ok(())
    }
}

fn identity_active_model(identity: &Identity) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(identity.id),
        email: Set(identity.email.clone()),
        name: Set(identity.name.clone()),
        role: Set(identity.role.as_i16()),
        enabled: Set(identity.enabled),
        password_hash: Set(identity.password_hash.clone()),
        refresh_token: Set(identity.refresh_token.clone()),
        created_at: Set(identity.created_at),
        updated_at: Set(identity.updated_at),
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn identity_from_model(model: users::Model) -> anyhow::Result<Identity> {
    let role = UserRole::from_i16(model.role)
        .ok_or_else(|| anyhow!("unknown role {} for user {}", model.role, model.id))?;
    Ok(Identity {
        id: model.id,
        email: model.email,
        name: model.name,
        role,
        enabled: model.enabled,
        password_hash: model.password_hash,
        refresh_token: model.refresh_token,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Verification code repository ──────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationCodeRepository {
    pub db: DatabaseConnection,
}

impl VerificationCodeRepository for DbVerificationCodeRepository {
    async fn count_active(
        &self,
        user_id: Uuid,
        purpose: CodePurpose,
    ) -> Result<u64, AuthServiceError> {
        let now = Utc::now();
        let count = verification_codes::Entity::find()
            .filter(verification_codes::Column::UserId.eq(user_id))
            .filter(verification_codes::Column::Purpose.eq(purpose.as_str()))
            .filter(verification_codes::Column::UsedAt.is_null())
            .filter(verification_codes::Column::ExpiresAt.gt(now))
            .count(&self.db)
            .await
            .context("count active verification codes")?;
        Ok(count)
    }

    async fn create_with_outbox(
        &self,
        code: &VerificationCode,
        event: &OutboxEvent,
    ) -> Result<(), AuthServiceError> {
        self.db
            .transaction::<_, (), DbErr>(|txn| {
                let code = code.clone();
                let event = event.clone();
                Box::pin(async move {
                    insert_verification_code(txn, &code).await?;
                    insert_outbox_event(txn, &event).await?;
                    Ok(())
                })
            })
            .await
            .context("create verification code with outbox")?;
        Ok(())
    }

    async fn find_valid(
        &self,
        user_id: Uuid,
        purpose: CodePurpose,
        code: &str,
    ) -> Result<Option<VerificationCode>, AuthServiceError> {
        let now = Utc::now();
        let model = verification_codes::Entity::find()
            .filter(verification_codes::Column::UserId.eq(user_id))
            .filter(verification_codes::Column::Purpose.eq(purpose.as_str()))
            .filter(verification_codes::Column::Code.eq(code))
            .filter(verification_codes::Column::UsedAt.is_null())
            .filter(verification_codes::Column::ExpiresAt.gt(now))
            .one(&self.db)
            .await
            .context("find valid verification code")?;
        Ok(model.map(code_from_model).transpose()?)
    }

    async fn mark_used(&self, id: Uuid) -> Result<bool, AuthServiceError> {
        let result = verification_codes::Entity::update_many()
            .col_expr(verification_codes::Column::UsedAt, Expr::value(Utc::now()))
            .filter(verification_codes::Column::Id.eq(id))
            .filter(verification_codes::Column::UsedAt.is_null())
            .exec(&self.db)
            .await
            .context("mark verification code used")?;
        Ok(result.rows_affected > 0)
    }
}

async fn insert_verification_code(
    txn: &DatabaseTransaction,
    code: &VerificationCode,
) -> Result<(), DbErr> {
    verification_codes::ActiveModel {
        id: Set(code.id),
        user_id: Set(code.user_id),
        purpose: Set(code.purpose.as_str().to_owned()),
        code: Set(code.code.clone()),
        expires_at: Set(code.expires_at),
        used_at: Set(None),
        created_at: Set(code.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_outbox_event(txn: &DatabaseTransaction, event: &OutboxEvent) -> Result<(), DbErr> {
    let now = Utc::now();
    outbox_events::ActiveModel {
        id: Set(event.id),
        user_id: Set(event.user_id),
        kind: Set(event.kind.clone()),
        payload: Set(event.payload.clone()),
        idempotency_key: Set(event.idempotency_key.clone()),
        attempts: Set(0),
        last_error: Set(None),
        created_at: Set(now),
        next_attempt_at: Set(now),
        processed_at: Set(None),
        failed_at: Set(None),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn code_from_model(model: verification_codes::Model) -> anyhow::Result<VerificationCode> {
    let purpose = CodePurpose::parse(&model.purpose)
        .ok_or_else(|| anyhow!("unknown code purpose {:?}", model.purpose))?;
    Ok(VerificationCode {
        id: model.id,
        user_id: model.user_id,
        purpose,
        code: model.code,
        expires_at: model.expires_at,
        used_at: model.used_at,
        created_at: model.created_at,
    })
}

// ── Rating repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRatingRepository {
    pub db: DatabaseConnection,
}

impl RatingRepository for DbRatingRepository {
    async fn create(&self, rating: NewRating, actor: &str) -> Result<Rating, AuthServiceError> {
        let rating = rating.into_rating(actor);
        let model = ratings::ActiveModel {
            id: Set(rating.id),
            user_id: Set(rating.user_id),
            product_id: Set(rating.product_id),
            content: Set(rating.content),
            number_stars: Set(i16::from(rating.number_stars)),
            admin_response: Set(rating.admin_response),
            created_at: Set(rating.audit.created.at),
            created_by: Set(rating.audit.created.by),
            updated_at: Set(None),
            updated_by: Set(None),
        }
        .insert(&self.db)
        .await
        .context("create rating")?;
        Ok(rating_from_model(model)?)
    }

    async fn respond(
        &self,
        id: Uuid,
        response: &str,
        actor: &str,
    ) -> Result<Option<Rating>, AuthServiceError> {
        let Some(model) = ratings::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find rating by id")?
        else {
            return Ok(None);
        };

        let mut rating = rating_from_model(model.clone())?;
        let updated = rating.audit.touch(actor);
        let mut am = model.into_active_model();
        am.admin_response = Set(Some(response.to_owned()));
        am.updated_at = Set(Some(updated.at));
        am.updated_by = Set(Some(updated.by.clone()));
        let model = am.update(&self.db).await.context("respond to rating")?;
        Ok(Some(rating_from_model(model)?))
    }

    async fn list_by_product(&self, product_id: i64) -> Result<Vec<Rating>, AuthServiceError> {
        let models = ratings::Entity::find()
            .filter(ratings::Column::ProductId.eq(product_id))
            .order_by_desc(ratings::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list ratings by product")?;
        Ok(models
            .into_iter()
            .map(rating_from_model)
            .collect::<anyhow::Result<_>>()?)
    }
}

fn rating_from_model(model: ratings::Model) -> anyhow::Result<Rating> {
    let number_stars = u8::try_from(model.number_stars)
        .with_context(|| format!("stars out of range for rating {}", model.id))?;
    let updated = match (model.updated_at, model.updated_by) {
        (Some(at), Some(by)) => Some(AuditStamp { at, by }),
        _ => None,
    };
    Ok(Rating {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        content: model.content,
        number_stars,
        admin_response: model.admin_response,
        audit: Audit {
            created: AuditStamp {
                at: model.created_at,
                by: model.created_by,
            },
            updated,
        },
    })
}
