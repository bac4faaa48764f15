use sea_orm::entity::prelude::*;

/// Identity record: credentials, activation flag and the single live refresh token.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Stored normalized (trimmed, lowercase).
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub role: i16,
    pub enabled: bool,
    pub password_hash: String,
    /// `None` when no session is active.
    pub refresh_token: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::verification_codes::Entity")]
    VerificationCodes,
    #[sea_orm(has_many = "super::ratings::Entity")]
    Ratings,
}

impl Related<super::verification_codes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VerificationCodes.def()
    }
}

impl Related<super::ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
