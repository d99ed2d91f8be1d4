//! Hashtag entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hashtag, created lazily the first time a message references it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hashtag")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// The hashtag text (lowercase, without #); the natural key.
    #[sea_orm(unique)]
    pub text: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::message_hashtag::Entity")]
    MessageHashtag,

    #[sea_orm(has_many = "super::trend_bucket::Entity")]
    TrendBucket,
}

impl Related<super::message_hashtag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MessageHashtag.def()
    }
}

impl Related<super::message::Entity> for Entity {
    fn to() -> RelationDef {
        super::message_hashtag::Relation::Message.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::message_hashtag::Relation::Hashtag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
