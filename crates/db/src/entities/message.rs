//! Message entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A short message posted by a user.
///
/// The internal numeric `id` never leaves the persistence layer; the unique,
/// time-sortable `ulid` is the external identifier and the pagination cursor.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Time-sortable external identifier.
    #[sea_orm(unique)]
    pub ulid: String,

    /// Owning user ID.
    #[sea_orm(indexed)]
    pub user_id: i64,

    /// Message text content.
    #[sea_orm(column_type = "Text")]
    pub text: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(has_many = "super::message_hashtag::Entity")]
    MessageHashtag,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::message_hashtag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MessageHashtag.def()
    }
}

impl Related<super::hashtag::Entity> for Entity {
    fn to() -> RelationDef {
        super::message_hashtag::Relation::Hashtag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::message_hashtag::Relation::Message.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
