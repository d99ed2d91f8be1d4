//! Trend bucket entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-minute, per-hashtag occurrence counter.
///
/// `bucket` is an integer minute index since the Unix epoch. Rows are created
/// on first occurrence and incremented thereafter, never decremented or
/// deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trend_bucket")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub bucket: i64,

    #[sea_orm(primary_key, auto_increment = false)]
    pub hashtag_id: i64,

    pub count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hashtag::Entity",
        from = "Column::HashtagId",
        to = "super::hashtag::Column::Id"
    )]
    Hashtag,
}

impl Related<super::hashtag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hashtag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
