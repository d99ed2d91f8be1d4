//! Create message-hashtag join table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MessageHashtag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MessageHashtag::MessageId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MessageHashtag::HashtagId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(MessageHashtag::MessageId)
                            .col(MessageHashtag::HashtagId),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: hashtag_id (listing messages by hashtag joins on this)
        manager
            .create_index(
                Index::create()
                    .name("idx_message_hashtag_hashtag_id")
                    .table(MessageHashtag::Table)
                    .col(MessageHashtag::HashtagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MessageHashtag::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MessageHashtag {
    Table,
    MessageId,
    HashtagId,
}
