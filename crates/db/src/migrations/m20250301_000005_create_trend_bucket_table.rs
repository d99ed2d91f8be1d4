//! Create trend bucket table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrendBucket::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TrendBucket::Bucket).big_integer().not_null())
                    .col(
                        ColumnDef::new(TrendBucket::HashtagId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrendBucket::Count)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(TrendBucket::Bucket)
                            .col(TrendBucket::HashtagId),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: hashtag_id (single-hashtag trend queries)
        manager
            .create_index(
                Index::create()
                    .name("idx_trend_bucket_hashtag_id")
                    .table(TrendBucket::Table)
                    .col(TrendBucket::HashtagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrendBucket::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TrendBucket {
    Table,
    Bucket,
    HashtagId,
    Count,
}
