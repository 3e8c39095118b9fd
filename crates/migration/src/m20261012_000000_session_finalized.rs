//! Adds `shopping_sessions.is_finalized`.
//!
//! The column stays nullable so rows written before it existed read as open.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum ShoppingSessions {
    Table,
    IsFinalized,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(ShoppingSessions::Table)
                    .add_column(
                        ColumnDef::new(ShoppingSessions::IsFinalized)
                            .boolean()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(ShoppingSessions::Table)
                    .drop_column(ShoppingSessions::IsFinalized)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
