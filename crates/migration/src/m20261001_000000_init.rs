//! Initial schema.
//!
//! - `users`: login identities (email + salted password digest)
//! - `auth_tokens`: bearer tokens issued on sign-in
//! - `shopping_sessions`: shopping trips with cached totals
//! - `expense_items`: line items of a session
//! - `fixed_bills`: recurring monthly bills
//!
//! Numeric columns of sessions, items and bills are nullable: readers
//! coerce missing values (0 for money, 2 for split counts, 1 for quantities).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    PasswordSalt,
    CreatedAt,
}

#[derive(Iden)]
enum AuthTokens {
    Table,
    Token,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum ShoppingSessions {
    Table,
    Id,
    UserId,
    Title,
    SplitCount,
    CreatedAt,
    TotalSharedCost,
    TotalPersonalCost,
}

#[derive(Iden)]
enum ExpenseItems {
    Table,
    Id,
    SessionId,
    Name,
    Price,
    Quantity,
    IsPersonal,
    CreatedAt,
}

#[derive(Iden)]
enum FixedBills {
    Table,
    Id,
    UserId,
    Title,
    Amount,
    DueDay,
    MonthYear,
    IsPaid,
    SplitCount,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::PasswordSalt).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Auth tokens
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AuthTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthTokens::Token)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuthTokens::UserId).string().not_null())
                    .col(ColumnDef::new(AuthTokens::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-auth_tokens-user_id")
                            .from(AuthTokens::Table, AuthTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Shopping sessions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ShoppingSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShoppingSessions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShoppingSessions::UserId).string().not_null())
                    .col(ColumnDef::new(ShoppingSessions::Title).string().not_null())
                    .col(ColumnDef::new(ShoppingSessions::SplitCount).integer().default(2))
                    .col(
                        ColumnDef::new(ShoppingSessions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShoppingSessions::TotalSharedCost)
                            .big_integer()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ShoppingSessions::TotalPersonalCost)
                            .big_integer()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-shopping_sessions-user_id")
                            .from(ShoppingSessions::Table, ShoppingSessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-shopping_sessions-user_id-created_at")
                    .table(ShoppingSessions::Table)
                    .col(ShoppingSessions::UserId)
                    .col(ShoppingSessions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expense items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseItems::SessionId).string().not_null())
                    .col(ColumnDef::new(ExpenseItems::Name).string().not_null())
                    .col(ColumnDef::new(ExpenseItems::Price).big_integer().default(0))
                    .col(ColumnDef::new(ExpenseItems::Quantity).integer().default(1))
                    .col(ColumnDef::new(ExpenseItems::IsPersonal).boolean().default(false))
                    .col(ColumnDef::new(ExpenseItems::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_items-session_id")
                            .from(ExpenseItems::Table, ExpenseItems::SessionId)
                            .to(ShoppingSessions::Table, ShoppingSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_items-session_id-created_at")
                    .table(ExpenseItems::Table)
                    .col(ExpenseItems::SessionId)
                    .col(ExpenseItems::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Fixed bills
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(FixedBills::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FixedBills::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FixedBills::UserId).string().not_null())
                    .col(ColumnDef::new(FixedBills::Title).string().not_null())
                    .col(ColumnDef::new(FixedBills::Amount).big_integer().default(0))
                    .col(ColumnDef::new(FixedBills::DueDay).integer().default(10))
                    .col(ColumnDef::new(FixedBills::MonthYear).string().not_null())
                    .col(ColumnDef::new(FixedBills::IsPaid).boolean().default(false))
                    .col(ColumnDef::new(FixedBills::SplitCount).integer().default(2))
                    .col(ColumnDef::new(FixedBills::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-fixed_bills-user_id")
                            .from(FixedBills::Table, FixedBills::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-fixed_bills-user_id-month_year")
                    .table(FixedBills::Table)
                    .col(FixedBills::UserId)
                    .col(FixedBills::MonthYear)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FixedBills::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ShoppingSessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
