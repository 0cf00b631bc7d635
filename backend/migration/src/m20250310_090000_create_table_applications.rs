/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Applications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Applications::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Applications::ApplicationName).string().not_null())
                    .col(
                        ColumnDef::new(Applications::ApplicationIdentifier)
                            .string()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Applications::ApplicationDescription)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Applications::ApplicationOwnerEmail)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Applications::ApplicationFile).text().not_null())
                    .col(ColumnDef::new(Applications::ApplicationConfig).text().not_null())
                    .col(
                        ColumnDef::new(Applications::ApplicationUploaded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Applications::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Applications::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-applications-owner_email")
                    .table(Applications::Table)
                    .col(Applications::ApplicationOwnerEmail)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Applications::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Applications {
    Table,
    Id,
    ApplicationName,
    ApplicationIdentifier,
    ApplicationDescription,
    ApplicationOwnerEmail,
    ApplicationFile,
    ApplicationConfig,
    ApplicationUploaded,
    CreatedAt,
    UpdatedAt,
}
