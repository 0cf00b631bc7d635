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
                    .table(JobScriptTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobScriptTemplates::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(JobScriptTemplates::Identifier)
                            .string()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(JobScriptTemplates::Name).string().not_null())
                    .col(ColumnDef::new(JobScriptTemplates::Description).text())
                    .col(ColumnDef::new(JobScriptTemplates::OwnerEmail).string().not_null())
                    .col(
                        ColumnDef::new(JobScriptTemplates::TemplateVars)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JobScriptTemplates::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(JobScriptTemplates::UpdatedAt)
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
                    .name("idx-job_script_templates-owner_email")
                    .table(JobScriptTemplates::Table)
                    .col(JobScriptTemplates::OwnerEmail)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobScriptTemplates::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum JobScriptTemplates {
    Table,
    Id,
    Identifier,
    Name,
    Description,
    OwnerEmail,
    TemplateVars,
    CreatedAt,
    UpdatedAt,
}
