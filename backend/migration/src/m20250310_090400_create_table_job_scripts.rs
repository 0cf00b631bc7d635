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
                    .table(JobScripts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobScripts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobScripts::Name).string().not_null())
                    .col(ColumnDef::new(JobScripts::Description).text())
                    .col(ColumnDef::new(JobScripts::OwnerEmail).string().not_null())
                    .col(ColumnDef::new(JobScripts::ApplicationId).integer())
                    .col(ColumnDef::new(JobScripts::ParentTemplateId).integer())
                    .col(
                        ColumnDef::new(JobScripts::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(JobScripts::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-job_scripts-application_id")
                            .from(JobScripts::Table, JobScripts::ApplicationId)
                            .to(Applications::Table, Applications::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-job_scripts-parent_template_id")
                            .from(JobScripts::Table, JobScripts::ParentTemplateId)
                            .to(JobScriptTemplates::Table, JobScriptTemplates::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-job_scripts-owner_email")
                    .table(JobScripts::Table)
                    .col(JobScripts::OwnerEmail)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobScripts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum JobScripts {
    Table,
    Id,
    Name,
    Description,
    OwnerEmail,
    ApplicationId,
    ParentTemplateId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Applications {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum JobScriptTemplates {
    Table,
    Id,
}
