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
                    .table(WorkflowFiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkflowFiles::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WorkflowFiles::RuntimeConfig)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WorkflowFiles::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(WorkflowFiles::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-workflow_files-id")
                            .from(WorkflowFiles::Table, WorkflowFiles::Id)
                            .to(JobScriptTemplates::Table, JobScriptTemplates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WorkflowFiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum WorkflowFiles {
    Table,
    Id,
    RuntimeConfig,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JobScriptTemplates {
    Table,
    Id,
}
