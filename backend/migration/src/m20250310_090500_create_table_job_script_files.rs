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
                    .table(JobScriptFiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(JobScriptFiles::Id).integer().not_null())
                    .col(ColumnDef::new(JobScriptFiles::Filename).string().not_null())
                    .col(ColumnDef::new(JobScriptFiles::FileType).integer().not_null())
                    .col(
                        ColumnDef::new(JobScriptFiles::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(JobScriptFiles::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(JobScriptFiles::Id)
                            .col(JobScriptFiles::Filename),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-job_script_files-id")
                            .from(JobScriptFiles::Table, JobScriptFiles::Id)
                            .to(JobScripts::Table, JobScripts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobScriptFiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum JobScriptFiles {
    Table,
    Id,
    Filename,
    FileType,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JobScripts {
    Table,
    Id,
}
