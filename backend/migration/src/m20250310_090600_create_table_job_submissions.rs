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
                    .table(JobSubmissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobSubmissions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobSubmissions::Name).string().not_null())
                    .col(ColumnDef::new(JobSubmissions::Description).text())
                    .col(ColumnDef::new(JobSubmissions::OwnerEmail).string().not_null())
                    .col(ColumnDef::new(JobSubmissions::JobScriptId).integer().not_null())
                    .col(ColumnDef::new(JobSubmissions::ExecutionDirectory).string())
                    .col(ColumnDef::new(JobSubmissions::SlurmJobId).integer())
                    .col(ColumnDef::new(JobSubmissions::ClientId).string())
                    .col(
                        ColumnDef::new(JobSubmissions::Status)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(JobSubmissions::ReportMessage).text())
                    .col(
                        ColumnDef::new(JobSubmissions::ExecutionParameters)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JobSubmissions::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(JobSubmissions::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-job_submissions-job_script_id")
                            .from(JobSubmissions::Table, JobSubmissions::JobScriptId)
                            .to(JobScripts::Table, JobScripts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-job_submissions-client_id-status")
                    .table(JobSubmissions::Table)
                    .col(JobSubmissions::ClientId)
                    .col(JobSubmissions::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobSubmissions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum JobSubmissions {
    Table,
    Id,
    Name,
    Description,
    OwnerEmail,
    JobScriptId,
    ExecutionDirectory,
    SlurmJobId,
    ClientId,
    Status,
    ReportMessage,
    ExecutionParameters,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JobScripts {
    Table,
    Id,
}
