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
                    .table(TemplateFiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TemplateFiles::Id).integer().not_null())
                    .col(ColumnDef::new(TemplateFiles::Filename).string().not_null())
                    .col(ColumnDef::new(TemplateFiles::FileType).integer().not_null())
                    .col(
                        ColumnDef::new(TemplateFiles::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(TemplateFiles::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(TemplateFiles::Id)
                            .col(TemplateFiles::Filename),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-template_files-id")
                            .from(TemplateFiles::Table, TemplateFiles::Id)
                            .to(JobScriptTemplates::Table, JobScriptTemplates::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TemplateFiles::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TemplateFiles {
    Table,
    Id,
    Filename,
    FileType,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum JobScriptTemplates {
    Table,
    Id,
}
