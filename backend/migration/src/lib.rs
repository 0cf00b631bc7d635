/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub use sea_orm_migration::prelude::*;

mod m20250310_090000_create_table_applications;
mod m20250310_090100_create_table_job_script_templates;
mod m20250310_090200_create_table_template_files;
mod m20250310_090300_create_table_workflow_files;
mod m20250310_090400_create_table_job_scripts;
mod m20250310_090500_create_table_job_script_files;
mod m20250310_090600_create_table_job_submissions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250310_090000_create_table_applications::Migration),
            Box::new(m20250310_090100_create_table_job_script_templates::Migration),
            Box::new(m20250310_090200_create_table_template_files::Migration),
            Box::new(m20250310_090300_create_table_workflow_files::Migration),
            Box::new(m20250310_090400_create_table_job_scripts::Migration),
            Box::new(m20250310_090500_create_table_job_script_files::Migration),
            Box::new(m20250310_090600_create_table_job_submissions::Migration),
        ]
    }
}
