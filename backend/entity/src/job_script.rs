/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "job_scripts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub owner_email: String,
    pub application_id: Option<i32>,
    pub parent_template_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::application::Entity",
        from = "Column::ApplicationId",
        to = "super::application::Column::Id",
        on_delete = "Restrict"
    )]
    Application,
    #[sea_orm(
        belongs_to = "super::job_script_template::Entity",
        from = "Column::ParentTemplateId",
        to = "super::job_script_template::Column::Id",
        on_delete = "Restrict"
    )]
    JobScriptTemplate,
    #[sea_orm(has_many = "super::job_script_file::Entity")]
    JobScriptFile,
    #[sea_orm(has_many = "super::job_submission::Entity")]
    JobSubmission,
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl Related<super::job_script_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobScriptTemplate.def()
    }
}

impl Related<super::job_script_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobScriptFile.def()
    }
}

impl Related<super::job_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobSubmission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
