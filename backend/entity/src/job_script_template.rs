/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "job_script_templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub identifier: Option<String>,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub owner_email: String,
    /// Default values offered for every template variable.
    #[sea_orm(column_type = "JsonBinary")]
    pub template_vars: Json,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::template_file::Entity")]
    TemplateFile,
    #[sea_orm(has_one = "super::workflow_file::Entity")]
    WorkflowFile,
    #[sea_orm(has_many = "super::job_script::Entity")]
    JobScript,
}

impl Related<super::template_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TemplateFile.def()
    }
}

impl Related<super::workflow_file::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkflowFile.def()
    }
}

impl Related<super::job_script::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobScript.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
