/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, DeriveActiveEnum, EnumIter, Deserialize, Serialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileType {
    #[sea_orm(num_value = 0)]
    Entrypoint,
    #[sea_orm(num_value = 1)]
    Support,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Entrypoint => write!(f, "ENTRYPOINT"),
            FileType::Support => write!(f, "SUPPORT"),
        }
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ENTRYPOINT" => Ok(FileType::Entrypoint),
            "SUPPORT" => Ok(FileType::Support),
            _ => Err(format!("Invalid file type: {}", s)),
        }
    }
}

/// A file attached to a job script template. `id` is the id of the parent template.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "template_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub filename: String,
    pub file_type: FileType,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::job_script_template::Entity",
        from = "Column::Id",
        to = "super::job_script_template::Column::Id",
        on_delete = "Cascade"
    )]
    JobScriptTemplate,
}

impl Related<super::job_script_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobScriptTemplate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
