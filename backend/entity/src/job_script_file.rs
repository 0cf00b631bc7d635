/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::template_file::FileType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "job_script_files")]
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
        belongs_to = "super::job_script::Entity",
        from = "Column::Id",
        to = "super::job_script::Column::Id",
        on_delete = "Cascade"
    )]
    JobScript,
}

impl Related<super::job_script::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobScript.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
