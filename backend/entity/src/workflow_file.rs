/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "workflow_files")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    #[sea_orm(column_type = "JsonBinary")]
    pub runtime_config: Json,
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
