/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub application_name: String,
    #[sea_orm(unique)]
    pub application_identifier: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub application_description: String,
    pub application_owner_email: String,
    #[sea_orm(column_type = "Text")]
    pub application_file: String,
    #[sea_orm(column_type = "Text")]
    pub application_config: String,
    pub application_uploaded: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::job_script::Entity")]
    JobScript,
}

impl Related<super::job_script::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobScript.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
