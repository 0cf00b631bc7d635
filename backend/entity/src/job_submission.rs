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
pub enum SubmissionStatus {
    #[sea_orm(num_value = 0)]
    Created,
    #[sea_orm(num_value = 1)]
    Submitted,
    #[sea_orm(num_value = 2)]
    Rejected,
    #[sea_orm(num_value = 3)]
    Done,
    #[sea_orm(num_value = 4)]
    Aborted,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self {
            SubmissionStatus::Created => "CREATED",
            SubmissionStatus::Submitted => "SUBMITTED",
            SubmissionStatus::Rejected => "REJECTED",
            SubmissionStatus::Done => "DONE",
            SubmissionStatus::Aborted => "ABORTED",
        };

        write!(f, "{}", status)
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CREATED" => Ok(SubmissionStatus::Created),
            "SUBMITTED" => Ok(SubmissionStatus::Submitted),
            "REJECTED" => Ok(SubmissionStatus::Rejected),
            "DONE" => Ok(SubmissionStatus::Done),
            "ABORTED" => Ok(SubmissionStatus::Aborted),
            _ => Err(format!("Invalid submission status: {}", s)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "job_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub owner_email: String,
    pub job_script_id: i32,
    pub execution_directory: Option<String>,
    pub slurm_job_id: Option<i32>,
    pub client_id: Option<String>,
    pub status: SubmissionStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub report_message: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub execution_parameters: Json,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::job_script::Entity",
        from = "Column::JobScriptId",
        to = "super::job_script::Column::Id",
        on_delete = "Restrict"
    )]
    JobScript,
}

impl Related<super::job_script::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobScript.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
