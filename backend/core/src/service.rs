/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Generic create/read/update/delete/list operations shared by every resource table.

use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr,
    EntityName, EntityTrait, IntoActiveModel, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, SqlErr,
};

use super::consts::FOREIGN_KEY_ERROR_MESSAGE;
use super::input::IdOrIdentifier;
use super::storage::StorageError;
use super::types::*;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{}", FOREIGN_KEY_ERROR_MESSAGE)]
    ForeignKey { table: String, pk_id: i32 },
    #[error("Invalid sorting column requested: {0}")]
    InvalidSortField(String),
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl ServiceError {
    /// Translates constraint violations reported by the database.
    pub fn from_db(err: DbErr, label: &str, pk_id: i32) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ServiceError::Conflict(format!("{} already exists", label))
            }
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => ServiceError::ForeignKey {
                table: referencing_table(&message).unwrap_or_else(|| label.to_string()),
                pk_id,
            },
            _ => ServiceError::Database(err),
        }
    }
}

/// Postgres reports `... violates foreign key constraint "x" on table "y"`.
fn referencing_table(message: &str) -> Option<String> {
    let (_, rest) = message.rsplit_once("on table \"")?;
    let (table, _) = rest.split_once('"')?;
    Some(table.to_string())
}

/// Table level metadata needed by the generic operations.
pub trait Resource: EntityTrait {
    /// Human readable name used in error messages.
    const LABEL: &'static str;

    fn id_column() -> Self::Column;
    fn owner_column() -> Self::Column;

    fn identifier_column() -> Option<Self::Column> {
        None
    }

    fn searchable_columns() -> Vec<Self::Column>;
    fn sortable_column(field: &str) -> Option<Self::Column>;
    fn model_id(model: &Self::Model) -> i32;
}

pub async fn get_by_id<E, C>(db: &C, id: i32) -> Result<E::Model, ServiceError>
where
    E: Resource,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::id_column().eq(id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(E::LABEL.to_string()))
}

pub async fn get_one<E, C>(db: &C, key: &IdOrIdentifier) -> Result<E::Model, ServiceError>
where
    E: Resource,
    C: ConnectionTrait,
{
    match key {
        IdOrIdentifier::Id(id) => get_by_id::<E, C>(db, *id).await,
        IdOrIdentifier::Identifier(identifier) => {
            let column = E::identifier_column()
                .ok_or_else(|| ServiceError::NotFound(E::LABEL.to_string()))?;

            E::find()
                .filter(column.eq(identifier.as_str()))
                .one(db)
                .await?
                .ok_or_else(|| ServiceError::NotFound(E::LABEL.to_string()))
        }
    }
}

/// Fails with a conflict when another row already uses `identifier`.
pub async fn ensure_identifier_available<E, C>(
    db: &C,
    identifier: &str,
    exclude_id: Option<i32>,
) -> Result<(), ServiceError>
where
    E: Resource,
    C: ConnectionTrait,
{
    let Some(column) = E::identifier_column() else {
        return Ok(());
    };

    let mut condition = Condition::all().add(column.eq(identifier));

    if let Some(id) = exclude_id {
        condition = condition.add(E::id_column().ne(id));
    }

    if E::find().filter(condition).one(db).await?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "{} with identifier {} already exists",
            E::LABEL,
            identifier
        )));
    }

    Ok(())
}

/// Fails with a foreign key error when a row of `R` still points at `pk_id`.
pub async fn ensure_unreferenced<R, C>(
    db: &C,
    column: R::Column,
    pk_id: i32,
) -> Result<(), ServiceError>
where
    R: EntityTrait,
    C: ConnectionTrait,
{
    let dependent = R::find().filter(column.eq(pk_id)).one(db).await?;

    if dependent.is_some() {
        return Err(ServiceError::ForeignKey {
            table: R::default().table_name().to_string(),
            pk_id,
        });
    }

    Ok(())
}

/// Inserts the row and reads it back so server side defaults are visible.
pub async fn create<E, A, C>(db: &C, model: A) -> Result<E::Model, ServiceError>
where
    E: Resource,
    A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    E::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    let inserted = model
        .insert(db)
        .await
        .map_err(|e| ServiceError::from_db(e, E::LABEL, 0))?;

    get_by_id::<E, C>(db, E::model_id(&inserted)).await
}

/// Writes the columns set on `model` and returns the updated row.
pub async fn update<E, A, C>(db: &C, pk_id: i32, model: A) -> Result<E::Model, ServiceError>
where
    E: Resource,
    A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    E::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    model.update(db).await.map_err(|e| match e {
        DbErr::RecordNotUpdated => ServiceError::NotFound(E::LABEL.to_string()),
        e => ServiceError::from_db(e, E::LABEL, pk_id),
    })
}

pub async fn delete<E, C>(db: &C, pk_id: i32) -> Result<(), ServiceError>
where
    E: Resource,
    C: ConnectionTrait,
{
    let result = E::delete_many()
        .filter(E::id_column().eq(pk_id))
        .exec(db)
        .await
        .map_err(|e| ServiceError::from_db(e, E::LABEL, pk_id))?;

    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound(E::LABEL.to_string()));
    }

    Ok(())
}

/// Base condition for list endpoints: owner only and unidentified rows.
pub fn list_condition<E: Resource>(params: &ListParams, owner_email: &str) -> Condition {
    let mut condition = Condition::all();

    if params.user_only {
        condition = condition.add(E::owner_column().eq(owner_email));
    }

    if let Some(column) = E::identifier_column() {
        if !params.include_null_identifier {
            condition = condition.add(column.is_not_null());
        }
    }

    condition
}

pub fn search_condition<E: Resource>(term: &str) -> Condition {
    let pattern = format!("%{}%", term.trim().to_lowercase());

    E::searchable_columns()
        .into_iter()
        .fold(Condition::any(), |condition, column| {
            let lowered = Func::lower(Expr::col((E::default(), column)));
            condition.add(Expr::expr(lowered).like(pattern.clone()))
        })
}

/// Builds the filtered and sorted query, without pagination.
pub fn list_query<E: Resource>(
    params: &ListParams,
    condition: Condition,
) -> Result<Select<E>, ServiceError> {
    let mut condition = condition;

    if let Some(search) = params.search.as_deref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(search_condition::<E>(search));
    }

    let query = E::find().filter(condition);

    match params.sort_field.as_deref() {
        Some(field) => {
            let column = E::sortable_column(field)
                .ok_or_else(|| ServiceError::InvalidSortField(field.to_string()))?;
            let order = if params.sort_ascending {
                Order::Asc
            } else {
                Order::Desc
            };

            Ok(query.order_by(column, order))
        }
        None => Ok(query.order_by(E::id_column(), Order::Asc)),
    }
}

/// Row offset of the requested page; `limit` must be at least 1.
pub fn page_offset(start: u64, limit: u64) -> Result<u64, ServiceError> {
    if limit == 0 {
        return Err(ServiceError::InvalidPagination(
            "limit must be at least 1".to_string(),
        ));
    }

    start
        .checked_mul(limit)
        .filter(|offset| *offset <= i64::MAX as u64)
        .ok_or_else(|| {
            ServiceError::InvalidPagination(format!("start {} is out of range", start))
        })
}

pub async fn list<E, C>(
    db: &C,
    params: &ListParams,
    condition: Condition,
) -> Result<Page<E::Model>, ServiceError>
where
    E: Resource,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let offset = params
        .limit
        .map(|limit| page_offset(params.start, limit))
        .transpose()?;

    let query = list_query::<E>(params, condition)?;
    let total = query.clone().count(db).await?;

    let query = match (offset, params.limit) {
        (Some(offset), Some(limit)) => query.offset(offset).limit(limit),
        _ => query,
    };

    let results = query.all(db).await?;

    Ok(Page {
        results,
        pagination: Pagination {
            total,
            start: params.start,
            limit: params.limit,
        },
    })
}

impl Resource for EApplication {
    const LABEL: &'static str = "Application";

    fn id_column() -> Self::Column {
        CApplication::Id
    }

    fn owner_column() -> Self::Column {
        CApplication::ApplicationOwnerEmail
    }

    fn identifier_column() -> Option<Self::Column> {
        Some(CApplication::ApplicationIdentifier)
    }

    fn searchable_columns() -> Vec<Self::Column> {
        vec![
            CApplication::ApplicationName,
            CApplication::ApplicationIdentifier,
            CApplication::ApplicationDescription,
            CApplication::ApplicationOwnerEmail,
        ]
    }

    fn sortable_column(field: &str) -> Option<Self::Column> {
        match field {
            "id" => Some(CApplication::Id),
            "application_name" => Some(CApplication::ApplicationName),
            "application_identifier" => Some(CApplication::ApplicationIdentifier),
            "application_owner_email" => Some(CApplication::ApplicationOwnerEmail),
            "created_at" => Some(CApplication::CreatedAt),
            "updated_at" => Some(CApplication::UpdatedAt),
            _ => None,
        }
    }

    fn model_id(model: &Self::Model) -> i32 {
        model.id
    }
}

impl Resource for EJobScriptTemplate {
    const LABEL: &'static str = "Job script template";

    fn id_column() -> Self::Column {
        CJobScriptTemplate::Id
    }

    fn owner_column() -> Self::Column {
        CJobScriptTemplate::OwnerEmail
    }

    fn identifier_column() -> Option<Self::Column> {
        Some(CJobScriptTemplate::Identifier)
    }

    fn searchable_columns() -> Vec<Self::Column> {
        vec![
            CJobScriptTemplate::Name,
            CJobScriptTemplate::Identifier,
            CJobScriptTemplate::Description,
            CJobScriptTemplate::OwnerEmail,
        ]
    }

    fn sortable_column(field: &str) -> Option<Self::Column> {
        match field {
            "id" => Some(CJobScriptTemplate::Id),
            "name" => Some(CJobScriptTemplate::Name),
            "identifier" => Some(CJobScriptTemplate::Identifier),
            "owner_email" => Some(CJobScriptTemplate::OwnerEmail),
            "created_at" => Some(CJobScriptTemplate::CreatedAt),
            "updated_at" => Some(CJobScriptTemplate::UpdatedAt),
            _ => None,
        }
    }

    fn model_id(model: &Self::Model) -> i32 {
        model.id
    }
}

impl Resource for EJobScript {
    const LABEL: &'static str = "Job script";

    fn id_column() -> Self::Column {
        CJobScript::Id
    }

    fn owner_column() -> Self::Column {
        CJobScript::OwnerEmail
    }

    fn searchable_columns() -> Vec<Self::Column> {
        vec![
            CJobScript::Name,
            CJobScript::Description,
            CJobScript::OwnerEmail,
        ]
    }

    fn sortable_column(field: &str) -> Option<Self::Column> {
        match field {
            "id" => Some(CJobScript::Id),
            "name" => Some(CJobScript::Name),
            "owner_email" => Some(CJobScript::OwnerEmail),
            "parent_template_id" => Some(CJobScript::ParentTemplateId),
            "created_at" => Some(CJobScript::CreatedAt),
            "updated_at" => Some(CJobScript::UpdatedAt),
            _ => None,
        }
    }

    fn model_id(model: &Self::Model) -> i32 {
        model.id
    }
}

impl Resource for EJobSubmission {
    const LABEL: &'static str = "Job submission";

    fn id_column() -> Self::Column {
        CJobSubmission::Id
    }

    fn owner_column() -> Self::Column {
        CJobSubmission::OwnerEmail
    }

    fn searchable_columns() -> Vec<Self::Column> {
        vec![
            CJobSubmission::Name,
            CJobSubmission::Description,
            CJobSubmission::OwnerEmail,
            CJobSubmission::ClientId,
        ]
    }

    fn sortable_column(field: &str) -> Option<Self::Column> {
        match field {
            "id" => Some(CJobSubmission::Id),
            "name" => Some(CJobSubmission::Name),
            "owner_email" => Some(CJobSubmission::OwnerEmail),
            "job_script_id" => Some(CJobSubmission::JobScriptId),
            "slurm_job_id" => Some(CJobSubmission::SlurmJobId),
            "status" => Some(CJobSubmission::Status),
            "created_at" => Some(CJobSubmission::CreatedAt),
            "updated_at" => Some(CJobSubmission::UpdatedAt),
            _ => None,
        }
    }

    fn model_id(model: &Self::Model) -> i32 {
        model.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(2, 25).unwrap(), 50);
        assert!(matches!(page_offset(0, 0), Err(ServiceError::InvalidPagination(_))));
        assert!(matches!(
            page_offset(i64::MAX as u64, 3),
            Err(ServiceError::InvalidPagination(_))
        ));
        assert!(matches!(
            page_offset(1 << 62, 3),
            Err(ServiceError::InvalidPagination(_))
        ));
    }

    fn sql<E: Resource>(params: &ListParams, condition: Condition) -> String {
        list_query::<E>(params, condition)
            .unwrap()
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn test_owner_only_filter() {
        let params = ListParams {
            user_only: true,
            ..Default::default()
        };

        let query = sql::<EJobScript>(
            &params,
            list_condition::<EJobScript>(&params, "owner@example.com"),
        );

        assert!(query.contains(r#""job_scripts"."owner_email" = 'owner@example.com'"#));

        let params = ListParams::default();
        let query = sql::<EJobScript>(
            &params,
            list_condition::<EJobScript>(&params, "owner@example.com"),
        );

        assert!(!query.contains("owner_email\" ="));
    }

    #[test]
    fn test_null_identifier_filter() {
        let params = ListParams::default();
        let query = sql::<EJobScriptTemplate>(
            &params,
            list_condition::<EJobScriptTemplate>(&params, "owner@example.com"),
        );

        assert!(query.contains(r#""job_script_templates"."identifier" IS NOT NULL"#));

        let params = ListParams {
            include_null_identifier: true,
            ..Default::default()
        };
        let query = sql::<EJobScriptTemplate>(
            &params,
            list_condition::<EJobScriptTemplate>(&params, "owner@example.com"),
        );

        assert!(!query.contains("IS NOT NULL"));
    }

    #[test]
    fn test_search_covers_searchable_columns() {
        let params = ListParams {
            search: Some("Rats".to_string()),
            ..Default::default()
        };

        let query = sql::<EJobScript>(&params, Condition::all());

        assert!(query.contains(r#"LOWER("job_scripts"."name") LIKE '%rats%'"#));
        assert!(query.contains(r#"LOWER("job_scripts"."description") LIKE '%rats%'"#));
        assert!(query.contains(r#"LOWER("job_scripts"."owner_email") LIKE '%rats%'"#));
        assert!(query.contains(" OR "));
    }

    #[test]
    fn test_sort_field() {
        let params = ListParams {
            sort_field: Some("name".to_string()),
            sort_ascending: false,
            ..Default::default()
        };

        let query = sql::<EJobScript>(&params, Condition::all());
        assert!(query.ends_with(r#"ORDER BY "job_scripts"."name" DESC"#));

        let query = sql::<EJobScript>(&ListParams::default(), Condition::all());
        assert!(query.ends_with(r#"ORDER BY "job_scripts"."id" ASC"#));

        let params = ListParams {
            sort_field: Some("password".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            list_query::<EJobScript>(&params, Condition::all()),
            Err(ServiceError::InvalidSortField(field)) if field == "password"
        ));
    }

    #[test]
    fn test_referencing_table() {
        let message = concat!(
            r#"update or delete on table "job_scripts" violates foreign key constraint "#,
            r#""fk-job_submissions-job_script_id" on table "job_submissions""#,
        );

        assert_eq!(
            referencing_table(message),
            Some("job_submissions".to_string())
        );
        assert_eq!(referencing_table("something else"), None);
    }
}
