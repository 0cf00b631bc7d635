/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! File rows paired with their object store blobs.
//!
//! Writes put the blob first and then upsert the row, deletes remove the row first and
//! then the blob. A crash in between leaves an orphaned blob, which is tolerated.

use chrono::Utc;
use entity::FileType;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder,
};

use super::consts::*;
use super::service::ServiceError;
use super::storage::{ObjectStore, StorageError};
use super::types::*;

pub fn template_file_key(template_id: i32, filename: &str) -> String {
    format!("{}/{}/{}", TEMPLATE_FILES_FOLDER, template_id, filename)
}

pub fn workflow_file_key(template_id: i32) -> String {
    format!("{}/{}/{}", WORKFLOW_FILES_FOLDER, template_id, WORKFLOW_FILE_NAME)
}

pub fn job_script_file_key(job_script_id: i32, filename: &str) -> String {
    format!("{}/{}/{}", JOB_SCRIPT_FILES_FOLDER, job_script_id, filename)
}

pub fn application_archive_key(application_id: i32) -> String {
    format!(
        "{}/{}/{}",
        APPLICATION_FILES_FOLDER, application_id, APPLICATION_ARCHIVE_NAME
    )
}

async fn get_blob(
    store: &dyn ObjectStore,
    key: &str,
    label: &str,
) -> Result<Vec<u8>, ServiceError> {
    store.get(key).await.map_err(|e| match e {
        StorageError::NotFound(_) => ServiceError::NotFound(label.to_string()),
        e => ServiceError::Storage(e),
    })
}

/// Removes a blob whose row is already gone; a missing blob is not an error.
async fn discard_blob(store: &dyn ObjectStore, key: &str) -> Result<(), ServiceError> {
    match store.delete(key).await {
        Ok(()) => Ok(()),
        Err(StorageError::NotFound(_)) => {
            tracing::debug!(key = %key, "Blob already absent");
            Ok(())
        }
        Err(e) => Err(ServiceError::Storage(e)),
    }
}

pub async fn list_template_files<C: ConnectionTrait>(
    db: &C,
    template_id: i32,
) -> Result<Vec<MTemplateFile>, ServiceError> {
    Ok(ETemplateFile::find()
        .filter(CTemplateFile::Id.eq(template_id))
        .order_by_asc(CTemplateFile::Filename)
        .all(db)
        .await?)
}

pub async fn upsert_template_file<C: ConnectionTrait>(
    db: &C,
    store: &dyn ObjectStore,
    template_id: i32,
    filename: &str,
    file_type: FileType,
    content: Vec<u8>,
) -> Result<MTemplateFile, ServiceError> {
    store
        .put(&template_file_key(template_id, filename), content)
        .await?;

    let now = Utc::now().naive_utc();
    let existing = ETemplateFile::find_by_id((template_id, filename.to_string()))
        .one(db)
        .await?;

    let file = match existing {
        Some(file) => {
            let mut afile = file.into_active_model();
            afile.file_type = Set(file_type);
            afile.updated_at = Set(now);
            afile.update(db).await?
        }
        None => {
            ATemplateFile {
                id: Set(template_id),
                filename: Set(filename.to_string()),
                file_type: Set(file_type),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?
        }
    };

    tracing::info!(template_id, filename = %filename, "Stored template file");
    Ok(file)
}

pub async fn get_template_file<C: ConnectionTrait>(
    db: &C,
    store: &dyn ObjectStore,
    template_id: i32,
    filename: &str,
) -> Result<(MTemplateFile, Vec<u8>), ServiceError> {
    let file = ETemplateFile::find_by_id((template_id, filename.to_string()))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Template file".to_string()))?;

    let key = template_file_key(template_id, filename);
    let content = get_blob(store, &key, "Template file").await?;

    Ok((file, content))
}

pub async fn delete_template_file<C: ConnectionTrait>(
    db: &C,
    store: &dyn ObjectStore,
    template_id: i32,
    filename: &str,
) -> Result<(), ServiceError> {
    let result = ETemplateFile::delete_by_id((template_id, filename.to_string()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound("Template file".to_string()));
    }

    discard_blob(store, &template_file_key(template_id, filename)).await
}

pub async fn get_workflow_file<C: ConnectionTrait>(
    db: &C,
    store: &dyn ObjectStore,
    template_id: i32,
) -> Result<(MWorkflowFile, Vec<u8>), ServiceError> {
    let file = EWorkflowFile::find_by_id(template_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Workflow file".to_string()))?;

    let content = get_blob(store, &workflow_file_key(template_id), "Workflow file").await?;

    Ok((file, content))
}

pub async fn upsert_workflow_file<C: ConnectionTrait>(
    db: &C,
    store: &dyn ObjectStore,
    template_id: i32,
    runtime_config: serde_json::Value,
    content: Vec<u8>,
) -> Result<MWorkflowFile, ServiceError> {
    store.put(&workflow_file_key(template_id), content).await?;

    let now = Utc::now().naive_utc();
    let file = match EWorkflowFile::find_by_id(template_id).one(db).await? {
        Some(file) => {
            let mut afile = file.into_active_model();
            afile.runtime_config = Set(runtime_config);
            afile.updated_at = Set(now);
            afile.update(db).await?
        }
        None => {
            AWorkflowFile {
                id: Set(template_id),
                runtime_config: Set(runtime_config),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?
        }
    };

    tracing::info!(template_id, "Stored workflow file");
    Ok(file)
}

pub async fn delete_workflow_file<C: ConnectionTrait>(
    db: &C,
    store: &dyn ObjectStore,
    template_id: i32,
) -> Result<(), ServiceError> {
    let result = EWorkflowFile::delete_by_id(template_id).exec(db).await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound("Workflow file".to_string()));
    }

    discard_blob(store, &workflow_file_key(template_id)).await
}

/// Drops the blobs of a template whose rows are removed by the cascading delete.
pub async fn discard_template_blobs(
    store: &dyn ObjectStore,
    template_id: i32,
    files: &[MTemplateFile],
    has_workflow: bool,
) -> Result<(), ServiceError> {
    for file in files {
        discard_blob(store, &template_file_key(template_id, &file.filename)).await?;
    }

    if has_workflow {
        discard_blob(store, &workflow_file_key(template_id)).await?;
    }

    Ok(())
}

pub async fn list_job_script_files<C: ConnectionTrait>(
    db: &C,
    job_script_id: i32,
) -> Result<Vec<MJobScriptFile>, ServiceError> {
    Ok(EJobScriptFile::find()
        .filter(CJobScriptFile::Id.eq(job_script_id))
        .order_by_asc(CJobScriptFile::Filename)
        .all(db)
        .await?)
}

pub async fn upsert_job_script_file<C: ConnectionTrait>(
    db: &C,
    store: &dyn ObjectStore,
    job_script_id: i32,
    filename: &str,
    file_type: FileType,
    content: Vec<u8>,
) -> Result<MJobScriptFile, ServiceError> {
    store
        .put(&job_script_file_key(job_script_id, filename), content)
        .await?;

    let now = Utc::now().naive_utc();
    let existing = EJobScriptFile::find_by_id((job_script_id, filename.to_string()))
        .one(db)
        .await?;

    let file = match existing {
        Some(file) => {
            let mut afile = file.into_active_model();
            afile.file_type = Set(file_type);
            afile.updated_at = Set(now);
            afile.update(db).await?
        }
        None => {
            AJobScriptFile {
                id: Set(job_script_id),
                filename: Set(filename.to_string()),
                file_type: Set(file_type),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(db)
            .await?
        }
    };

    tracing::info!(job_script_id, filename = %filename, "Stored job script file");
    Ok(file)
}

pub async fn get_job_script_file<C: ConnectionTrait>(
    db: &C,
    store: &dyn ObjectStore,
    job_script_id: i32,
    filename: &str,
) -> Result<(MJobScriptFile, Vec<u8>), ServiceError> {
    let file = EJobScriptFile::find_by_id((job_script_id, filename.to_string()))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Job script file".to_string()))?;

    let content = get_blob(
        store,
        &job_script_file_key(job_script_id, filename),
        "Job script file",
    )
    .await?;

    Ok((file, content))
}

pub async fn delete_job_script_file<C: ConnectionTrait>(
    db: &C,
    store: &dyn ObjectStore,
    job_script_id: i32,
    filename: &str,
) -> Result<(), ServiceError> {
    let result = EJobScriptFile::delete_by_id((job_script_id, filename.to_string()))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(ServiceError::NotFound("Job script file".to_string()));
    }

    discard_blob(store, &job_script_file_key(job_script_id, filename)).await
}

pub async fn discard_job_script_blobs(
    store: &dyn ObjectStore,
    job_script_id: i32,
    files: &[MJobScriptFile],
) -> Result<(), ServiceError> {
    for file in files {
        discard_blob(store, &job_script_file_key(job_script_id, &file.filename)).await?;
    }

    Ok(())
}

/// The single entrypoint file of a job script, or `None` when there are zero or several.
pub fn single_entrypoint(files: &[MJobScriptFile]) -> Option<&MJobScriptFile> {
    let mut entrypoints = files
        .iter()
        .filter(|file| file.file_type == FileType::Entrypoint);

    match (entrypoints.next(), entrypoints.next()) {
        (Some(file), None) => Some(file),
        _ => None,
    }
}

pub async fn put_application_archive<C: ConnectionTrait>(
    db: &C,
    store: &dyn ObjectStore,
    application: MApplication,
    content: Vec<u8>,
) -> Result<MApplication, ServiceError> {
    store
        .put(&application_archive_key(application.id), content)
        .await?;

    let mut aapplication = application.into_active_model();
    aapplication.application_uploaded = Set(true);
    aapplication.updated_at = Set(Utc::now().naive_utc());

    Ok(aapplication.update(db).await?)
}

pub async fn get_application_archive(
    store: &dyn ObjectStore,
    application: &MApplication,
) -> Result<Vec<u8>, ServiceError> {
    if !application.application_uploaded {
        return Err(ServiceError::NotFound("Application file".to_string()));
    }

    get_blob(
        store,
        &application_archive_key(application.id),
        "Application file",
    )
    .await
}

/// Drops the archive of an application whose row was deleted.
pub async fn discard_application_archive(
    store: &dyn ObjectStore,
    application_id: i32,
) -> Result<(), ServiceError> {
    discard_blob(store, &application_archive_key(application_id)).await
}

pub async fn delete_application_archive<C: ConnectionTrait>(
    db: &C,
    store: &dyn ObjectStore,
    application: MApplication,
) -> Result<MApplication, ServiceError> {
    let application_id = application.id;

    let mut aapplication = application.into_active_model();
    aapplication.application_uploaded = Set(false);
    aapplication.updated_at = Set(Utc::now().naive_utc());
    let application = aapplication.update(db).await?;

    discard_blob(store, &application_archive_key(application_id)).await?;

    Ok(application)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::NaiveDateTime;

    fn job_script_file(filename: &str, file_type: FileType) -> MJobScriptFile {
        let now = NaiveDateTime::default();

        MJobScriptFile {
            id: 1,
            filename: filename.to_string(),
            file_type,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_object_keys() {
        assert_eq!(
            template_file_key(3, "entrypoint.sh.j2"),
            "job_script_templates/3/entrypoint.sh.j2"
        );
        assert_eq!(workflow_file_key(3), "workflow_files/3/jobbergate.py");
        assert_eq!(job_script_file_key(7, "run.sh"), "job_scripts/7/run.sh");
        assert_eq!(
            application_archive_key(9),
            "applications/9/jobbergate.tar.gz"
        );
    }

    #[test]
    fn test_single_entrypoint() {
        let files = vec![
            job_script_file("run.sh", FileType::Entrypoint),
            job_script_file("helper.py", FileType::Support),
        ];
        assert_eq!(
            single_entrypoint(&files).map(|f| f.filename.as_str()),
            Some("run.sh")
        );

        let files = vec![
            job_script_file("run.sh", FileType::Entrypoint),
            job_script_file("other.sh", FileType::Entrypoint),
        ];
        assert!(single_entrypoint(&files).is_none());

        assert!(single_entrypoint(&[]).is_none());
    }

    #[tokio::test]
    async fn test_discard_missing_blob() {
        let store = MemoryStore::new();
        store.put("job_scripts/1/run.sh", b"echo".to_vec()).await.unwrap();

        let files = vec![
            job_script_file("run.sh", FileType::Entrypoint),
            job_script_file("missing.sh", FileType::Support),
        ];

        discard_job_script_blobs(&store, 1, &files).await.unwrap();
        assert!(!store.contains("job_scripts/1/run.sh").await);
    }
}
