/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusoto_core::{HttpClient, Region, RusotoError};
use rusoto_credential::StaticProvider;
use rusoto_s3::{
    DeleteObjectRequest, GetObjectError, GetObjectRequest, PutObjectRequest, S3, S3Client,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;

use super::input::load_secret;
use super::types::Cli;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Object store error: {0}")]
    Backend(String),
}

/// Blob storage for uploaded files, addressed by key.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, content: Vec<u8>) -> Result<(), StorageError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

pub struct S3Store {
    client: S3Client,
    bucket: String,
}

impl S3Store {
    pub fn new(cli: &Cli, bucket: String) -> Result<Self> {
        let region = match &cli.s3_endpoint_url {
            Some(endpoint) => Region::Custom {
                name: cli.s3_region.clone(),
                endpoint: endpoint.clone(),
            },
            None => cli
                .s3_region
                .parse::<Region>()
                .context("Invalid S3 region")?,
        };

        let http_client = HttpClient::new().context("Failed to create S3 http client")?;

        let client = match (&cli.s3_access_key_id, &cli.s3_secret_access_key_file) {
            (Some(access_key_id), Some(secret_file)) => {
                let credentials = StaticProvider::new_minimal(
                    access_key_id.clone(),
                    load_secret(secret_file)?,
                );
                S3Client::new_with(http_client, credentials, region)
            }
            _ => S3Client::new(region),
        };

        Ok(Self { client, bucket })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, content: Vec<u8>) -> Result<(), StorageError> {
        let request = PutObjectRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            body: Some(content.into()),
            ..Default::default()
        };

        self.client
            .put_object(request)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let request = GetObjectRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            ..Default::default()
        };

        let output = self.client.get_object(request).await.map_err(|e| match e {
            RusotoError::Service(GetObjectError::NoSuchKey(_)) => {
                StorageError::NotFound(key.to_string())
            }
            e => StorageError::Backend(e.to_string()),
        })?;

        let body = output
            .body
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;

        let mut content = Vec::new();
        let mut reader = Box::pin(body.into_async_read());
        reader
            .read_to_end(&mut content)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(content)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let request = DeleteObjectRequest {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            ..Default::default()
        };

        self.client
            .delete_object(request)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }
}

/// Keeps every blob in process memory.
#[derive(Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.files.read().await.contains_key(key)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, content: Vec<u8>) -> Result<(), StorageError> {
        self.files.write().await.insert(key.to_string(), content);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.files
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.files
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}

pub fn connect_store(cli: &Cli) -> Result<Arc<dyn ObjectStore>> {
    match &cli.s3_bucket_name {
        Some(bucket) => {
            tracing::info!(bucket = %bucket, "Using S3 object store");
            Ok(Arc::new(S3Store::new(cli, bucket.clone())?))
        }
        None => {
            tracing::warn!("No S3 bucket configured, uploaded files are kept in memory");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();

        store
            .put("job_scripts/1/entrypoint.sh", b"#!/bin/bash".to_vec())
            .await
            .unwrap();

        assert!(store.contains("job_scripts/1/entrypoint.sh").await);
        assert_eq!(
            store.get("job_scripts/1/entrypoint.sh").await.unwrap(),
            b"#!/bin/bash".to_vec()
        );

        store.delete("job_scripts/1/entrypoint.sh").await.unwrap();
        assert!(matches!(
            store.get("job_scripts/1/entrypoint.sh").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("job_scripts/1/entrypoint.sh").await,
            Err(StorageError::NotFound(_))
        ));
    }
}
