/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#![allow(dead_code)]

use axum_test::TestServer;
use chrono::{NaiveDateTime, Utc};
use jobbergate_core::permission::{Permission, TokenClaims, TokenVerifier};
use jobbergate_core::storage::{MemoryStore, ObjectStore};
use jobbergate_core::types::*;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, encode};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub const TEST_SECRET: &str = "jobbergate-test-secret";
pub const OWNER_EMAIL: &str = "owner@example.com";
pub const UPLOAD_LIMIT: u64 = 64;

pub fn create_mock_cli() -> Cli {
    Cli {
        log_level: "debug".to_string(),
        ip: "127.0.0.1".to_string(),
        port: 8000,
        cors_origin: None,
        database_url: Some("mock://test".to_string()),
        database_url_file: None,
        s3_bucket_name: None,
        s3_endpoint_url: None,
        s3_region: "us-east-1".to_string(),
        s3_access_key_id: None,
        s3_secret_access_key_file: None,
        max_upload_file_size: UPLOAD_LIMIT,
        oidc_discovery_url: None,
        oidc_audience: None,
        jwt_secret_file: None,
        report_errors: false,
        sentry_dsn: None,
    }
}

pub fn create_mock_state(db: DatabaseConnection, store: Arc<dyn ObjectStore>) -> Arc<ServerState> {
    Arc::new(ServerState {
        db,
        cli: create_mock_cli(),
        store,
        verifier: TokenVerifier::Secret(DecodingKey::from_secret(TEST_SECRET.as_bytes())),
    })
}

pub fn create_test_server(db: DatabaseConnection) -> TestServer {
    create_test_server_with_store(db, Arc::new(MemoryStore::new()))
}

pub fn create_test_server_with_store(
    db: DatabaseConnection,
    store: Arc<dyn ObjectStore>,
) -> TestServer {
    let router = web::create_router(create_mock_state(db, store)).unwrap();
    TestServer::new(router).unwrap()
}

pub fn encode_claims(claims: &TokenClaims) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn claims(permissions: &[Permission]) -> TokenClaims {
    TokenClaims {
        exp: (Utc::now().timestamp() + 3600) as usize,
        sub: Some("owner".to_string()),
        email: Some(OWNER_EMAIL.to_string()),
        client_id: Some("test-cluster".to_string()),
        azp: None,
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        scope: None,
    }
}

pub fn token(permissions: &[Permission]) -> String {
    encode_claims(&claims(permissions))
}

pub fn application(id: i32, identifier: Option<&str>) -> MApplication {
    MApplication {
        id,
        application_name: "rats".to_string(),
        application_identifier: identifier.map(str::to_string),
        application_description: "counts rats".to_string(),
        application_owner_email: OWNER_EMAIL.to_string(),
        application_file: String::new(),
        application_config: String::new(),
        application_uploaded: false,
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}

pub fn job_script(id: i32) -> MJobScript {
    MJobScript {
        id,
        name: "rats".to_string(),
        description: None,
        owner_email: OWNER_EMAIL.to_string(),
        application_id: Some(1),
        parent_template_id: None,
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}

pub fn job_script_template(id: i32) -> MJobScriptTemplate {
    MJobScriptTemplate {
        id,
        identifier: Some("rats".to_string()),
        name: "rats".to_string(),
        description: None,
        owner_email: OWNER_EMAIL.to_string(),
        template_vars: serde_json::json!({}),
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}
