/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod consts;
pub mod database;
pub mod files;
pub mod input;
pub mod permission;
pub mod render;
pub mod service;
pub mod storage;
pub mod types;

use anyhow::Result;
use database::connect_db;
use permission::TokenVerifier;
use std::sync::Arc;
use storage::connect_store;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use types::*;

pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}

pub async fn init_state(cli: Cli) -> Result<Arc<ServerState>> {
    tracing::info!("Starting Jobbergate API on {}:{}", cli.ip, cli.port);

    let db = connect_db(&cli).await?;
    let store = connect_store(&cli)?;
    let verifier = TokenVerifier::from_cli(&cli).await?;

    Ok(Arc::new(ServerState {
        db,
        cli,
        store,
        verifier,
    }))
}
