/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Result;
use clap::Parser;
use jobbergate_core::types::Cli;
use jobbergate_core::{init_logging, init_state};
use std::sync::Arc;

#[tokio::main]
pub async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let _guard = match (&cli.sentry_dsn, cli.report_errors) {
        (Some(dsn), true) => Some(sentry::init(dsn.as_str())),
        _ => None,
    };

    let state = init_state(cli).await?;

    web::serve_web(Arc::clone(&state)).await
}
