/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod commands;
mod config;
mod input;
mod output;
mod render;
mod token;

#[tokio::main]
async fn main() {
    commands::base::run_cli().await;
}
