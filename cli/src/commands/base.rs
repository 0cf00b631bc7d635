/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::*;
use crate::config::*;
use crate::input::*;
use crate::output::OutputFormat;
use crate::token::{TokenCache, unverified_claims};
use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, arg};
use clap_complete::{Shell, generate};
use connector::auth;
use std::io;
use std::process::exit;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "Jobbergate",
    display_name = "Jobbergate",
    bin_name = "jobbergate",
    author = "Wavelens",
    version,
    about,
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    cmd: Option<MainCommands>,
    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Print results as JSON.
    #[arg(long, global = true)]
    raw: bool,
    /// Print every field of the results.
    #[arg(long, global = true, requires = "raw")]
    full: bool,
    #[arg(long, value_enum)]
    generate_completions: Option<Shell>,
}

#[derive(Subcommand, Debug)]
enum MainCommands {
    /// Show or set a configuration value.
    Config { key: String, value: Option<String> },
    /// Check that the server is reachable.
    Status,
    /// Log in through the identity provider.
    Login,
    Logout,
    ShowToken,
    Applications {
        #[command(subcommand)]
        cmd: applications::Commands,
    },
    JobTemplates {
        #[command(subcommand)]
        cmd: job_templates::Commands,
    },
    JobScripts {
        #[command(subcommand)]
        cmd: job_scripts::Commands,
    },
    JobSubmissions {
        #[command(subcommand)]
        cmd: job_submissions::Commands,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

async fn login() -> Result<()> {
    let config = load_config()?;
    let oidc = oidc_config(&config)?;

    let device = auth::post_device_code(&oidc).await?;
    println!(
        "Open {} and enter the code {}",
        device
            .verification_uri_complete
            .as_deref()
            .unwrap_or(&device.verification_uri),
        device.user_code
    );
    println!("Waiting for the login to complete...");

    let tokens = auth::poll_device_token(&oidc, &device).await?;
    TokenCache::open()?.save(&tokens)?;

    match unverified_claims(&tokens.access_token)?.email {
        Some(email) => println!("Logged in as {}.", email),
        None => println!("Logged in."),
    }

    Ok(())
}

async fn run(cmd: MainCommands, format: OutputFormat) -> Result<()> {
    match cmd {
        MainCommands::Config { key, value } => set_get_value_from_string(&key, value),

        MainCommands::Status => {
            let request_config = get_request_config(&load_config()?).await?;
            connector::health(&request_config).await?;
            println!("Server Online.");
            Ok(())
        }

        MainCommands::Login => login().await,

        MainCommands::Logout => {
            TokenCache::open()?.clear()?;
            println!("Logged out.");
            Ok(())
        }

        MainCommands::ShowToken => {
            let request_config = get_request_config(&load_config()?).await?;
            match request_config.token {
                Some(token) => println!("{}", token),
                None => println!("Not logged in. Use `jobbergate login` to log in."),
            }
            Ok(())
        }

        MainCommands::Applications { cmd } => applications::handle(cmd, format).await,
        MainCommands::JobTemplates { cmd } => job_templates::handle(cmd, format).await,
        MainCommands::JobScripts { cmd } => job_scripts::handle(cmd, format).await,
        MainCommands::JobSubmissions { cmd } => job_submissions::handle(cmd, format).await,
    }
}

pub async fn run_cli() {
    let cli = Cli::parse();

    if let Some(shell) = cli.generate_completions {
        let mut app = Cli::command();
        let bin_name = app.get_name().to_string();
        generate(shell, &mut app, bin_name, &mut io::stdout());
        return;
    }

    init_logging(cli.verbose);

    let sentry_dsn = get_value(ConfigKey::SentryDsn).ok().flatten();
    let _guard = sentry_dsn.map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let Some(cmd) = cli.cmd else {
        let _ = Cli::command().print_help();
        exit(1);
    };

    let format = OutputFormat {
        raw: cli.raw,
        full: cli.full,
    };

    tracing::debug!(command = ?cmd, "Running command");

    if let Err(e) = run(cmd, format).await {
        tracing::error!("{:#}", e);
        sentry::capture_message(&format!("{:#}", e), sentry::Level::Error);
        eprintln!("{:#}", e);

        drop(_guard);
        exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_full_requires_raw() {
        assert!(Cli::try_parse_from(["jobbergate", "--full", "applications", "list"]).is_err());
        assert!(
            Cli::try_parse_from(["jobbergate", "--raw", "--full", "applications", "list"]).is_ok()
        );
    }
}
