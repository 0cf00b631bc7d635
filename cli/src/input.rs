/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::config::*;
use crate::token::{TokenCache, is_expired};
use anyhow::{Context, Result, anyhow, bail};
use connector::RequestConfig;
use connector::auth::{OidcConfig, post_refresh_token};
use std::io::{self, BufRead, Write};

pub fn ask_for_input(prompt: &str) -> Result<String> {
    let inp = ask_with_default(prompt, None)?;

    if inp.is_empty() {
        bail!("{} cannot be empty.", prompt);
    }

    Ok(inp)
}

/// An empty answer selects `default`.
pub fn ask_with_default(prompt: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(default) => print!("{} [{}]: ", prompt, default),
        None => print!("{}: ", prompt),
    }
    io::stdout().flush()?;

    let mut inp = String::new();
    io::stdin()
        .lock()
        .read_line(&mut inp)
        .with_context(|| format!("Failed to read {}.", prompt))?;
    let inp = inp.trim();

    Ok(match (inp.is_empty(), default) {
        (true, Some(default)) => default.to_string(),
        _ => inp.to_string(),
    })
}

pub fn oidc_config(config: &Config) -> Result<OidcConfig> {
    let domain = config.get(&ConfigKey::OidcDomain).cloned().ok_or_else(|| {
        anyhow!("OIDC domain not set. Use `jobbergate config oidc_domain <domain>` to set it.")
    })?;
    let client_id = config.get(&ConfigKey::OidcClientId).cloned().ok_or_else(|| {
        anyhow!("OIDC client id not set. Use `jobbergate config oidc_client_id <id>` to set it.")
    })?;

    Ok(OidcConfig {
        domain,
        client_id,
        audience: config.get(&ConfigKey::OidcAudience).cloned(),
    })
}

/// Loads the cached access token, refreshing it first when it has expired.
pub async fn get_request_config(config: &Config) -> Result<RequestConfig> {
    let server_url = config.get(&ConfigKey::Server).cloned().ok_or_else(|| {
        anyhow!("Server URL not set. Use `jobbergate config server <url>` to set it.")
    })?;

    let cache = TokenCache::open()?;
    let mut token = cache.access_token()?;

    if let Some(access_token) = &token {
        let now = chrono::Utc::now().timestamp();
        if is_expired(access_token, now)? {
            tracing::debug!("Access token expired, refreshing");

            let refresh_token = cache
                .refresh_token()?
                .ok_or_else(|| anyhow!("Session expired. Use `jobbergate login` to log in."))?;
            let tokens = post_refresh_token(&oidc_config(config)?, &refresh_token).await?;
            cache.save(&tokens)?;
            token = Some(tokens.access_token);
        }
    }

    Ok(RequestConfig { server_url, token })
}
