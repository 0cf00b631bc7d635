/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! OIDC device-code login and token refresh against the identity provider.

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Identity provider settings taken from the CLI configuration.
#[derive(Debug, Clone)]
pub struct OidcConfig {
    pub domain: String,
    pub client_id: String,
    pub audience: Option<String>,
}

impl OidcConfig {
    fn url(&self, path: &str) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.starts_with("http://") || domain.starts_with("https://") {
            format!("{}/{}", domain, path)
        } else {
            format!("https://{}/{}", domain, path)
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DeviceCodeResponse {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub verification_uri_complete: Option<String>,
    pub expires_in: u64,
    #[serde(default = "default_interval")]
    pub interval: u64,
}

fn default_interval() -> u64 {
    5
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TokenErrorResponse {
    error: String,
    error_description: Option<String>,
}

#[derive(Serialize, Debug)]
struct DeviceCodeRequest<'a> {
    client_id: &'a str,
    scope: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    audience: Option<&'a str>,
}

#[derive(Serialize, Debug)]
struct DeviceTokenRequest<'a> {
    grant_type: &'a str,
    device_code: &'a str,
    client_id: &'a str,
}

#[derive(Serialize, Debug)]
struct RefreshTokenRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
    client_id: &'a str,
}

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Outcome of a single poll of the token endpoint.
#[derive(Debug, PartialEq)]
pub enum PollState {
    Pending,
    SlowDown,
}

pub async fn post_device_code(config: &OidcConfig) -> Result<DeviceCodeResponse> {
    let req = DeviceCodeRequest {
        client_id: &config.client_id,
        scope: "openid email profile offline_access",
        audience: config.audience.as_deref(),
    };

    let res = reqwest::Client::new()
        .post(config.url("oauth/device/code"))
        .form(&req)
        .send()
        .await
        .context("Identity provider unreachable")?;

    if !res.status().is_success() {
        let body = res.text().await.unwrap_or_default();
        bail!("Failed to start device login: {}", body);
    }

    res.json()
        .await
        .context("Invalid device code response")
}

/// Maps the provider's error code to a poll state, or fails for anything final.
pub fn classify_token_error(error: &str, description: Option<&str>) -> Result<PollState> {
    match error {
        "authorization_pending" => Ok(PollState::Pending),
        "slow_down" => Ok(PollState::SlowDown),
        "expired_token" => Err(anyhow!("Login request expired, please try again")),
        "access_denied" => Err(anyhow!("Login was denied")),
        other => Err(anyhow!(
            "Login failed: {}",
            description.unwrap_or(other)
        )),
    }
}

/// Polls the token endpoint until the user finishes the login or the device code expires.
pub async fn poll_device_token(
    config: &OidcConfig,
    device: &DeviceCodeResponse,
) -> Result<TokenSet> {
    let client = reqwest::Client::new();
    let deadline = Instant::now() + Duration::from_secs(device.expires_in);
    let mut interval = Duration::from_secs(device.interval.max(1));

    let req = DeviceTokenRequest {
        grant_type: DEVICE_CODE_GRANT,
        device_code: &device.device_code,
        client_id: &config.client_id,
    };

    while Instant::now() < deadline {
        tokio::time::sleep(interval).await;

        let res = client
            .post(config.url("oauth/token"))
            .form(&req)
            .send()
            .await
            .context("Identity provider unreachable")?;

        if res.status().is_success() {
            return res.json().await.context("Invalid token response");
        }

        let err: TokenErrorResponse = res.json().await.context("Invalid token error response")?;
        match classify_token_error(&err.error, err.error_description.as_deref())? {
            PollState::Pending => tracing::debug!("Authorization pending"),
            PollState::SlowDown => {
                interval += Duration::from_secs(5);
                tracing::debug!(interval = interval.as_secs(), "Slowing down token polling");
            }
        }
    }

    bail!("Login request expired, please try again")
}

pub async fn post_refresh_token(config: &OidcConfig, refresh_token: &str) -> Result<TokenSet> {
    let req = RefreshTokenRequest {
        grant_type: "refresh_token",
        refresh_token,
        client_id: &config.client_id,
    };

    let res = reqwest::Client::new()
        .post(config.url("oauth/token"))
        .form(&req)
        .send()
        .await
        .context("Identity provider unreachable")?;

    if !res.status().is_success() {
        let body = res.text().await.unwrap_or_default();
        bail!("Failed to refresh access token: {}", body);
    }

    let mut tokens: TokenSet = res.json().await.context("Invalid token response")?;
    if tokens.refresh_token.is_none() {
        tokens.refresh_token = Some(refresh_token.to_string());
    }

    Ok(tokens)
}
