/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::input::load_secret;
use super::types::Cli;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Permission {
    ApplicationsView,
    ApplicationsEdit,
    JobTemplatesView,
    JobTemplatesEdit,
    JobScriptsView,
    JobScriptsEdit,
    JobSubmissionsView,
    JobSubmissionsEdit,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ApplicationsView => "jobbergate:applications:view",
            Permission::ApplicationsEdit => "jobbergate:applications:edit",
            Permission::JobTemplatesView => "jobbergate:job-templates:view",
            Permission::JobTemplatesEdit => "jobbergate:job-templates:edit",
            Permission::JobScriptsView => "jobbergate:job-scripts:view",
            Permission::JobScriptsEdit => "jobbergate:job-scripts:edit",
            Permission::JobSubmissionsView => "jobbergate:job-submissions:view",
            Permission::JobSubmissionsEdit => "jobbergate:job-submissions:edit",
        }
    }

    pub fn all() -> [Permission; 8] {
        [
            Permission::ApplicationsView,
            Permission::ApplicationsEdit,
            Permission::JobTemplatesView,
            Permission::JobTemplatesEdit,
            Permission::JobScriptsView,
            Permission::JobScriptsEdit,
            Permission::JobSubmissionsView,
            Permission::JobSubmissionsEdit,
        ]
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::all()
            .into_iter()
            .find(|permission| permission.as_str() == s)
            .ok_or(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub exp: usize,
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub azp: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("Token does not carry an email address")]
    MissingEmail,
}

/// The caller of a request, built from a verified access token.
#[derive(Clone, Debug)]
pub struct Identity {
    pub email: String,
    pub client_id: Option<String>,
    pub permissions: HashSet<Permission>,
}

impl Identity {
    pub fn from_claims(claims: TokenClaims) -> Result<Self, IdentityError> {
        let email = claims
            .email
            .filter(|email| !email.is_empty())
            .ok_or(IdentityError::MissingEmail)?;

        // unknown scopes are ignored
        let permissions = claims
            .permissions
            .iter()
            .map(String::as_str)
            .chain(claims.scope.as_deref().unwrap_or_default().split_whitespace())
            .filter_map(|scope| scope.parse::<Permission>().ok())
            .collect();

        Ok(Identity {
            email,
            client_id: claims.client_id.or(claims.azp),
            permissions,
        })
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }
}

/// Minimum time between two signing key refreshes triggered by unknown key ids.
const JWKS_REFRESH_COOLDOWN: Duration = Duration::from_secs(30);

pub struct JwksCache {
    keys: JwkSet,
    refreshed_at: Option<Instant>,
}

pub enum TokenVerifier {
    /// Shared secret tokens (HS256), used for development setups.
    Secret(DecodingKey),
    /// Tokens signed by the OIDC provider. Keys are refetched from `jwks_uri`
    /// when a token names a key id that is not cached yet.
    Jwks {
        jwks_uri: String,
        cache: RwLock<JwksCache>,
        issuer: String,
        audience: Option<String>,
    },
}

impl TokenVerifier {
    pub async fn from_cli(cli: &Cli) -> Result<Self> {
        if let Some(discovery_url) = &cli.oidc_discovery_url {
            let metadata = get_oidc_metadata(discovery_url).await?;

            let issuer = metadata["issuer"]
                .as_str()
                .context("No issuer in OIDC metadata")?
                .to_string();

            let jwks_uri = metadata["jwks_uri"]
                .as_str()
                .context("No jwks_uri in OIDC metadata")?;

            let keys = fetch_jwks(jwks_uri).await?;

            tracing::info!(issuer = %issuer, keys = keys.keys.len(), "Loaded OIDC signing keys");

            return Ok(TokenVerifier::jwks(
                jwks_uri.to_string(),
                keys,
                issuer,
                cli.oidc_audience.clone(),
            ));
        }

        let secret_file = cli
            .jwt_secret_file
            .as_ref()
            .context("Either an OIDC discovery url or a JWT secret file is required")?;

        tracing::warn!("Verifying access tokens with a shared secret");
        let secret = load_secret(secret_file)?;

        Ok(TokenVerifier::Secret(DecodingKey::from_secret(
            secret.as_bytes(),
        )))
    }

    pub fn jwks(
        jwks_uri: String,
        keys: JwkSet,
        issuer: String,
        audience: Option<String>,
    ) -> Self {
        TokenVerifier::Jwks {
            jwks_uri,
            cache: RwLock::new(JwksCache {
                keys,
                refreshed_at: None,
            }),
            issuer,
            audience,
        }
    }

    pub async fn verify(&self, token: &str) -> Result<TokenClaims, JwtError> {
        match self {
            TokenVerifier::Secret(key) => {
                let mut validation = Validation::new(Algorithm::HS256);
                validation.validate_aud = false;

                Ok(decode::<TokenClaims>(token, key, &validation)?.claims)
            }

            TokenVerifier::Jwks {
                jwks_uri,
                cache,
                issuer,
                audience,
            } => {
                let header = decode_header(token)?;
                let kid = header
                    .kid
                    .ok_or_else(|| JwtError::from(ErrorKind::InvalidToken))?;

                let cached = find_key(&cache.read().await.keys, &kid)?;
                let key = match cached {
                    Some(key) => key,
                    None => refresh_keys(jwks_uri, cache, &kid)
                        .await?
                        .ok_or_else(|| JwtError::from(ErrorKind::InvalidKeyFormat))?,
                };

                let mut validation = Validation::new(header.alg);
                validation.set_issuer(&[issuer]);

                match audience {
                    Some(audience) => validation.set_audience(&[audience]),
                    None => validation.validate_aud = false,
                }

                Ok(decode::<TokenClaims>(token, &key, &validation)?.claims)
            }
        }
    }
}

fn find_key(keys: &JwkSet, kid: &str) -> Result<Option<DecodingKey>, JwtError> {
    keys.find(kid).map(DecodingKey::from_jwk).transpose()
}

async fn refresh_keys(
    jwks_uri: &str,
    cache: &RwLock<JwksCache>,
    kid: &str,
) -> Result<Option<DecodingKey>, JwtError> {
    let mut cache = cache.write().await;

    // another request may have refreshed while this one waited for the lock
    if let Some(key) = find_key(&cache.keys, kid)? {
        return Ok(Some(key));
    }

    if cache
        .refreshed_at
        .is_some_and(|refreshed_at| refreshed_at.elapsed() < JWKS_REFRESH_COOLDOWN)
    {
        return Ok(None);
    }

    match fetch_jwks(jwks_uri).await {
        Ok(keys) => {
            tracing::info!(kid, keys = keys.keys.len(), "Refreshed OIDC signing keys");
            cache.keys = keys;
        }
        Err(e) => tracing::warn!(error = %e, "Failed to refresh OIDC signing keys"),
    }

    cache.refreshed_at = Some(Instant::now());
    find_key(&cache.keys, kid)
}

async fn fetch_jwks(jwks_uri: &str) -> Result<JwkSet> {
    let http_client = reqwest::ClientBuilder::new()
        .timeout(Duration::from_secs(10))
        .build()
        .context("Failed to create HTTP client")?;

    http_client
        .get(jwks_uri)
        .send()
        .await
        .context("Failed to fetch OIDC signing keys")?
        .json::<JwkSet>()
        .await
        .context("Failed to parse OIDC signing keys")
}

async fn get_oidc_metadata(discovery_url: &str) -> Result<serde_json::Value> {
    let http_client = reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .context("Failed to create HTTP client")?;

    let metadata = http_client
        .get(
            if discovery_url.ends_with("/.well-known/openid-configuration") {
                discovery_url.to_string()
            } else {
                format!(
                    "{}/.well-known/openid-configuration",
                    discovery_url.trim_end_matches('/')
                )
            },
        )
        .send()
        .await
        .context("Failed to fetch OIDC metadata")?
        .json::<serde_json::Value>()
        .await
        .context("Failed to parse OIDC metadata")?;

    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const ISSUER: &str = "https://auth.example.com/";
    const ROTATED_SECRET: &[u8] = b"rotated-signing-secret";

    /// Serves `body` as the key set and counts how often it was fetched.
    async fn serve_jwks(body: serde_json::Value) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let body = body.to_string();

        tokio::spawn(async move {
            loop {
                let (mut stream, _) = listener.accept().await.unwrap();
                counter.fetch_add(1, Ordering::SeqCst);

                let mut request = [0u8; 4096];
                let _ = stream.read(&mut request).await;

                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (format!("http://{}/jwks", addr), hits)
    }

    fn rotated_jwks() -> serde_json::Value {
        serde_json::json!({
            "keys": [{
                "kty": "oct",
                "kid": "rotated",
                "alg": "HS256",
                "k": "cm90YXRlZC1zaWduaW5nLXNlY3JldA"
            }]
        })
    }

    fn signed_token(kid: &str) -> String {
        let claims = serde_json::json!({
            "exp": 4_102_444_800u64,
            "iss": ISSUER,
            "email": "owner@example.com",
            "permissions": ["jobbergate:applications:view"],
        });
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(kid.to_string());

        encode(&header, &claims, &EncodingKey::from_secret(ROTATED_SECRET)).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_kid_refetches_keys() {
        let (jwks_uri, hits) = serve_jwks(rotated_jwks()).await;
        let verifier =
            TokenVerifier::jwks(jwks_uri, JwkSet { keys: Vec::new() }, ISSUER.to_string(), None);

        let claims = verifier.verify(&signed_token("rotated")).await.unwrap();
        assert_eq!(claims.email.as_deref(), Some("owner@example.com"));

        // the refreshed key is served from the cache
        verifier.verify(&signed_token("rotated")).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_kid_refresh_is_throttled() {
        let (jwks_uri, hits) = serve_jwks(rotated_jwks()).await;
        let verifier =
            TokenVerifier::jwks(jwks_uri, JwkSet { keys: Vec::new() }, ISSUER.to_string(), None);

        assert!(verifier.verify(&signed_token("unknown")).await.is_err());
        assert!(verifier.verify(&signed_token("unknown")).await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_secret_verifier() {
        let verifier = TokenVerifier::Secret(DecodingKey::from_secret(ROTATED_SECRET));

        let claims = verifier.verify(&signed_token("any")).await.unwrap();
        let identity = Identity::from_claims(claims).unwrap();

        assert!(identity.has(Permission::ApplicationsView));
        assert!(!identity.has(Permission::ApplicationsEdit));
    }
}
