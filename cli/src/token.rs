/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result, anyhow};
use connector::auth::TokenSet;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

const ACCESS_TOKEN_FILE: &str = "access.token";
const REFRESH_TOKEN_FILE: &str = "refresh.token";

/// Seconds before the real expiry at which a token counts as expired.
const EXPIRY_LEEWAY: i64 = 10;

#[derive(Deserialize, Debug)]
pub struct TokenClaims {
    pub exp: Option<i64>,
    pub email: Option<String>,
}

/// On-disk cache of the access and refresh tokens.
#[derive(Debug, Clone)]
pub struct TokenCache {
    dir: PathBuf,
}

impl TokenCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn open() -> Result<Self> {
        let mut dir = dirs::cache_dir().ok_or_else(|| anyhow!("Could not find cache directory"))?;
        dir.push("jobbergate");
        Ok(Self::new(dir))
    }

    fn read(&self, name: &str) -> Result<Option<String>> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(None);
        }

        let token = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let token = token.trim();

        Ok((!token.is_empty()).then(|| token.to_string()))
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        self.read(ACCESS_TOKEN_FILE)
    }

    pub fn refresh_token(&self) -> Result<Option<String>> {
        self.read(REFRESH_TOKEN_FILE)
    }

    pub fn save(&self, tokens: &TokenSet) -> Result<()> {
        fs::create_dir_all(&self.dir).context("Failed to create token cache directory")?;
        fs::write(self.dir.join(ACCESS_TOKEN_FILE), &tokens.access_token)
            .context("Failed to write access token")?;

        if let Some(refresh_token) = &tokens.refresh_token {
            fs::write(self.dir.join(REFRESH_TOKEN_FILE), refresh_token)
                .context("Failed to write refresh token")?;
        }

        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        for name in [ACCESS_TOKEN_FILE, REFRESH_TOKEN_FILE] {
            let path = self.dir.join(name);
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
        }

        Ok(())
    }
}

/// Reads the claims without checking the signature; the server does that.
pub fn unverified_claims(token: &str) -> Result<TokenClaims> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .context("Cached access token is malformed")
}

pub fn is_expired(token: &str, now: i64) -> Result<bool> {
    let claims = unverified_claims(token)?;
    Ok(match claims.exp {
        Some(exp) => exp - EXPIRY_LEEWAY <= now,
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    fn token_with_exp(exp: i64) -> String {
        encode(
            &Header::default(),
            &json!({"exp": exp, "email": "owner@example.com"}),
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_is_expired() {
        let now = 1_700_000_000;

        assert!(is_expired(&token_with_exp(now - 60), now).unwrap());
        assert!(is_expired(&token_with_exp(now + 5), now).unwrap());
        assert!(!is_expired(&token_with_exp(now + 3600), now).unwrap());
        assert!(is_expired("not-a-token", now).is_err());
    }

    #[test]
    fn test_unverified_claims_reads_email() {
        let claims = unverified_claims(&token_with_exp(1)).unwrap();
        assert_eq!(claims.email.as_deref(), Some("owner@example.com"));
    }

    #[test]
    fn test_token_cache() {
        let dir = std::env::temp_dir().join(format!("jobbergate-token-{}", std::process::id()));
        let cache = TokenCache::new(dir.clone());

        assert!(cache.access_token().unwrap().is_none());

        cache
            .save(&TokenSet {
                access_token: "access".to_string(),
                refresh_token: Some("refresh".to_string()),
            })
            .unwrap();

        assert_eq!(cache.access_token().unwrap().as_deref(), Some("access"));
        assert_eq!(cache.refresh_token().unwrap().as_deref(), Some("refresh"));

        cache.clear().unwrap();
        assert!(cache.refresh_token().unwrap().is_none());

        fs::remove_dir_all(dir).unwrap();
    }
}
