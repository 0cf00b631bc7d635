/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use jobbergate_core::permission::{Identity, Permission};
use jobbergate_core::types::*;
use std::sync::Arc;

use crate::error::{WebError, WebResult};

/// Verifies the bearer token and stores the caller's [`Identity`] in the request extensions.
pub async fn authorize(
    state: State<Arc<ServerState>>,
    mut req: Request,
    next: Next,
) -> WebResult<Response> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| WebError::Unauthorized("Authorization header not found".to_string()))?
        .to_str()
        .map_err(|_| WebError::Unauthorized("Authorization header empty".to_string()))?;

    let mut header = auth_header.split_whitespace();

    let token = match (header.next(), header.next()) {
        (Some("Bearer"), Some(token)) => token.to_string(),
        _ => {
            return Err(WebError::Unauthorized(
                "Invalid Authorization header".to_string(),
            ));
        }
    };

    let claims = state.verifier.verify(&token).await.map_err(|e| {
        tracing::debug!(error = %e, "Rejected access token");
        WebError::Unauthorized("Unable to decode token".to_string())
    })?;

    let identity = Identity::from_claims(claims)?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

pub fn require_permission(identity: &Identity, permission: Permission) -> WebResult<()> {
    if identity.has(permission) {
        Ok(())
    } else {
        tracing::debug!(email = %identity.email, permission = %permission, "Permission denied");
        Err(WebError::missing_permission(permission.as_str()))
    }
}
