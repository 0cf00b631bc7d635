/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for token claims and permission parsing

use jobbergate_core::permission::*;

fn claims() -> TokenClaims {
    TokenClaims {
        exp: 0,
        sub: Some("user".to_string()),
        email: Some("owner@example.com".to_string()),
        client_id: None,
        azp: None,
        permissions: Vec::new(),
        scope: None,
    }
}

#[test]
fn test_permissions_from_array_and_scope() {
    let identity = Identity::from_claims(TokenClaims {
        permissions: vec!["jobbergate:applications:view".to_string()],
        scope: Some("openid jobbergate:job-scripts:edit email".to_string()),
        ..claims()
    })
    .unwrap();

    assert!(identity.has(Permission::ApplicationsView));
    assert!(identity.has(Permission::JobScriptsEdit));
    assert!(!identity.has(Permission::ApplicationsEdit));
    assert_eq!(identity.permissions.len(), 2);
}

#[test]
fn test_missing_email() {
    let result = Identity::from_claims(TokenClaims {
        email: None,
        ..claims()
    });

    assert_eq!(result.unwrap_err(), IdentityError::MissingEmail);
}

#[test]
fn test_client_id_falls_back_to_azp() {
    let identity = Identity::from_claims(TokenClaims {
        azp: Some("cluster-agent".to_string()),
        ..claims()
    })
    .unwrap();
    assert_eq!(identity.client_id.as_deref(), Some("cluster-agent"));

    let identity = Identity::from_claims(TokenClaims {
        client_id: Some("primary".to_string()),
        azp: Some("cluster-agent".to_string()),
        ..claims()
    })
    .unwrap();
    assert_eq!(identity.client_id.as_deref(), Some("primary"));
}

#[test]
fn test_permission_strings() {
    for permission in Permission::all() {
        assert_eq!(permission.as_str().parse::<Permission>(), Ok(permission));
    }

    assert_eq!(
        Permission::JobTemplatesEdit.to_string(),
        "jobbergate:job-templates:edit"
    );
    assert!("jobbergate:admin".parse::<Permission>().is_err());
}
