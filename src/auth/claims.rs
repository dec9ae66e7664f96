// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity claims carried in a verified token's payload.

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::roles::Role;
use super::verifier::VerifiedToken;
use super::AuthError;

/// Claims issued by the identity provider (Keycloak realm tokens).
///
/// Unknown payload fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Expiration timestamp
    pub exp: i64,

    /// Issued at timestamp
    pub iat: i64,

    /// Issuer (realm URL)
    pub iss: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Account username
    pub preferred_username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Secondary POSIX group ids
    #[serde(default, rename = "gidNumber")]
    pub gid_numbers: Vec<i64>,

    /// Group memberships, `provider/group-name` style
    #[serde(default, rename = "groupMapper")]
    pub groups: Vec<String>,
}

impl IdentityClaims {
    pub fn role(&self) -> Role {
        Role::from_groups(&self.groups)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    /// Expiry as a timestamp, if `exp` is in range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Decode the payload of a verified token.
///
/// Only a [`VerifiedToken`] is accepted, so claims can never be read from a
/// token whose signature was not checked first.
pub fn decode_claims(token: &VerifiedToken<'_>) -> Result<IdentityClaims, AuthError> {
    let payload = Base64UrlUnpadded::decode_vec(token.payload_segment())
        .map_err(|_| AuthError::MalformedClaims)?;

    serde_json::from_slice(&payload).map_err(|e| {
        tracing::debug!(error = %e, "Token payload does not match identity claims");
        AuthError::MalformedClaims
    })
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::Algorithm;
    use serde_json::json;

    use super::*;
    use crate::auth::test_support::{
        sample_claims, sign_rsa, signed_token, verifier, SIGNING_PRIVATE_PEM,
    };

    #[test]
    fn decodes_full_claims_record() {
        let claims = IdentityClaims {
            exp: 4_102_444_800,
            iat: 1_700_000_000,
            iss: "https://sso.compsoc.ie/auth/realms/base".to_string(),
            name: Some("Jane Doe".to_string()),
            preferred_username: "jdoe".to_string(),
            given_name: Some("Jane".to_string()),
            family_name: Some("Doe".to_string()),
            email: Some("jdoe@example.com".to_string()),
            gid_numbers: vec![100, 2001],
            groups: vec!["/users/staff".to_string(), "/adminteam/ops".to_string()],
        };
        let token = sign_rsa(Algorithm::RS256, &claims, SIGNING_PRIVATE_PEM);

        let verifier = verifier();
        let verified = verifier.verify(&token).unwrap();
        assert_eq!(decode_claims(&verified).unwrap(), claims);
    }

    #[test]
    fn decodes_minimal_claims_record() {
        let claims = IdentityClaims {
            exp: 4_102_444_800,
            iat: 1_700_000_000,
            iss: "https://sso.compsoc.ie/auth/realms/base".to_string(),
            name: None,
            preferred_username: "jdoe".to_string(),
            given_name: None,
            family_name: None,
            email: None,
            gid_numbers: Vec::new(),
            groups: Vec::new(),
        };
        let token = sign_rsa(Algorithm::RS256, &claims, SIGNING_PRIVATE_PEM);

        let verifier = verifier();
        let verified = verifier.verify(&token).unwrap();
        assert_eq!(verified.claims().unwrap(), claims);
    }

    #[test]
    fn uses_provider_field_names() {
        let value = serde_json::to_value(sample_claims(&["adminteam/ops"])).unwrap();
        assert_eq!(value["groupMapper"], json!(["adminteam/ops"]));
        assert!(value.get("gidNumber").is_some());
        assert!(value.get("groups").is_none());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let payload = json!({
            "exp": 4_102_444_800_i64,
            "iat": 1_700_000_000_i64,
            "iss": "https://sso.compsoc.ie/auth/realms/base",
            "preferred_username": "jdoe",
            "groupMapper": ["/users/staff"],
            "azp": "codel",
            "realm_access": { "roles": ["offline_access"] },
            "session_state": "8b1d",
        });
        let token = sign_rsa(Algorithm::RS256, &payload, SIGNING_PRIVATE_PEM);

        let verifier = verifier();
        let claims = verifier.verify(&token).unwrap().claims().unwrap();
        assert_eq!(claims.preferred_username, "jdoe");
        assert_eq!(claims.groups, vec!["/users/staff".to_string()]);
        assert!(claims.gid_numbers.is_empty());
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let payload = json!({
            "exp": 4_102_444_800_i64,
            "iat": 1_700_000_000_i64,
            "iss": "https://sso.compsoc.ie/auth/realms/base",
        });
        let token = sign_rsa(Algorithm::RS256, &payload, SIGNING_PRIVATE_PEM);

        let verifier = verifier();
        let verified = verifier.verify(&token).unwrap();
        assert_eq!(decode_claims(&verified).unwrap_err(), AuthError::MalformedClaims);
    }

    #[test]
    fn wrongly_typed_group_list_is_malformed() {
        let payload = json!({
            "exp": 4_102_444_800_i64,
            "iat": 1_700_000_000_i64,
            "iss": "https://sso.compsoc.ie/auth/realms/base",
            "preferred_username": "jdoe",
            "groupMapper": "adminteam",
        });
        let token = sign_rsa(Algorithm::RS256, &payload, SIGNING_PRIVATE_PEM);

        let verifier = verifier();
        let verified = verifier.verify(&token).unwrap();
        assert_eq!(verified.claims().unwrap_err(), AuthError::MalformedClaims);
    }

    #[test]
    fn admin_is_derived_from_groups() {
        let token = signed_token(&["adminteam/ops"]);
        let verifier = verifier();
        let claims = verifier.verify(&token).unwrap().claims().unwrap();
        assert!(claims.is_admin());
        assert_eq!(claims.role(), Role::Admin);

        assert!(!sample_claims(&["users/staff"]).is_admin());
    }

    #[test]
    fn expires_at_converts_exp() {
        let claims = sample_claims(&[]);
        assert_eq!(claims.expires_at().unwrap().timestamp(), claims.exp);
    }
}
