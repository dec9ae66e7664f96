// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixture keys and token builders shared by the auth tests.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

use super::claims::IdentityClaims;
use super::keys::SigningKey;
use super::verifier::TokenVerifier;

pub(crate) const SIGNING_PRIVATE_PEM: &str = include_str!("../../testdata/signing_key.pem");
pub(crate) const SIGNING_PUBLIC_PEM: &str = include_str!("../../testdata/signing_key.pub.pem");
pub(crate) const FOREIGN_PRIVATE_PEM: &str = include_str!("../../testdata/foreign_key.pem");
pub(crate) const EC_PRIVATE_PEM: &str = include_str!("../../testdata/ec_key.pem");
pub(crate) const EC_PUBLIC_PEM: &str = include_str!("../../testdata/ec_key.pub.pem");
pub(crate) const ED_PRIVATE_PEM: &str = include_str!("../../testdata/ed_key.pem");
pub(crate) const ED_PUBLIC_PEM: &str = include_str!("../../testdata/ed_key.pub.pem");

/// Verifier trusting the fixture RSA key.
pub(crate) fn verifier() -> TokenVerifier {
    TokenVerifier::new(SigningKey::from_pem(SIGNING_PUBLIC_PEM).unwrap())
}

/// Verifier trusting the fixture P-256 key.
pub(crate) fn ec_verifier() -> TokenVerifier {
    TokenVerifier::new(SigningKey::from_pem(EC_PUBLIC_PEM).unwrap())
}

/// Verifier trusting the fixture Ed25519 key.
pub(crate) fn ed_verifier() -> TokenVerifier {
    TokenVerifier::new(SigningKey::from_pem(ED_PUBLIC_PEM).unwrap())
}

pub(crate) fn sample_claims(groups: &[&str]) -> IdentityClaims {
    IdentityClaims {
        exp: 4_102_444_800,
        iat: 1_700_000_000,
        iss: "https://sso.compsoc.ie/auth/realms/base".to_string(),
        name: Some("Jane Doe".to_string()),
        preferred_username: "jdoe".to_string(),
        given_name: Some("Jane".to_string()),
        family_name: Some("Doe".to_string()),
        email: Some("jdoe@example.com".to_string()),
        gid_numbers: vec![100],
        groups: groups.iter().map(|g| g.to_string()).collect(),
    }
}

pub(crate) fn sign_rsa<T: Serialize>(alg: Algorithm, claims: &T, private_pem: &str) -> String {
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap();
    encode(&Header::new(alg), claims, &key).unwrap()
}

/// RS256 token for `groups`, signed by the trusted key.
pub(crate) fn signed_token(groups: &[&str]) -> String {
    sign_rsa(Algorithm::RS256, &sample_claims(groups), SIGNING_PRIVATE_PEM)
}

/// RS256 token for `groups`, signed by an unrelated key.
pub(crate) fn foreign_token(groups: &[&str]) -> String {
    sign_rsa(Algorithm::RS256, &sample_claims(groups), FOREIGN_PRIVATE_PEM)
}
