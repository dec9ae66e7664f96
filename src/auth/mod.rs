// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer token verification and request gating for the Codel API.
//!
//! ## Auth Flow
//!
//! 1. The CLI obtains an access token from the Keycloak realm
//! 2. The CLI sends `Authorization: Bearer <token>`
//! 3. The server:
//!    - Extracts the credential from the header
//!    - Verifies the signature against the realm public key
//!    - For admin routes, decodes the claims and looks for an admin group
//!
//! ## Security
//!
//! - The signing key is loaded once at startup; a bad key aborts startup
//! - Only asymmetric algorithms matching the key type are accepted
//! - Every rejection is the same opaque `401`

pub mod claims;
pub mod error;
pub mod extractor;
pub mod keys;
pub mod middleware;
pub mod roles;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::{decode_claims, IdentityClaims};
pub use error::AuthError;
pub use extractor::{extract_token, Identity};
pub use keys::{KeyError, KeyFamily, KeySource, SigningKey};
pub use middleware::{authenticate, authenticate_only, authorize_admin, require_admin};
pub use roles::{Role, ADMIN_GROUP_MARKER};
pub use verifier::{TokenVerifier, VerifiedToken};
