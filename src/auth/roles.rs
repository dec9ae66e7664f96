// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Fragment that marks an administrator group.
///
/// Matched as a substring anywhere in a group entry, so `/adminteam`,
/// `adminteam/ops` and `compsoc/adminteam-infra` all qualify.
pub const ADMIN_GROUP_MARKER: &str = "adminteam";

/// User roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Member of an admin team; may list every container
/// - `User` - Any other authenticated account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Administrative access
    Admin,
    /// Authenticated member
    User,
}

impl Role {
    /// Derive the role from a token's group memberships.
    pub fn from_groups<S: AsRef<str>>(groups: &[S]) -> Role {
        if groups
            .iter()
            .any(|group| group.as_ref().contains(ADMIN_GROUP_MARKER))
        {
            Role::Admin
        } else {
            Role::User
        }
    }
}

impl Default for Role {
    /// Least privilege for authenticated users.
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}
