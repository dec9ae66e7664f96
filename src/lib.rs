// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Codel Server - token-gated container service API
//!
//! Verifies access tokens issued by the society's Keycloak realm and gates
//! the container listing endpoints behind "authenticated" and
//! "authenticated admin" policies.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token verification and authorization middleware
//! - `backend` - Container management backend client
//! - `config` - Environment configuration

pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod state;
