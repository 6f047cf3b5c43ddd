// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Infrastructure adapters
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Pool construction, DDL assembly and the external
//!   collaborators (identity provider, secure tunnel) behind domain traits

pub mod ddl;
pub mod google_identity;
pub mod pool;
pub mod proxy_dialer;
