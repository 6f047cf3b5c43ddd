// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Application layer
//!
//! # Architecture
//!
//! - **Layer:** Application
//! - **Purpose:** Engine lifecycle and table provisioning use cases

pub mod config;
pub mod engine;
