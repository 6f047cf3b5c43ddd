// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: configuration, identity and table options.
//!
//! Nothing in here talks to the network except [`identity::resolve_identity`],
//! which may ask the configured [`identity::EmailRetriever`] for the caller's
//! IAM principal.

pub mod config;
pub mod dialer;
pub mod identity;
pub mod settings;
pub mod table;
