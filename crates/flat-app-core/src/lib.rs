// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for the flattener tools (config, prefs).
//! Keeps the CLI and service adapters free of storage details.

pub mod config;
pub mod prefs;
