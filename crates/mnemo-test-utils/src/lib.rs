// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mnemo integration tests.
//!
//! Provides a temporary storage root with ready-made store and task manager,
//! and mock semantic providers for deterministic scoring.
//!
//! # Components
//!
//! - [`TestHarness`] - temp storage root, config, store and task manager
//! - [`MockSemanticProvider`] - fixed, scripted or failing similarity

pub mod harness;
pub mod mock_semantic;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_semantic::MockSemanticProvider;
