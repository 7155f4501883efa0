// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider traits consumed by the linking engine.

pub mod semantic;

pub use semantic::SemanticProvider;
