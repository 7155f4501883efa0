// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic similarity provider trait.

use async_trait::async_trait;

use crate::error::MnemoError;

/// Source of semantic (embedding-style) similarity between two texts.
///
/// The linker treats this as a soft dependency: any error returned here is
/// logged as degraded scoring and replaced by lexical overlap.
#[async_trait]
pub trait SemanticProvider: Send + Sync + 'static {
    /// Human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Similarity between `a` and `b` in `[0, 1]`.
    async fn similarity(&self, a: &str, b: &str) -> Result<f64, MnemoError>;
}
