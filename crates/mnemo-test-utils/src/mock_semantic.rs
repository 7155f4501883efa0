// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock semantic provider for deterministic scoring tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mnemo_core::{MnemoError, SemanticProvider};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy)]
enum Mode {
    Fixed(f64),
    Failing,
}

/// A semantic provider that returns a fixed similarity or always fails.
///
/// Scripted values, when queued, are returned first in FIFO order.
pub struct MockSemanticProvider {
    mode: Mode,
    scripted: Arc<Mutex<VecDeque<f64>>>,
    calls: AtomicUsize,
}

impl MockSemanticProvider {
    /// Always answers `value`.
    pub fn fixed(value: f64) -> Self {
        Self::with_mode(Mode::Fixed(value))
    }

    /// Always fails, which the linker reports as degraded scoring.
    pub fn failing() -> Self {
        Self::with_mode(Mode::Failing)
    }

    fn with_mode(mode: Mode) -> Self {
        Self {
            mode,
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queues `value` ahead of the fixed answer.
    pub async fn push(&self, value: f64) {
        self.scripted.lock().await.push_back(value);
    }

    /// Number of similarity requests served (including failed ones).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockSemanticProvider {
    fn default() -> Self {
        Self::fixed(0.0)
    }
}

#[async_trait]
impl SemanticProvider for MockSemanticProvider {
    fn name(&self) -> &str {
        "mock-semantic"
    }

    async fn similarity(&self, _a: &str, _b: &str) -> Result<f64, MnemoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(value) = self.scripted.lock().await.pop_front() {
            return Ok(value);
        }
        match self.mode {
            Mode::Fixed(value) => Ok(value),
            Mode::Failing => Err(MnemoError::Internal(
                "mock semantic provider is offline".to_string(),
            )),
        }
    }
}
