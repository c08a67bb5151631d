// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The diagnostics sink for recoverable migration findings.

use std::sync::Mutex;

/// Where the migration engine reports recoverable findings.
///
/// Structural mismatches between two universes are expected during live
/// editing, so the engine never turns them into errors: it reports them
/// through this sink exactly once per occurrence and continues with the
/// slot left at its zero value.
pub trait DiagnosticsSink: Send + Sync {
    /// Reports a recoverable finding (skipped member, dropped type, ...).
    fn warn(&self, message: &str);

    /// Reports a finding that lost data and deserves a closer look.
    fn error(&self, message: &str);
}

/// The default sink, forwarding to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl DiagnosticsSink for LogDiagnostics {
    fn warn(&self, message: &str) {
        log::warn!(target: "proteus", "{message}");
    }

    fn error(&self, message: &str) {
        log::error!(target: "proteus", "{message}");
    }
}

/// Level of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    /// Recoverable finding.
    Warning,
    /// Data-losing finding.
    Error,
}

/// One finding captured by [`MemoryDiagnostics`].
#[derive(Debug, Clone)]
pub struct DiagnosticRecord {
    /// Severity of the finding.
    pub level: DiagnosticLevel,
    /// Human-readable description.
    pub message: String,
}

/// A recording sink used by tests and the editor's reload panel.
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemoryDiagnostics {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything recorded so far.
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Returns the recorded warning messages, in order.
    pub fn warnings(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.level == DiagnosticLevel::Warning)
            .map(|r| r.message.clone())
            .collect()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }

    fn push(&self, level: DiagnosticLevel, message: &str) {
        self.records.lock().unwrap().push(DiagnosticRecord {
            level,
            message: message.to_string(),
        });
    }
}

impl DiagnosticsSink for MemoryDiagnostics {
    fn warn(&self, message: &str) {
        self.push(DiagnosticLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.push(DiagnosticLevel::Error, message);
    }
}
