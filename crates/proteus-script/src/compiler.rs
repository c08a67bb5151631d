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

//! The script-compiler collaborator.
//!
//! Compilation is the one asynchronous step of a reload: it does real I/O
//! and real work, and it always completes before any migration starts. The
//! migration session itself is strictly synchronous.

use crate::types::UniverseDefs;
use async_trait::async_trait;
use proteus_core::compiler::{ChangeKind, CompileDiagnostic, CompileOptions, ProjectDescription};
use proteus_core::UniverseId;
use std::collections::HashMap;
use std::path::PathBuf;

/// The result of one compilation.
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    /// True when the compilation produced a usable universe.
    pub success: bool,
    /// The compiled type definitions, on success.
    pub universe: Option<UniverseDefs>,
    /// Path of the emitted artifact, when one was written.
    pub artifact: Option<PathBuf>,
    /// Everything the compiler had to say.
    pub diagnostics: Vec<CompileDiagnostic>,
}

impl CompileOutput {
    /// A successful output carrying `defs`.
    pub fn succeeded(defs: UniverseDefs) -> Self {
        Self {
            success: true,
            universe: Some(defs),
            artifact: None,
            diagnostics: Vec::new(),
        }
    }

    /// A failed output carrying the compiler's diagnostics.
    pub fn failed(diagnostics: Vec<CompileDiagnostic>) -> Self {
        Self {
            success: false,
            universe: None,
            artifact: None,
            diagnostics,
        }
    }
}

/// The script compiler as the reload pipeline sees it.
///
/// Implementations live outside this workspace (the real toolchain) or in
/// tests and the demo (stub compilers returning hand-built definitions).
/// A reload is only ever started from a successful output; on failure the
/// running universe stays untouched.
#[async_trait]
pub trait ScriptCompiler: Send + Sync {
    /// Compiles a whole project from scratch.
    async fn compile(
        &self,
        project: &ProjectDescription,
        options: &CompileOptions,
    ) -> CompileOutput;

    /// Recompiles against an existing universe, given the set of changed
    /// sources.
    async fn incremental_compile(
        &self,
        existing: UniverseId,
        changed: &HashMap<PathBuf, ChangeKind>,
        options: &CompileOptions,
    ) -> CompileOutput;
}
