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

//! Data types crossing the script-compiler boundary.
//!
//! The compiler trait itself lives in `proteus-script`, next to the type
//! definitions it produces; this module holds the payload-free pieces the
//! rest of the engine needs without pulling in the type-universe model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What happened to a watched source file since the last compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// The file is new.
    Created,
    /// The file's content changed.
    Changed,
    /// The file was removed.
    Deleted,
    /// The file was moved or renamed.
    Renamed,
}

/// Describes the script project a compilation operates on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDescription {
    /// Project name, used in logs and artifact paths.
    pub name: String,
    /// Root directory of the project.
    pub root: PathBuf,
    /// Source files belonging to the project.
    pub sources: Vec<PathBuf>,
}

/// Options applied to one compilation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Emit debug information into the compiled artifact.
    pub emit_debug_info: bool,
    /// Conditional-compilation symbols passed to the compiler.
    pub defines: Vec<String>,
}

/// Severity of a compiler diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// The compilation can still succeed.
    Warning,
    /// The compilation failed.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One message produced by the script compiler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileDiagnostic {
    /// Whether the message is fatal for the compilation.
    pub severity: Severity,
    /// Compiler message text.
    pub message: String,
    /// Source file the message points at, if any.
    pub file: Option<PathBuf>,
    /// One-based line number, if known.
    pub line: Option<u32>,
}

impl CompileDiagnostic {
    /// Shorthand for an error with no source location.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            file: None,
            line: None,
        }
    }

    /// Shorthand for a warning with no source location.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            file: None,
            line: None,
        }
    }
}

impl fmt::Display for CompileDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}", file.display())?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{}: {}", self.severity, self.message)
    }
}
