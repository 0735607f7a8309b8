//! Advisory diagnostics
//!
//! Recoverable findings never change the exit status. Each one is logged
//! through `tracing` at the moment it is recorded and kept for callers that
//! want to inspect them.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Hexadecimal constant outside any family with no name heuristic match
    UngroupedDefine,
    /// Bit-field constant outside any family with no name heuristic match
    UngroupedBitfield,
    /// Prototype block that could not be decomposed
    MalformedPrototype,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Constant or entry point name
    pub symbol: String,
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::UngroupedDefine => {
                write!(f, "Ungrouped #define {} {}", self.symbol, self.detail)
            }
            DiagnosticKind::UngroupedBitfield => {
                write!(f, "Ungrouped bitfield {} {}", self.symbol, self.detail)
            }
            DiagnosticKind::MalformedPrototype => {
                write!(f, "Skipped prototype {}: {}", self.symbol, self.detail)
            }
        }
    }
}

/// Ordered sink shared by the scanner callers and the classifier
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, kind: DiagnosticKind, symbol: impl Into<String>, detail: impl Into<String>) {
        let diagnostic = Diagnostic {
            kind,
            symbol: symbol.into(),
            detail: detail.into(),
        };
        tracing::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
