//! Structured diagnostics and the sink they are handed to.
//!
//! Identifiers are stable: tooling keys off `PC0001` / `PC0002`.
use std::fmt;
use colored::Colorize;
use parking_lot::Mutex;
use serde::{Serialize, Serializer};

use crate::ir::Span;

pub const TITLE: &str = "PropertyChanged";
pub const CATEGORY: &str = "Usage";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticId {
    /// No helper method anywhere in the inheritance chain.
    HelperNotFound,
    /// Helper found, but its parameters match no supported call shape.
    HelperSignatureUnmatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Unit path; `None` for types that only exist as references.
    pub path: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub id: DiagnosticId,
    pub severity: Severity,
    pub location: Location,
    pub message: String,
    pub args: Vec<String>,
}

/// Receives diagnostics during a rewrite. Reports may arrive from several
/// workers at once and in any order.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: Diagnostic) {
        self(diagnostic)
    }
}

/// Collects everything reported to it.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    items: Mutex<Vec<Diagnostic>>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl DiagnosticId {
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticId::HelperNotFound => "PC0001",
            DiagnosticId::HelperSignatureUnmatched => "PC0002",
        }
    }

    pub fn message_format(self) -> &'static str {
        match self {
            DiagnosticId::HelperNotFound => "Helper method not found.",
            DiagnosticId::HelperSignatureUnmatched => {
                "Helper method '{0}' found, but did not match any call types."
            }
        }
    }
}

impl Serialize for DiagnosticId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl Diagnostic {
    fn new(id: DiagnosticId, location: Location, args: Vec<String>) -> Self {
        let message = args
            .iter()
            .enumerate()
            .fold(id.message_format().to_string(), |message, (i, arg)| {
                message.replace(&format!("{{{i}}}"), arg)
            });
        Diagnostic { id, severity: Severity::Warning, location, message, args }
    }

    pub fn helper_not_found(location: Location) -> Self {
        Self::new(DiagnosticId::HelperNotFound, location, Vec::new())
    }

    pub fn helper_signature_unmatched(location: Location, helper: &str) -> Self {
        Self::new(DiagnosticId::HelperSignatureUnmatched, location, vec![helper.to_string()])
    }

    pub fn code(&self) -> &'static str {
        self.id.code()
    }

    /// Terminal rendering, same layout as `Display`.
    pub fn render_colored(&self) -> String {
        format!(
            "{}: {} {}: {}",
            self.location.to_string().bold(),
            "warning".yellow().bold(),
            self.code().yellow(),
            self.message,
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.as_deref().unwrap_or("<metadata>");
        write!(f, "{path}:{}:{}", self.span.line, self.span.column)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: warning {}: {}", self.location, self.code(), self.message)
    }
}

impl DiagnosticSink for DiagnosticBag {
    fn report(&self, diagnostic: Diagnostic) {
        self.items.lock().push(diagnostic);
    }
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.items.lock().clone()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items.into_inner()
    }
}
