//! Diagnostics for the Reso compiler
//!
//! Errors and warnings accumulate in a single bag while the pipeline runs.
//! Errors suppress IR output for the whole compilation unit; warnings are
//! reported alongside successful output.

use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single diagnostic message tied to a file and line.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// File the diagnostic points at (unit-local name, e.g. "main.reso")
    pub file: String,
    /// Line number (0-indexed internally, displayed 1-indexed)
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.file,
            self.line + 1,
            self.severity,
            self.message
        )
    }
}

/// Accumulator for diagnostics across the whole compilation unit.
///
/// The lowering passes keep going after an error where safe, so several
/// independent errors can surface in a single run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics { items: Vec::new() }
    }

    pub fn error(&mut self, file: &str, line: usize, message: impl Into<String>) {
        self.items.push(Diagnostic {
            severity: Severity::Error,
            file: file.to_string(),
            line,
            message: message.into(),
        });
    }

    pub fn warning(&mut self, file: &str, line: usize, message: impl Into<String>) {
        self.items.push(Diagnostic {
            severity: Severity::Warning,
            file: file.to_string(),
            line,
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_bag() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        assert!(!diags.has_errors());

        diags.warning("a.reso", 3, "Unreachable code");
        assert!(!diags.has_errors());

        diags.error("a.reso", 7, "Variable 'x' is not defined");
        assert!(diags.has_errors());
        assert_eq!(diags.errors().count(), 1);
        assert_eq!(diags.warnings().count(), 1);
    }

    #[test]
    fn test_display_uses_one_indexed_lines() {
        let mut diags = Diagnostics::new();
        diags.error("main.reso", 0, "boom");
        let rendered = diags.iter().next().unwrap().to_string();
        assert_eq!(rendered, "main.reso:1: error: boom");
    }
}
