//! Diagnostics collection for class-file building and transformation.
//!
//! Most decisions taken while building a class are not errors: an attribute filtered out by the
//! active [`crate::options::AttributePolicy`], an attribute that had to be re-encoded because
//! its source pool could not be written directly, or an unknown attribute copied opaquely into
//! a foreign pool. These events are recorded here instead of failing the operation, so callers
//! can inspect what happened after the fact.
//!
//! # Architecture
//!
//! One [`Diagnostics`] container is owned by each [`crate::ClassFile`] and shared through an
//! [`std::sync::Arc`] with every builder working on its behalf:
//! - **Reader**: reports attributes dropped at parse time
//! - **Attribute holders**: report policy drops
//! - **Attribute codec**: reports re-encoding fallbacks and opaque foreign copies
//! - **Transform driver**: reports per-class outcomes of batch transformation
//!
//! The container uses `boxcar::Vec` for lock-free append, so the parallel
//! [`crate::ClassFile::transform_all`] can record from many threads at once.
//!
//! # Usage Examples
//!
//! ```rust
//! use classweave::diagnostics::{Diagnostics, DiagnosticCategory};
//!
//! let diagnostics = Diagnostics::new();
//! diagnostics.info(DiagnosticCategory::Attribute, "Dropped Deprecated on field x:I");
//! diagnostics.warning(DiagnosticCategory::Attribute, "Copied unknown attribute Foo across pools");
//!
//! assert_eq!(diagnostics.count(), 2);
//! assert!(diagnostics.has_warnings());
//! assert!(!diagnostics.has_errors());
//!
//! for entry in diagnostics.iter() {
//!     println!("{entry}");
//! }
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are [`Send`] and [`Sync`].

use std::fmt::{self, Write};

use strum::Display;

/// Severity level of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Informational message, not indicating a problem.
    ///
    /// Used for policy drops and reuse fallbacks.
    Info,

    /// Warning about output that may not behave like the input.
    ///
    /// Used when opaque data is copied into a pool it was not encoded against.
    Warning,

    /// Error affecting one unit of a larger operation.
    ///
    /// Batch transformation records failing classes here and continues with the rest.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// Category indicating the source of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DiagnosticCategory {
    /// Constant pool reuse and remapping.
    ConstantPool,

    /// Attribute filtering, copying and re-encoding.
    Attribute,

    /// Field building or copying.
    Field,

    /// Method building or copying.
    Method,

    /// Class-level structure.
    Class,

    /// Transformation pipelines.
    Transform,
}

/// A single diagnostic entry with context information.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level of this diagnostic.
    pub severity: DiagnosticSeverity,

    /// Category indicating the source of this diagnostic.
    pub category: DiagnosticCategory,

    /// Human-readable description of the event.
    pub message: String,

    /// Optional byte offset in the input where the event was observed.
    pub offset: Option<usize>,

    /// Optional constant pool index related to the event.
    pub pool_index: Option<u16>,

    /// Optional member (`name:descriptor`) the event concerns.
    pub member: Option<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic entry.
    ///
    /// # Arguments
    ///
    /// * `severity` - Severity level of the diagnostic
    /// * `category` - Category of the diagnostic source
    /// * `message` - Human-readable description
    pub fn new(
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            offset: None,
            pool_index: None,
            member: None,
        }
    }

    /// Adds input offset information to the diagnostic.
    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Adds constant pool index information to the diagnostic.
    #[must_use]
    pub fn with_pool_index(mut self, index: u16) -> Self {
        self.pool_index = Some(index);
        self
    }

    /// Adds the member the diagnostic concerns.
    #[must_use]
    pub fn with_member(mut self, name: &str, descriptor: &str) -> Self {
        self.member = Some(format!("{name}:{descriptor}"));
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;

        if let Some(member) = &self.member {
            write!(f, " (member: {member})")?;
        }

        if let Some(offset) = self.offset {
            write!(f, " (offset: 0x{offset:08x})")?;
        }

        if let Some(index) = self.pool_index {
            write!(f, " (pool index: #{index})")?;
        }

        Ok(())
    }
}

/// Thread-safe container for collecting diagnostic entries.
///
/// Uses `boxcar::Vec` internally for lock-free concurrent append operations.
#[derive(Debug)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Creates a new empty diagnostics container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Adds an informational diagnostic.
    pub fn info(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message));
    }

    /// Adds a warning diagnostic.
    pub fn warning(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            message,
        ));
    }

    /// Adds an error diagnostic.
    pub fn error(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Error,
            category,
            message,
        ));
    }

    /// Adds a diagnostic entry directly.
    ///
    /// Use this for diagnostics that carry member, offset or pool index context.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Removes all collected diagnostics.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns true if any diagnostics have been collected.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns true if any error-level diagnostics have been collected.
    pub fn has_errors(&self) -> bool {
        self.any_with(DiagnosticSeverity::Error)
    }

    /// Returns true if any warning-level diagnostics have been collected.
    pub fn has_warnings(&self) -> bool {
        self.any_with(DiagnosticSeverity::Warning)
    }

    /// Returns the total number of diagnostics.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns the number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.count_with(DiagnosticSeverity::Error)
    }

    /// Returns the number of warning-level diagnostics.
    pub fn warning_count(&self) -> usize {
        self.count_with(DiagnosticSeverity::Warning)
    }

    /// Returns the number of info-level diagnostics.
    pub fn info_count(&self) -> usize {
        self.count_with(DiagnosticSeverity::Info)
    }

    /// Returns an iterator over all diagnostics in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Returns diagnostics filtered by category.
    pub fn by_category(&self, category: DiagnosticCategory) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.category == category).collect()
    }

    /// Formats a summary of all diagnostics for display.
    pub fn summary(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "Diagnostics: {} error(s), {} warning(s), {} info(s)",
            self.error_count(),
            self.warning_count(),
            self.info_count()
        );

        for severity in [DiagnosticSeverity::Error, DiagnosticSeverity::Warning] {
            if !self.any_with(severity) {
                continue;
            }
            let _ = writeln!(output, "\n{severity}:");
            for diag in self.iter().filter(|d| d.severity == severity) {
                let _ = writeln!(output, "  {diag}");
            }
        }

        output
    }

    fn any_with(&self, severity: DiagnosticSeverity) -> bool {
        self.iter().any(|d| d.severity == severity)
    }

    fn count_with(&self, severity: DiagnosticSeverity) -> usize {
        self.iter().filter(|d| d.severity == severity).count()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_diagnostic_with_context() {
        let diag = Diagnostic::new(
            DiagnosticSeverity::Info,
            DiagnosticCategory::Attribute,
            "Dropped Synthetic",
        )
        .with_member("x", "I")
        .with_offset(0x40)
        .with_pool_index(7);

        assert_eq!(diag.member.as_deref(), Some("x:I"));
        assert_eq!(diag.offset, Some(0x40));
        assert_eq!(diag.pool_index, Some(7));

        let display = diag.to_string();
        assert!(display.contains("INFO"));
        assert!(display.contains("Attribute"));
        assert!(display.contains("x:I"));
        assert!(display.contains("0x00000040"));
        assert!(display.contains("#7"));
    }

    #[test]
    fn test_diagnostics_clear() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warning(DiagnosticCategory::ConstantPool, "Stale index");
        diagnostics.info(DiagnosticCategory::Attribute, "Dropped Synthetic");
        assert_eq!(diagnostics.count(), 2);

        diagnostics.clear();
        assert!(!diagnostics.has_any());
        assert!(!diagnostics.has_warnings());

        diagnostics.error(DiagnosticCategory::Transform, "Failed");
        assert_eq!(diagnostics.error_count(), 1);
    }

    #[test]
    fn test_diagnostics_container() {
        let diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_any());

        diagnostics.info(DiagnosticCategory::Class, "Info message");
        diagnostics.warning(DiagnosticCategory::Attribute, "Warning message");
        diagnostics.error(DiagnosticCategory::Transform, "Error message");

        assert_eq!(diagnostics.count(), 3);
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(diagnostics.info_count(), 1);
        assert!(diagnostics.has_errors());
        assert!(diagnostics.has_warnings());
        assert_eq!(diagnostics.by_category(DiagnosticCategory::Attribute).len(), 1);

        let summary = diagnostics.summary();
        assert!(summary.contains("1 error(s), 1 warning(s), 1 info(s)"));
        assert!(summary.contains("Error message"));
        assert!(!summary.contains("Info message"));
    }

    #[test]
    fn test_diagnostics_thread_safety() {
        let diagnostics = Arc::new(Diagnostics::new());
        let mut handles = vec![];

        for i in 0..10 {
            let diag_clone = Arc::clone(&diagnostics);
            handles.push(thread::spawn(move || {
                diag_clone.info(DiagnosticCategory::Transform, format!("class {i} done"));
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(diagnostics.count(), 10);
    }
}
