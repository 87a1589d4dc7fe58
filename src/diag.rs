//! Diagnostics reported back to the plan engine.

use crate::error::Error;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// Dotted path of the attribute the diagnostic is about, if any.
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error<S: Into<String>, D: Into<String>>(summary: S, detail: D) -> Self {
        Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    pub fn warning<S: Into<String>, D: Into<String>>(summary: S, detail: D) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(summary, detail)
        }
    }

    pub fn with_attribute<S: Into<String>>(mut self, attribute: S) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

impl From<&Error> for Diagnostic {
    fn from(err: &Error) -> Self {
        match err {
            Error::TypeMismatch { expected, got } => Diagnostic::error(
                "Semantic Equality Check Error",
                format!(
                    "An unexpected value type was received while performing semantic equality checks. \
                     Please report this to the provider developers.\n\n\
                     Expected Value Type: {}\nGot Value Type: {}",
                    expected, got
                ),
            ),
            Error::InvalidValue { .. } => Diagnostic::error("Invalid Attribute Value", err.to_string()),
            _ => Diagnostic::error("Plan Error", err.to_string()),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        write!(f, "{}: {}", level, self.summary)?;
        if let Some(attr) = &self.attribute {
            write!(f, " (attribute \"{}\")", attr)?;
        }
        Ok(())
    }
}

/// Ordered collection of diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.0.push(diag);
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
