//! Validation diagnostics

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tn_span::FileSpan;

/// Error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    /// A name declared twice in one namespace
    #[display("duplicate-declaration")]
    DuplicateDeclaration,
    /// Points back at the first of two declarations
    #[display("previous-declaration")]
    PreviousDeclaration,
    /// A non-unit function that can finish without returning
    #[display("missing-return")]
    MissingReturn,
    /// A type name with no definition
    #[display("undefined-type")]
    UndefinedType,
    /// A trait used as a value type, or a non-trait used as a bound
    #[display("invalid-type-usage")]
    InvalidTypeUsage,
}

/// Warning codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningCode {
    /// Statement no path from entry reaches
    #[display("unreachable-code")]
    UnreachableCode,
    /// Private function other than `main`
    #[display("unused-function")]
    UnusedFunction,
    /// Module-level variable
    #[display("unused-variable")]
    UnusedVariable,
    /// Parameter never named in its body
    #[display("unused-parameter")]
    UnusedParameter,
    /// Type that contains itself by value
    #[display("recursive-type")]
    RecursiveType,
}

/// A hard validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Source location
    pub span: FileSpan,
    /// Human-readable message
    pub message: String,
    /// Error code
    pub code: ErrorCode,
}

/// An advisory finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Source location
    pub span: FileSpan,
    /// Human-readable message
    pub message: String,
    /// Warning code
    pub code: WarningCode,
}

/// Errors and warnings of one validation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Hard errors, in discovery order
    pub errors: Vec<ValidationError>,
    /// Warnings, in discovery order
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Whether any error was reported
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors carrying `code`
    pub fn errors_with(&self, code: ErrorCode) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |error| error.code == code)
    }

    /// Warnings carrying `code`
    pub fn warnings_with(&self, code: WarningCode) -> impl Iterator<Item = &ValidationWarning> {
        self.warnings.iter().filter(move |warning| warning.code == code)
    }
}
