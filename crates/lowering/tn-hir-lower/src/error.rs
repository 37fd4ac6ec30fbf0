//! Lowering errors
//!
//! None of these abort lowering. Each one marks a single declaration,
//! statement or expression that was skipped or replaced by a placeholder.

use miette::Diagnostic;
use thiserror::Error;
use tn_span::FileSpan;

/// A problem found while lowering one node
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum LoweringError {
    /// Syntax the lowering engine has no rule for
    #[error("unsupported {context}: {description}")]
    #[diagnostic(code(lower::unsupported_node))]
    UnsupportedNode {
        /// Where the node appeared (declaration, statement, ...)
        context: &'static str,
        /// What the parser recorded for it
        description: String,
        /// Source location
        span: FileSpan,
    },

    /// Identifier with no binding in scope
    #[error("unresolved name `{name}`")]
    #[diagnostic(
        code(lower::unresolved_name),
        help("declare `{name}` before using it, or import it")
    )]
    UnresolvedName {
        /// The identifier
        name: String,
        /// Source location
        span: FileSpan,
    },

    /// A node missing a required part
    #[error("malformed {what}")]
    #[diagnostic(code(lower::malformed_node))]
    MalformedNode {
        /// Which part is missing or broken
        what: String,
        /// Source location
        span: FileSpan,
    },

    /// Literal text that does not denote a value of its kind
    #[error("invalid {kind} literal `{text}`")]
    #[diagnostic(code(lower::invalid_literal))]
    InvalidLiteral {
        /// Literal kind
        kind: String,
        /// Literal text
        text: String,
        /// Source location
        span: FileSpan,
    },
}

impl LoweringError {
    /// Returns the span where the error occurred
    #[must_use]
    pub fn span(&self) -> FileSpan {
        match self {
            Self::UnsupportedNode { span, .. }
            | Self::UnresolvedName { span, .. }
            | Self::MalformedNode { span, .. }
            | Self::InvalidLiteral { span, .. } => *span,
        }
    }
}
