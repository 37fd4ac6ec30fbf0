//! Diagnostic collection shared by every rule

use tn_hir::Module;
use tn_intern::Symbol;
use tn_span::FileSpan;

use crate::diagnostic::{
    ErrorCode, ValidationError, ValidationReport, ValidationWarning, WarningCode,
};
use crate::table::ModuleTable;

/// State of one validation run over a module
pub struct ValidationContext<'a> {
    /// Module being validated
    pub module: &'a Module,
    table: ModuleTable,
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl<'a> ValidationContext<'a> {
    /// Rebuilds the module table, reporting every repeated name
    #[must_use]
    pub fn new(module: &'a Module) -> Self {
        let (table, duplicates) = ModuleTable::build(module);
        let mut ctx = Self {
            module,
            table,
            errors: Vec::new(),
            warnings: Vec::new(),
        };
        for duplicate in duplicates {
            let name = ctx.name(duplicate.name);
            ctx.error(
                duplicate.span,
                ErrorCode::DuplicateDeclaration,
                format!("duplicate declaration of `{name}`"),
            );
            ctx.error(
                duplicate.previous,
                ErrorCode::PreviousDeclaration,
                format!("previous declaration of `{name}` here"),
            );
        }
        ctx
    }

    /// Declarations indexed by name
    #[must_use]
    pub fn table(&self) -> &ModuleTable {
        &self.table
    }

    /// Text of an interned name
    #[must_use]
    pub fn name(&self, symbol: Symbol) -> String {
        self.module.name(&symbol)
    }

    /// Records an error
    pub fn error(&mut self, span: FileSpan, code: ErrorCode, message: impl Into<String>) {
        self.errors.push(ValidationError {
            span,
            message: message.into(),
            code,
        });
    }

    /// Records a warning
    pub fn warning(&mut self, span: FileSpan, code: WarningCode, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            span,
            message: message.into(),
            code,
        });
    }

    /// Errors so far
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Warnings so far
    #[must_use]
    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    /// Consumes the context into a report
    #[must_use]
    pub fn into_report(self) -> ValidationReport {
        ValidationReport {
            errors: self.errors,
            warnings: self.warnings,
        }
    }
}
