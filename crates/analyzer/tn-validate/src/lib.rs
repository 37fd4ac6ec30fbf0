//! IR validation
//!
//! Reads a lowered [`Module`] and reports errors (duplicate names, missing
//! returns, bad type references) and warnings (unreachable statements,
//! unused symbols, self-containing types). The module is never modified.

pub mod cfg;
mod context;
pub mod diagnostic;
pub mod rules;
pub mod table;
pub mod types;

pub use cfg::{CfgEdge, CfgNode, CfgNodeKind, ControlFlowGraph};
pub use context::ValidationContext;
pub use diagnostic::{ErrorCode, ValidationError, ValidationReport, ValidationWarning, WarningCode};
pub use rules::ValidationRule;

use tn_hir::Module;

/// Validator with a collection of rules
pub struct Validator<'a> {
    module: &'a Module,
    rules: Vec<Box<dyn ValidationRule>>,
    warnings: Vec<ValidationWarning>,
}

impl<'a> Validator<'a> {
    /// Create a validator with every built-in rule
    #[must_use]
    pub fn new(module: &'a Module) -> Self {
        Self::with_rules(
            module,
            vec![
                Box::new(rules::UnusedSymbolRule),
                Box::new(types::TypeValidityRule),
                Box::new(types::RecursiveTypeRule),
                Box::new(rules::MissingReturnRule),
                Box::new(rules::UnusedParameterRule),
                Box::new(rules::UnreachableCodeRule),
            ],
        )
    }

    /// Create a validator with specific rules; duplicates are always checked
    #[must_use]
    pub fn with_rules(module: &'a Module, rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self {
            module,
            rules,
            warnings: Vec::new(),
        }
    }

    /// Add a rule
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the configured rules, in run order
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Runs every rule and returns the errors; warnings are kept for
    /// [`Validator::warnings`]
    pub fn validate(&mut self) -> Vec<ValidationError> {
        let report = self.run();
        self.warnings = report.warnings;
        report.errors
    }

    /// Warnings of the last [`Validator::validate`] call
    #[must_use]
    pub fn warnings(&self) -> &[ValidationWarning] {
        &self.warnings
    }

    fn run(&self) -> ValidationReport {
        let mut ctx = ValidationContext::new(self.module);
        for rule in &self.rules {
            rule.check_module(&mut ctx);
        }
        for function in self.module.all_functions() {
            let errors = ctx.errors().len();
            let warnings = ctx.warnings().len();
            for rule in &self.rules {
                rule.check_function(function, &mut ctx);
            }
            tracing::debug!(
                function = %ctx.name(function.name),
                errors = ctx.errors().len() - errors,
                warnings = ctx.warnings().len() - warnings,
                "validated function"
            );
        }
        ctx.into_report()
    }
}

/// Validates `module` with every built-in rule
#[must_use]
pub fn validate(module: &Module) -> ValidationReport {
    Validator::new(module).run()
}
