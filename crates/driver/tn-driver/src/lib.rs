//! Compilation driver
//!
//! Runs the middle of the pipeline on a parsed [`Program`]: the rewrite
//! passes, lowering to a [`Module`], then validation. Every stage runs to
//! completion and its diagnostics are collected in the [`Compilation`].

mod config;

pub use config::{ConfigError, DriverConfig};

use std::path::Path;

use anyhow::Context;
use tn_hir::Module;
use tn_hir_lower::LoweringError;
use tn_opt::{Pipeline, PipelineReport};
use tn_syntax::Program;
use tn_validate::ValidationReport;

/// Everything one [`compile`] call produced
#[derive(Debug)]
pub struct Compilation {
    /// The program after the rewrite passes
    pub program: Program,
    /// The lowered module
    pub module: Module,
    /// Problems found while lowering
    pub lowering_errors: Vec<LoweringError>,
    /// Validation findings; empty when validation is disabled
    pub validation: ValidationReport,
    /// Rewrite summary, when the passes ran
    pub pass_report: Option<PipelineReport>,
}

impl Compilation {
    /// Whether lowering or validation reported an error
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.lowering_errors.is_empty() || self.validation.has_errors()
    }

    /// One line per diagnostic: lowering errors, validation errors, then
    /// warnings
    #[must_use]
    pub fn render_diagnostics(&self) -> String {
        let lowering = self
            .lowering_errors
            .iter()
            .map(|error| format!("error[lowering] {}: {error}\n", error.span()));
        let errors = self
            .validation
            .errors
            .iter()
            .map(|error| format!("error[{}] {}: {}\n", error.code, error.span, error.message));
        let warnings = self.validation.warnings.iter().map(|warning| {
            format!(
                "warning[{}] {}: {}\n",
                warning.code, warning.span, warning.message
            )
        });
        lowering.chain(errors).chain(warnings).collect()
    }
}

/// Optimizes, lowers and validates `program`
#[must_use]
pub fn compile(program: Program, config: &DriverConfig) -> Compilation {
    let (program, pass_report) = if config.optimize_before_lowering {
        let mut pipeline = Pipeline::new(&config.optimize);
        let (program, report) = pipeline.run(program);
        (program, Some(report))
    } else {
        (program, None)
    };

    let (module, lowering_errors) = tn_hir_lower::lower_program(&program);
    let validation = if config.validate {
        tn_validate::validate(&module)
    } else {
        ValidationReport::default()
    };

    tracing::debug!(
        declarations = program.declarations.len(),
        lowering_errors = lowering_errors.len(),
        errors = validation.errors.len(),
        warnings = validation.warnings.len(),
        "compiled program"
    );

    Compilation {
        program,
        module,
        lowering_errors,
        validation,
        pass_report,
    }
}

/// Compiles a program serialized as JSON
pub fn compile_json(text: &str, config: &DriverConfig) -> anyhow::Result<Compilation> {
    let program: Program = serde_json::from_str(text).context("failed to decode program")?;
    Ok(compile(program, config))
}

/// Compiles a JSON program file
pub fn compile_file(path: impl AsRef<Path>, config: &DriverConfig) -> anyhow::Result<Compilation> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    compile_json(&text, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_syntax::{AstBuilder, BinaryOp};

    fn sample() -> Program {
        let b = AstBuilder::new();
        b.program(vec![
            b.function(
                "main",
                vec![],
                Some(b.named_ty("i64")),
                b.block(vec![
                    b.if_stmt(
                        b.binary(BinaryOp::Lt, b.int(1), b.int(2)),
                        b.block(vec![b.return_stmt(Some(b.binary(BinaryOp::Mul, b.int(6), b.int(7))))]),
                        Some(b.block(vec![b.return_stmt(Some(b.int(0)))])),
                    ),
                ]),
            ),
        ])
    }

    #[test]
    fn test_optimizes_before_lowering() {
        let compilation = compile(sample(), &DriverConfig::default());
        assert!(!compilation.has_errors());
        let report = compilation.pass_report.as_ref().unwrap();
        assert!(report.reached_fixed_point);

        // `if 1 < 2` folded to `true`, then the branch was spliced in.
        let b = AstBuilder::new();
        let tn_syntax::DeclKind::Function(main) = &compilation.program.declarations[0].kind else {
            panic!("expected function");
        };
        assert_eq!(
            main.body.stmts,
            vec![b.block_stmt(b.block(vec![b.return_stmt(Some(b.int(42)))]))]
        );
    }

    #[test]
    fn test_stages_can_be_disabled() {
        let config = DriverConfig {
            optimize_before_lowering: false,
            validate: false,
            ..DriverConfig::default()
        };
        let compilation = compile(sample(), &config);
        assert!(compilation.pass_report.is_none());
        assert_eq!(compilation.program, sample());
        assert_eq!(compilation.validation, ValidationReport::default());
    }

    #[test]
    fn test_lowering_errors_count_as_errors() {
        let b = AstBuilder::new();
        let program = b.program(vec![
            b.function("main", vec![], None, b.block(vec![b.expr_stmt(b.ident("ghost"))])),
        ]);
        let compilation = compile(program, &DriverConfig::default());
        assert!(compilation.has_errors());
        assert!(
            compilation
                .render_diagnostics()
                .starts_with("error[lowering] file#0:0..0: unresolved name `ghost`")
        );
    }

    #[test]
    fn test_render_one_line_per_diagnostic() {
        let b = AstBuilder::new();
        let program = b.program(vec![
            b.function("main", vec![], None, b.block(vec![b.expr_stmt(b.ident("ghost"))])),
            b.variable("LIMIT", Some(b.named_ty("i64")), Some(b.int(10))),
        ]);
        let rendered = compile(program, &DriverConfig::default()).render_diagnostics();
        assert_eq!(
            rendered,
            "error[lowering] file#0:0..0: unresolved name `ghost`\n\
             warning[unused-variable] file#0:12..22: variable `LIMIT` is never used\n"
        );
    }

    #[test]
    fn test_compile_json_round_trip() {
        let text = serde_json::to_string(&sample()).unwrap();
        let compilation = compile_json(&text, &DriverConfig::default()).unwrap();
        assert_eq!(compilation.module.functions.len(), 1);
        assert!(compile_json("{", &DriverConfig::default()).is_err());
    }

    #[test]
    fn test_compile_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = compile_file(dir.path().join("program.json"), &DriverConfig::default()).unwrap_err();
        assert!(err.to_string().contains("program.json"));
    }
}
