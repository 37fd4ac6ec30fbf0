//! Integration tests for IR validation

use integration_tests::{lower_clean, shapes};
use tn_hir::Stmt;
use tn_syntax::AstBuilder;
use tn_validate::{ControlFlowGraph, ErrorCode, Validator, WarningCode, validate};

#[test]
fn test_duplicate_functions_two_errors() {
    let b = AstBuilder::new();
    let program = b.program(vec![
        b.function("run", vec![], None, b.block(vec![])),
        b.function("run", vec![], None, b.block(vec![])),
    ]);
    let (module, _) = tn_hir_lower::lower_program(&program);
    let errors = Validator::new(&module).validate();

    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].code, ErrorCode::DuplicateDeclaration);
    assert_eq!(errors[0].span, program.declarations[1].span);
    assert_eq!(errors[1].code, ErrorCode::PreviousDeclaration);
    assert_eq!(errors[1].span, program.declarations[0].span);
}

#[test]
fn test_statement_after_return_unreachable() {
    let b = AstBuilder::new();
    let program = b.program(vec![b.function(
        "main",
        vec![],
        Some(b.named_ty("i32")),
        b.block(vec![b.return_stmt(Some(b.int(0))), b.let_stmt("x", Some(b.int(1)))]),
    )]);
    let module = lower_clean(&program);
    let main = &module.functions[0];

    let unreachable = ControlFlowGraph::build(&main.body).unreachable_statements();
    assert_eq!(unreachable.len(), 1);
    assert!(matches!(main.body.stmts[unreachable[0]], Stmt::Let { .. }));

    let report = validate(&module);
    assert!(report.errors.is_empty());
    assert_eq!(report.warnings_with(WarningCode::UnreachableCode).count(), 1);
}

#[test]
fn test_every_global_reported_unused() {
    let b = AstBuilder::new();
    let program = b.program(vec![
        b.variable("A", None, Some(b.int(1))),
        b.variable("B", None, Some(b.int(2))),
        b.function(
            "main",
            vec![],
            Some(b.named_ty("i64")),
            b.block(vec![b.return_stmt(Some(b.ident("A")))]),
        ),
        b.variable("C", None, None).public(),
    ]);
    let module = lower_clean(&program);
    let report = validate(&module);

    let spans: Vec<_> = report
        .warnings_with(WarningCode::UnusedVariable)
        .map(|warning| warning.span)
        .collect();
    let expected: Vec<_> = module.variables.iter().map(|variable| variable.span).collect();
    assert_eq!(expected.len(), 3);
    assert_eq!(spans, expected);
}

#[test]
fn test_sample_program_only_warns_about_global() {
    let b = AstBuilder::new();
    let module = lower_clean(&shapes(&b));
    let report = validate(&module);

    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].code, WarningCode::UnusedVariable);
    assert_eq!(report.warnings[0].message, "variable `ORIGIN` is never used");
}

#[test]
fn test_validation_does_not_modify_module() {
    let b = AstBuilder::new();
    let module = lower_clean(&shapes(&b));
    let before = format!("{:?}", module.functions);
    let _ = validate(&module);
    assert_eq!(format!("{:?}", module.functions), before);
}

#[test]
fn test_missing_return_and_bad_types_together() {
    let b = AstBuilder::new();
    let program = b.program(vec![
        b.trait_decl("Draw", vec![], vec![]),
        b.function(
            "render",
            vec![b.param("target", Some(b.named_ty("Draw")))],
            Some(b.named_ty("Canvas")),
            b.block(vec![b.expr_stmt(b.ident("target"))]),
        )
        .public(),
    ]);
    let module = lower_clean(&program);
    let report = validate(&module);

    let codes: Vec<_> = report.errors.iter().map(|error| error.code).collect();
    assert_eq!(
        codes,
        [
            ErrorCode::InvalidTypeUsage,
            ErrorCode::UndefinedType,
            ErrorCode::MissingReturn,
        ]
    );
}
