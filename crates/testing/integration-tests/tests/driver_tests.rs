//! End-to-end tests through the driver

use expect_test::expect;
use integration_tests::{arithmetic, shapes, write_program};
use tn_driver::{DriverConfig, compile, compile_file};
use tn_syntax::AstBuilder;

#[test]
fn test_sample_program_compiles_cleanly() {
    let b = AstBuilder::new();
    let compilation = compile(arithmetic(&b), &DriverConfig::default());

    assert!(!compilation.has_errors());
    assert!(compilation.validation.warnings.is_empty());
    let report = compilation.pass_report.as_ref().unwrap();
    assert!(report.reached_fixed_point);
    assert_eq!(report.metrics.len(), 3);
    assert_eq!(compilation.module.functions.len(), 1);
}

#[test]
fn test_unoptimized_program_lowers_the_same_function() {
    let b = AstBuilder::new();
    let config = DriverConfig::from_toml_str("optimize_before_lowering = false").unwrap();
    let compilation = compile(arithmetic(&b), &config);
    assert!(compilation.pass_report.is_none());
    assert!(!compilation.has_errors());
    assert!(compilation.module.function_named("main").is_some());
}

#[test]
fn test_compile_from_json_file() {
    let b = AstBuilder::new();
    let file = write_program(&shapes(&b)).unwrap();
    let compilation = compile_file(file.path(), &DriverConfig::default()).unwrap();
    assert!(!compilation.has_errors());
    assert_eq!(compilation.module.types.len(), 3);
}

#[test]
fn test_diagnostics_rendering() {
    let b = AstBuilder::new();
    let program = b.program(vec![
        b.function(
            "helper",
            vec![b.param("unused", Some(b.named_ty("i64")))],
            Some(b.named_ty("i64")),
            b.block(vec![b.return_stmt(Some(b.int(1))), b.let_stmt("dead", Some(b.int(2)))]),
        ),
        b.function("helper", vec![], None, b.block(vec![])),
        b.variable("LIMIT", None, Some(b.int(10))),
        b.struct_decl("Wrapper", vec![("inner", b.named_ty("Missing"))]),
    ]);
    // Optimizing would prune the statement after the return.
    let config = DriverConfig {
        optimize_before_lowering: false,
        ..DriverConfig::default()
    };
    let compilation = compile(program, &config);

    assert!(compilation.has_errors());
    expect![[r#"
        error[duplicate-declaration] file#0:12..22: duplicate declaration of `helper`
        error[previous-declaration] file#0:1..11: previous declaration of `helper` here
        error[undefined-type] file#0:0..0: undefined type `Missing`
        warning[unused-function] file#0:1..11: function `helper` is never used
        warning[unused-function] file#0:12..22: function `helper` is never used
        warning[unused-variable] file#0:23..33: variable `LIMIT` is never used
        warning[unused-parameter] file#0:0..0: parameter `unused` is never used
        warning[unreachable-code] file#0:0..0: unreachable statement
    "#]]
    .assert_eq(&compilation.render_diagnostics());
}
