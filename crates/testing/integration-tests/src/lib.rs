//! Integration test utilities for the Tern middle tier
//!
//! Sample programs are built with [`AstBuilder`] so every test sees the
//! same trees and spans.

use std::io::Write;

use anyhow::Result;
use tempfile::NamedTempFile;
use tn_hir::Module;
use tn_syntax::{AstBuilder, BinaryOp, Block, CompoundOp, DeclKind, Program};

/// `fn main() -> i64` with foldable arithmetic, a compound assignment and
/// a constant `if`
#[must_use]
pub fn arithmetic(b: &AstBuilder) -> Program {
    b.program(vec![b.function(
        "main",
        vec![],
        Some(b.named_ty("i64")),
        b.block(vec![
            b.let_stmt(
                "total",
                Some(b.binary(
                    BinaryOp::Add,
                    b.int(1),
                    b.binary(BinaryOp::Mul, b.int(2), b.int(3)),
                )),
            ),
            b.expr_stmt(b.compound_assign(CompoundOp::Add, b.ident("total"), b.int(4))),
            b.if_stmt(
                b.binary(BinaryOp::Gt, b.int(1), b.int(2)),
                b.block(vec![b.return_stmt(Some(b.int(0)))]),
                None,
            ),
            b.return_stmt(Some(b.ident("total"))),
        ]),
    )])
}

/// Structs, a trait with an impl, and a public constructor
#[must_use]
pub fn shapes(b: &AstBuilder) -> Program {
    b.program(vec![
        b.struct_decl("Point", vec![("x", b.named_ty("f64")), ("y", b.named_ty("f64"))]),
        b.trait_decl(
            "Shape",
            vec![b.method_sig("area", vec![b.param("self", Some(b.named_ty("Self")))], Some(b.named_ty("f64")))],
            vec![],
        ),
        b.struct_decl("Circle", vec![("center", b.named_ty("Point")), ("radius", b.named_ty("f64"))]),
        b.impl_decl(
            b.named_ty("Circle"),
            Some(b.named_ty("Shape")),
            vec![b.function(
                "area",
                vec![b.param("self", Some(b.named_ty("Self")))],
                Some(b.named_ty("f64")),
                b.block(vec![b.return_stmt(Some(b.field(b.ident("self"), "radius")))]),
            )],
        ),
        b.function(
            "origin",
            vec![],
            Some(b.named_ty("Point")),
            b.block(vec![b.return_stmt(Some(b.ident("ORIGIN")))]),
        )
        .public(),
        b.variable("ORIGIN", Some(b.named_ty("Point")), None),
    ])
}

/// Body of the function declared at `index`
///
/// # Panics
///
/// Panics if that declaration is not a function.
#[must_use]
pub fn function_body(program: &Program, index: usize) -> &Block {
    match &program.declarations[index].kind {
        DeclKind::Function(function) => &function.body,
        other => panic!("declaration {index} is not a function: {other:?}"),
    }
}

/// Lowers `program`, failing the test on any lowering error
///
/// # Panics
///
/// Panics if lowering reports an error.
#[must_use]
pub fn lower_clean(program: &Program) -> Module {
    let (module, errors) = tn_hir_lower::lower_program(program);
    assert!(errors.is_empty(), "unexpected lowering errors: {errors:?}");
    module
}

/// Writes `program` as JSON to a temporary file
///
/// # Errors
///
/// Returns an error if serialization or the write fails
pub fn write_program(program: &Program) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    serde_json::to_writer(&mut file, program)?;
    file.flush()?;
    Ok(file)
}
