//! Syntax tree consumed by the Tern middle tier
//!
//! The parser lives outside this workspace; it hands over a [`Program`]
//! built from the types in [`ast`]. Every node family implements
//! [`AstNode`], which is what the rewrite passes traverse.

pub mod ast;
pub mod builder;
pub mod literal;
pub mod node;

pub use ast::*;
pub use builder::AstBuilder;
pub use literal::{normalize_integer_text, parse_integer_text};
pub use node::{AstNode, Node, NodeCategory, NodeKind, NodeRef, ReplaceChildError};
