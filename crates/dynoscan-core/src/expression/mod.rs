//! Expression parsing, placeholder allocation, and compilation.
//!
//! The pipeline is parse -> allocate -> render: caller text goes through
//! [`parser::parse_predicate`] into an [`ast::Expr`], and
//! [`compile::compile_predicate`] walks the tree with a fresh
//! [`alloc::PlaceholderAllocator`] to produce placeholder-only wire text
//! plus the two substitution maps.

pub mod alloc;
pub mod ast;
pub mod compile;
pub mod parser;

pub use alloc::PlaceholderAllocator;
pub use ast::{AttributePath, CompareOp, Expr, FunctionName, Literal, LogicalOp, PathElement};
pub use compile::{CompiledExpression, compile_predicate, compile_projection};
pub use parser::{ExpressionError, parse_predicate};
