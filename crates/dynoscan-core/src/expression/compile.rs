//! Compilation of parsed expressions into placeholder-only wire text.
//!
//! The store rejects raw attribute names that happen to be reserved words,
//! so the compiled text references names and literals exclusively through
//! `#n` / `:n` placeholders resolved via the substitution maps.

use std::collections::HashMap;
use std::fmt::Write as _;

use dynoscan_model::AttributeValue;

use super::alloc::PlaceholderAllocator;
use super::ast::{AttributePath, Expr, LogicalOp, PathElement};
use super::parser::{ExpressionError, parse_predicate};

/// One compiled expression: wire text plus the substitution maps that make
/// it meaningful.
#[derive(Debug, Clone, Default)]
pub struct CompiledExpression {
    /// Wire-format expression text, referencing only placeholders.
    pub text: String,
    /// Name placeholder to attribute name.
    pub names: HashMap<String, String>,
    /// Value placeholder to literal.
    pub values: HashMap<String, AttributeValue>,
}

/// Parse and compile a filter or key-condition expression with a fresh
/// allocator.
///
/// # Errors
///
/// Returns `ExpressionError` if the input fails to parse.
pub fn compile_predicate(input: &str) -> Result<CompiledExpression, ExpressionError> {
    let expr = parse_predicate(input)?;
    let mut alloc = PlaceholderAllocator::new();
    let mut text = String::new();
    render_expr(&expr, Precedence::Or, &mut alloc, &mut text);
    let (names, values) = alloc.into_maps();
    Ok(CompiledExpression {
        text,
        names,
        values,
    })
}

/// Compile a projection from a required-columns list with a fresh allocator.
///
/// Repeated columns collapse onto one placeholder and appear once in the
/// text. The value map of a pure projection is always empty.
#[must_use]
pub fn compile_projection(columns: &[String]) -> CompiledExpression {
    let mut alloc = PlaceholderAllocator::new();
    let mut placeholders: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns {
        let symbol = alloc.name_for(column);
        if !placeholders.contains(&symbol) {
            placeholders.push(symbol);
        }
    }
    let (names, values) = alloc.into_maps();
    CompiledExpression {
        text: placeholders.join(", "),
        names,
        values,
    }
}

/// Precedence levels used to decide where parentheses are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Or,
    And,
    Not,
}

fn render_expr(expr: &Expr, parent: Precedence, alloc: &mut PlaceholderAllocator, out: &mut String) {
    match expr {
        Expr::Compare { path, op, value } => {
            render_path(path, alloc, out);
            let symbol = alloc.value_for(&value.to_attribute_value());
            let _ = write!(out, " {op} {symbol}");
        }
        Expr::Between { path, low, high } => {
            render_path(path, alloc, out);
            let low_sym = alloc.value_for(&low.to_attribute_value());
            let high_sym = alloc.value_for(&high.to_attribute_value());
            let _ = write!(out, " BETWEEN {low_sym} AND {high_sym}");
        }
        Expr::In { path, list } => {
            render_path(path, alloc, out);
            out.push_str(" IN (");
            for (i, literal) in list.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let symbol = alloc.value_for(&literal.to_attribute_value());
                out.push_str(&symbol);
            }
            out.push(')');
        }
        Expr::Logical { op, left, right } => {
            let own = match op {
                LogicalOp::And => Precedence::And,
                LogicalOp::Or => Precedence::Or,
            };
            let parens = own < parent;
            if parens {
                out.push('(');
            }
            render_expr(left, own, alloc, out);
            let _ = write!(out, " {op} ");
            render_expr(right, own, alloc, out);
            if parens {
                out.push(')');
            }
        }
        Expr::Not(inner) => {
            out.push_str("NOT ");
            render_expr(inner, Precedence::Not, alloc, out);
        }
        Expr::Function { name, path, arg } => {
            let _ = write!(out, "{name}(");
            render_path(path, alloc, out);
            if let Some(literal) = arg {
                let symbol = alloc.value_for(&literal.to_attribute_value());
                let _ = write!(out, ", {symbol}");
            }
            out.push(')');
        }
    }
}

/// Render a path with every attribute element replaced by a name
/// placeholder. Index elements stay literal.
fn render_path(path: &AttributePath, alloc: &mut PlaceholderAllocator, out: &mut String) {
    for (i, elem) in path.elements.iter().enumerate() {
        match elem {
            PathElement::Attribute(name) => {
                let symbol = alloc.name_for(name);
                if i > 0 {
                    out.push('.');
                }
                out.push_str(&symbol);
            }
            PathElement::Index(idx) => {
                let _ = write!(out, "[{idx}]");
            }
        }
    }
}
