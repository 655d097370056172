//! AST types for the filter/key-condition expression language.
//!
//! The tree is produced by the parser from caller-supplied expression text
//! with attribute names and literal values still inline. The compiler walks
//! it once, swapping every name and literal for a placeholder.

use std::fmt;

use dynoscan_model::AttributeValue;

/// Predicate node for filter and key-condition expressions.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Comparison: `path op literal`.
    Compare {
        /// Attribute path on the left.
        path: AttributePath,
        /// Comparison operator.
        op: CompareOp,
        /// Literal value on the right.
        value: Literal,
    },
    /// Range test: `path BETWEEN low AND high`.
    Between {
        /// Attribute path under test.
        path: AttributePath,
        /// Lower bound (inclusive).
        low: Literal,
        /// Upper bound (inclusive).
        high: Literal,
    },
    /// Membership test: `path IN (v1, v2, ...)`.
    In {
        /// Attribute path under test.
        path: AttributePath,
        /// Candidate literals.
        list: Vec<Literal>,
    },
    /// Logical combination: `left AND right` or `left OR right`.
    Logical {
        /// Logical operator.
        op: LogicalOp,
        /// Left-hand predicate.
        left: Box<Expr>,
        /// Right-hand predicate.
        right: Box<Expr>,
    },
    /// Negation: `NOT expr`.
    Not(Box<Expr>),
    /// Function predicate: `attribute_exists(path)`, `begins_with(path, lit)`, ...
    Function {
        /// Function name.
        name: FunctionName,
        /// Attribute path argument.
        path: AttributePath,
        /// Literal argument for two-argument functions.
        arg: Option<Literal>,
    },
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal (`=`).
    Eq,
    /// Not equal (`<>`).
    Ne,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Le,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "<>"),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
        }
    }
}

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

/// Built-in function predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionName {
    /// `attribute_exists(path)` - true if the attribute exists.
    AttributeExists,
    /// `attribute_not_exists(path)` - true if the attribute does not exist.
    AttributeNotExists,
    /// `begins_with(path, prefix)` - true if the string starts with the prefix.
    BeginsWith,
    /// `contains(path, operand)` - true if the string or set contains the operand.
    Contains,
}

impl FunctionName {
    /// Number of arguments the function takes, including the path.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::AttributeExists | Self::AttributeNotExists => 1,
            Self::BeginsWith | Self::Contains => 2,
        }
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributeExists => write!(f, "attribute_exists"),
            Self::AttributeNotExists => write!(f, "attribute_not_exists"),
            Self::BeginsWith => write!(f, "begins_with"),
            Self::Contains => write!(f, "contains"),
        }
    }
}

/// A document path of one or more elements, e.g. `info.rating` or `tags[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributePath {
    /// The path elements in order. The first element is always an attribute.
    pub elements: Vec<PathElement>,
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, elem) in self.elements.iter().enumerate() {
            match elem {
                PathElement::Attribute(name) => {
                    if i > 0 {
                        write!(f, ".{name}")?;
                    } else {
                        write!(f, "{name}")?;
                    }
                }
                PathElement::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

/// A single element in an attribute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathElement {
    /// A named attribute.
    Attribute(String),
    /// A list index dereference (e.g., `[0]`).
    Index(usize),
}

/// A typed literal value appearing in expression text.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Single-quoted string.
    S(String),
    /// Decimal number, kept string-encoded for arbitrary precision.
    N(String),
    /// `true` or `false`.
    Bool(bool),
    /// `null`.
    Null,
}

impl Literal {
    /// Convert into the wire-level attribute value the store expects.
    #[must_use]
    pub fn to_attribute_value(&self) -> AttributeValue {
        match self {
            Self::S(s) => AttributeValue::S(s.clone()),
            Self::N(n) => AttributeValue::N(n.clone()),
            Self::Bool(b) => AttributeValue::Bool(*b),
            Self::Null => AttributeValue::Null(true),
        }
    }
}
