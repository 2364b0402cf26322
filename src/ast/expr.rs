use serde::{Deserialize, Serialize};

use crate::ast::BinaryOperator;

/// A node of a parsed `$filter` expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// Binary expression (left op right)
    Binary {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Type conversion wrapper around a single operand
    Convert { source: Box<Expr> },
    /// Function call expression (substringof, tolower, year, ...)
    FunctionCall { name: String, args: Vec<Expr> },
    /// Literal, kept exactly as written ('abc', 42, datetime'2020-01-01', null)
    Constant { literal: String },
    /// Reference to a field of the client-facing schema
    Property { name: String },
    /// Any node kind the translator has no rendering for
    Unsupported { description: String },
}

impl Expr {
    pub fn binary(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOperator::And, left, right)
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOperator::Or, left, right)
    }

    /// `left eq right`
    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOperator::Eq, left, right)
    }

    pub fn property(name: impl Into<String>) -> Self {
        Expr::Property { name: name.into() }
    }

    pub fn constant(literal: impl Into<String>) -> Self {
        Expr::Constant {
            literal: literal.into(),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::FunctionCall {
            name: name.into(),
            args,
        }
    }

    pub fn convert(source: Expr) -> Self {
        Expr::Convert {
            source: Box::new(source),
        }
    }

    pub fn unsupported(description: impl Into<String>) -> Self {
        Expr::Unsupported {
            description: description.into(),
        }
    }

    /// Whether this node is an `and`/`or` combinator.
    pub fn is_logical(&self) -> bool {
        matches!(self, Expr::Binary { op, .. } if op.is_logical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let expr = Expr::and(
            Expr::eq(Expr::property("Email"), Expr::constant("'x'")),
            Expr::call("tolower", vec![Expr::property("Name")]),
        );
        assert!(expr.is_logical());
        match expr {
            Expr::Binary { op, left, .. } => {
                assert_eq!(op, BinaryOperator::And);
                assert!(!left.is_logical());
            }
            other => panic!("expected binary node, got {:?}", other),
        }
    }

    #[test]
    fn test_json_shape() {
        let expr = Expr::eq(Expr::property("Age"), Expr::constant("3"));
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["Binary"]["op"], "eq");
        assert_eq!(json["Binary"]["left"]["Property"]["name"], "Age");

        let back: Expr = serde_json::from_value(json).unwrap();
        assert_eq!(back, expr);
    }
}
