use serde::{Deserialize, Serialize};

/// Binary operators of the OData filter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOperator {
    And,
    Or,
    /// Equal (eq)
    Eq,
    /// Not equal (ne)
    Ne,
    /// Greater than (gt)
    Gt,
    /// Greater than or equal (ge)
    Ge,
    /// Less than (lt)
    Lt,
    /// Less than or equal (le)
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOperator {
    /// `and` / `or`: the operators whose operands may be pruned independently.
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }

    /// The exact lowercase token used in query text.
    pub fn token(self) -> &'static str {
        match self {
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::Eq => "eq",
            BinaryOperator::Ne => "ne",
            BinaryOperator::Gt => "gt",
            BinaryOperator::Ge => "ge",
            BinaryOperator::Lt => "lt",
            BinaryOperator::Le => "le",
            BinaryOperator::Add => "add",
            BinaryOperator::Sub => "sub",
            BinaryOperator::Mul => "mul",
            BinaryOperator::Div => "div",
            BinaryOperator::Mod => "mod",
        }
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens() {
        let all = [
            (BinaryOperator::And, "and"),
            (BinaryOperator::Or, "or"),
            (BinaryOperator::Eq, "eq"),
            (BinaryOperator::Ne, "ne"),
            (BinaryOperator::Gt, "gt"),
            (BinaryOperator::Ge, "ge"),
            (BinaryOperator::Lt, "lt"),
            (BinaryOperator::Le, "le"),
            (BinaryOperator::Add, "add"),
            (BinaryOperator::Sub, "sub"),
            (BinaryOperator::Mul, "mul"),
            (BinaryOperator::Div, "div"),
            (BinaryOperator::Mod, "mod"),
        ];
        for (op, token) in all {
            assert_eq!(op.to_string(), token);
        }
    }

    #[test]
    fn test_only_and_or_are_logical() {
        assert!(BinaryOperator::And.is_logical());
        assert!(BinaryOperator::Or.is_logical());
        assert!(!BinaryOperator::Eq.is_logical());
        assert!(!BinaryOperator::Mod.is_logical());
    }
}
