//! `$filter` translation.
//!
//! Deleted fields prune their clause. Under `and`/`or` a pruned operand is
//! simply left out and the sibling survives on its own; under any other
//! operator, a conversion or a function call the whole node is pruned, since
//! a comparison or arithmetic with a missing operand has no meaning.

use tracing::{debug, warn};

use super::Translator;
use crate::ast::Expr;
use crate::error::{RemapError, RemapResult};

/// Prefix of the placeholder emitted for nodes with no rendering.
pub const UNSUPPORTED_MARKER: &str = "<unsupported: ";

/// Outcome of translating one subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translated {
    pub text: String,
    /// The subtree referenced a deleted field and must not appear in output.
    pub dropped: bool,
    /// Description of the first unsupported node left in `text`, if any.
    pub unsupported: Option<String>,
}

impl Translated {
    fn kept(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            dropped: false,
            unsupported: None,
        }
    }

    fn dropped() -> Self {
        Self {
            text: String::new(),
            dropped: true,
            unsupported: None,
        }
    }
}

impl Translator<'_> {
    /// Translate a subtree. Only the depth bound can fail here; unsupported
    /// nodes are reported through [`Translated::unsupported`].
    pub fn translate(&self, node: &Expr) -> RemapResult<Translated> {
        self.translate_at(node, 0)
    }

    /// Translate a whole `$filter` tree.
    ///
    /// Returns an empty string when every branch was pruned, and
    /// [`RemapError::UnsupportedNode`] when a placeholder survived.
    pub fn translate_filter(&self, root: &Expr) -> RemapResult<String> {
        let result = self.translate(root)?;
        if result.dropped {
            return Ok(String::new());
        }
        if let Some(description) = result.unsupported {
            return Err(RemapError::UnsupportedNode(description));
        }
        Ok(result.text)
    }

    fn translate_at(&self, node: &Expr, depth: usize) -> RemapResult<Translated> {
        if depth >= self.max_depth {
            return Err(RemapError::DepthExceeded {
                max: self.max_depth,
            });
        }
        let depth = depth + 1;

        match node {
            Expr::Binary { op, left, right } if op.is_logical() => {
                let l = self.translate_at(left, depth)?;
                let r = self.translate_at(right, depth)?;
                Ok(match (l.dropped, r.dropped) {
                    (false, false) => Translated {
                        text: format!("({}) {} ({})", l.text, op, r.text),
                        dropped: false,
                        unsupported: l.unsupported.or(r.unsupported),
                    },
                    (false, true) => {
                        debug!(op = %op, "right operand pruned, keeping left");
                        l
                    }
                    (true, false) => {
                        debug!(op = %op, "left operand pruned, keeping right");
                        r
                    }
                    (true, true) => Translated::dropped(),
                })
            }
            Expr::Binary { op, left, right } => {
                let l = self.translate_at(left, depth)?;
                if l.dropped {
                    return Ok(Translated::dropped());
                }
                let r = self.translate_at(right, depth)?;
                if r.dropped {
                    return Ok(Translated::dropped());
                }
                Ok(Translated {
                    text: format!(
                        "{} {} {}",
                        operand_text(left, l.text),
                        op,
                        operand_text(right, r.text)
                    ),
                    dropped: false,
                    unsupported: l.unsupported.or(r.unsupported),
                })
            }
            Expr::Convert { source } => {
                let inner = self.translate_at(source, depth)?;
                if inner.dropped {
                    return Ok(inner);
                }
                Ok(Translated {
                    text: format!("({})", inner.text),
                    ..inner
                })
            }
            Expr::FunctionCall { name, args } => {
                let mut parts = Vec::with_capacity(args.len());
                let mut unsupported = None;
                for arg in args {
                    let t = self.translate_at(arg, depth)?;
                    if t.dropped {
                        return Ok(Translated::dropped());
                    }
                    unsupported = unsupported.or(t.unsupported);
                    parts.push(t.text);
                }
                Ok(Translated {
                    text: format!("{}({})", name, parts.join(",")),
                    dropped: false,
                    unsupported,
                })
            }
            Expr::Constant { literal } => Ok(Translated::kept(literal.as_str())),
            Expr::Property { name } => match self.mapping.resolve(name) {
                Some(mapped) => Ok(Translated::kept(mapped)),
                None => {
                    debug!(field = %name, "pruning clause on deleted field");
                    Ok(Translated::dropped())
                }
            },
            Expr::Unsupported { description } => {
                warn!(node = %description, "no rendering for expression node");
                Ok(Translated {
                    text: format!("{}{}>", UNSUPPORTED_MARKER, description),
                    dropped: false,
                    unsupported: Some(description.clone()),
                })
            }
        }
    }
}

/// Operands of non-boolean operators are bare unless they are `and`/`or`.
fn operand_text(node: &Expr, text: String) -> String {
    if node.is_logical() {
        format!("({})", text)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOperator;
    use crate::mapping::FieldMapping;
    use pretty_assertions::assert_eq;

    fn prop(name: &str) -> Expr {
        Expr::property(name)
    }

    fn lit(text: &str) -> Expr {
        Expr::constant(text)
    }

    fn cmp(op: BinaryOperator, field: &str, value: &str) -> Expr {
        Expr::binary(op, prop(field), lit(value))
    }

    #[test]
    fn test_property_rename() {
        let m = FieldMapping::new().map("Email", "E_Mail");
        let t = Translator::new(&m);
        assert_eq!(t.translate(&prop("Email")).unwrap(), Translated::kept("E_Mail"));
        assert_eq!(t.translate(&prop("Name")).unwrap(), Translated::kept("Name"));
    }

    #[test]
    fn test_deleted_property_is_dropped() {
        let m = FieldMapping::new().map("Phone", "Phone_No").delete("Phone");
        let t = Translator::new(&m);
        let out = t.translate(&prop("Phone")).unwrap();
        assert!(out.dropped);
        assert_eq!(out.text, "");
    }

    #[test]
    fn test_and_with_one_side_deleted() {
        let m = FieldMapping::new().map("Email", "E_Mail").delete("Phone");
        let expr = Expr::and(
            cmp(BinaryOperator::Eq, "Email", "'x'"),
            cmp(BinaryOperator::Eq, "Phone", "'y'"),
        );
        let out = Translator::new(&m).translate_filter(&expr).unwrap();
        assert_eq!(out, "E_Mail eq 'x'");
    }

    #[test]
    fn test_or_with_left_deleted() {
        let m = FieldMapping::new().delete("A");
        let expr = Expr::or(
            cmp(BinaryOperator::Eq, "A", "1"),
            cmp(BinaryOperator::Eq, "B", "2"),
        );
        let out = Translator::new(&m).translate_filter(&expr).unwrap();
        assert_eq!(out, "B eq 2");
    }

    #[test]
    fn test_both_sides_deleted() {
        let m = FieldMapping::new().delete("A").delete("B");
        let expr = Expr::and(
            cmp(BinaryOperator::Eq, "A", "1"),
            cmp(BinaryOperator::Eq, "B", "2"),
        );
        let t = Translator::new(&m);
        let out = t.translate(&expr).unwrap();
        assert!(out.dropped);
        assert_eq!(out.text, "");
        assert_eq!(t.translate_filter(&expr).unwrap(), "");
    }

    #[test]
    fn test_and_keeps_both() {
        let m = FieldMapping::new();
        let expr = Expr::and(
            cmp(BinaryOperator::Gt, "Age", "18"),
            cmp(BinaryOperator::Le, "Age", "65"),
        );
        let out = Translator::new(&m).translate_filter(&expr).unwrap();
        assert_eq!(out, "(Age gt 18) and (Age le 65)");
    }

    #[test]
    fn test_comparison_drops_as_a_whole() {
        let m = FieldMapping::new().delete("Price");
        let arith = Expr::binary(
            BinaryOperator::Gt,
            Expr::binary(BinaryOperator::Mul, prop("Price"), lit("2")),
            lit("10"),
        );
        let out = Translator::new(&m).translate(&arith).unwrap();
        assert!(out.dropped);
    }

    #[test]
    fn test_dropped_comparison_absorbed_by_parent_and() {
        let m = FieldMapping::new().delete("Price");
        let expr = Expr::and(
            Expr::binary(
                BinaryOperator::Gt,
                Expr::binary(BinaryOperator::Add, prop("Price"), lit("1")),
                lit("10"),
            ),
            cmp(BinaryOperator::Eq, "Name", "'a'"),
        );
        let out = Translator::new(&m).translate_filter(&expr).unwrap();
        assert_eq!(out, "Name eq 'a'");
    }

    #[test]
    fn test_arithmetic_operands_not_parenthesized() {
        let m = FieldMapping::new().map("Price", "Unit_Price");
        let expr = Expr::binary(
            BinaryOperator::Ge,
            Expr::binary(BinaryOperator::Sub, prop("Price"), lit("5")),
            lit("100"),
        );
        let out = Translator::new(&m).translate_filter(&expr).unwrap();
        assert_eq!(out, "Unit_Price sub 5 ge 100");
    }

    #[test]
    fn test_boolean_operand_of_comparison_is_parenthesized() {
        let m = FieldMapping::new();
        let expr = Expr::binary(
            BinaryOperator::Eq,
            Expr::or(prop("A"), prop("B")),
            lit("true"),
        );
        let out = Translator::new(&m).translate_filter(&expr).unwrap();
        assert_eq!(out, "((A) or (B)) eq true");
    }

    #[test]
    fn test_convert_wraps_source() {
        let m = FieldMapping::new().map("Qty", "Quantity");
        let expr = Expr::binary(BinaryOperator::Lt, Expr::convert(prop("Qty")), lit("3M"));
        let out = Translator::new(&m).translate_filter(&expr).unwrap();
        assert_eq!(out, "(Quantity) lt 3M");
    }

    #[test]
    fn test_convert_of_deleted_is_dropped() {
        let m = FieldMapping::new().delete("Qty");
        let out = Translator::new(&m)
            .translate(&Expr::convert(prop("Qty")))
            .unwrap();
        assert!(out.dropped);
    }

    #[test]
    fn test_function_call() {
        let m = FieldMapping::new().map("Name", "Cust_Name");
        let expr = Expr::call("substringof", vec![lit("'Acme'"), prop("Name")]);
        let out = Translator::new(&m).translate_filter(&expr).unwrap();
        assert_eq!(out, "substringof('Acme',Cust_Name)");
    }

    #[test]
    fn test_function_call_with_deleted_argument() {
        let m = FieldMapping::new().delete("Name");
        let expr = Expr::and(
            Expr::eq(Expr::call("tolower", vec![prop("Name")]), lit("'x'")),
            cmp(BinaryOperator::Ne, "City", "null"),
        );
        let out = Translator::new(&m).translate_filter(&expr).unwrap();
        assert_eq!(out, "City ne null");
    }

    #[test]
    fn test_zero_argument_call_is_closed() {
        let m = FieldMapping::new();
        let expr = Expr::binary(BinaryOperator::Lt, prop("Due"), Expr::call("now", vec![]));
        let out = Translator::new(&m).translate_filter(&expr).unwrap();
        assert_eq!(out, "Due lt now()");
    }

    #[test]
    fn test_unsupported_surfaces_as_error() {
        let m = FieldMapping::new();
        let expr = Expr::and(cmp(BinaryOperator::Eq, "A", "1"), Expr::unsupported("not B"));
        let t = Translator::new(&m);

        let raw = t.translate(&expr).unwrap();
        assert_eq!(raw.text, "(A eq 1) and (<unsupported: not B>)");
        assert_eq!(raw.unsupported.as_deref(), Some("not B"));

        let err = t.translate_filter(&expr).unwrap_err();
        assert!(matches!(err, RemapError::UnsupportedNode(ref d) if d == "not B"));
    }

    #[test]
    fn test_unsupported_inside_pruned_branch_is_harmless() {
        let m = FieldMapping::new().delete("A");
        let expr = Expr::or(
            Expr::eq(prop("A"), Expr::unsupported("cast")),
            cmp(BinaryOperator::Eq, "B", "2"),
        );
        let out = Translator::new(&m).translate_filter(&expr).unwrap();
        assert_eq!(out, "B eq 2");
    }

    #[test]
    fn test_depth_bound() {
        let mut expr = cmp(BinaryOperator::Eq, "A", "1");
        for _ in 0..20 {
            expr = Expr::and(expr, cmp(BinaryOperator::Eq, "B", "2"));
        }
        let m = FieldMapping::new();
        let err = Translator::new(&m)
            .with_max_depth(10)
            .translate(&expr)
            .unwrap_err();
        assert!(matches!(err, RemapError::DepthExceeded { max: 10 }));
        assert!(Translator::new(&m).translate(&expr).is_ok());
    }
}
