//! Query-string assembly.

use tracing::debug;

use super::Translator;
use crate::ast::QueryOptions;
use crate::error::{RemapError, RemapResult};

/// Which paging/count options may be forwarded to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Passthrough {
    pub skip: bool,
    pub top: bool,
    pub count: bool,
}

impl Passthrough {
    pub fn new(skip: bool, top: bool, count: bool) -> Self {
        Self { skip, top, count }
    }

    /// Forward nothing but filter and ordering.
    pub fn none() -> Self {
        Self::new(false, false, false)
    }
}

impl Default for Passthrough {
    fn default() -> Self {
        Self::new(true, true, true)
    }
}

impl Translator<'_> {
    /// Assemble the backend query string.
    ///
    /// Always starts with `?`; every emitted clause is followed by `&`,
    /// including the last one. Clauses come out in a fixed order:
    /// `$filter`, `$orderby`, `$skip`, `$top`, `$inlinecount`.
    ///
    /// Fails with [`RemapError::UnsupportedNode`] rather than forward a
    /// filter that still carries an unsupported-node placeholder.
    pub fn build_query(&self, options: &QueryOptions, allow: Passthrough) -> RemapResult<String> {
        let mut query = String::from("?");

        if let Some(filter) = &options.filter {
            let text = self.translate_filter(filter)?;
            if !text.trim().is_empty() {
                query.push_str(&format!("$filter={}&", text));
            }
        }

        let order = self.translate_order(options.order.as_ref());
        if !order.trim().is_empty() {
            query.push_str(&format!("$orderby={}&", order));
        }

        if allow.skip {
            if let Some(n) = options.skip {
                query.push_str(&format!("$skip={}&", n));
            }
        }

        if allow.top {
            if let Some(n) = options.top {
                query.push_str(&format!("$top={}&", n));
            }
        }

        if allow.count {
            if let Some(count) = &options.inline_count {
                query.push_str(&format!("$inlinecount={}&", count));
            }
        }

        debug!(query = %query, "assembled backend query");
        Ok(query)
    }
}

/// Reject a query that carries nothing for the backend (`?` alone).
pub fn require_content(query: String) -> RemapResult<String> {
    if query.trim().trim_start_matches('?').is_empty() {
        return Err(RemapError::NoTranslatableContent);
    }
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, Expr, OrderStep};
    use crate::mapping::FieldMapping;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_options() {
        let m = FieldMapping::new();
        let q = Translator::new(&m)
            .build_query(&QueryOptions::new(), Passthrough::default())
            .unwrap();
        assert_eq!(q, "?");
    }

    #[test]
    fn test_order_and_paging() {
        let m = FieldMapping::identity(["Name"]);
        let opts = QueryOptions::new()
            .order(OrderStep::new("Name", true))
            .skip(10)
            .top(5);
        let q = Translator::new(&m)
            .build_query(&opts, Passthrough::default())
            .unwrap();
        assert_eq!(q, "?$orderby=Name desc&$skip=10&$top=5&");
    }

    #[test]
    fn test_all_clauses_in_fixed_order() {
        let m = FieldMapping::new().map("Email", "E_Mail");
        let opts = QueryOptions::new()
            .inline_count("allpages")
            .top(20)
            .skip(40)
            .order(OrderStep::new("Email", false))
            .filter(Expr::binary(
                BinaryOperator::Ne,
                Expr::property("Email"),
                Expr::constant("null"),
            ));
        let q = Translator::new(&m)
            .build_query(&opts, Passthrough::default())
            .unwrap();
        assert_eq!(
            q,
            "?$filter=E_Mail ne null&$orderby=E_Mail&$skip=40&$top=20&$inlinecount=allpages&"
        );
    }

    #[test]
    fn test_disallowed_paging_is_omitted() {
        let m = FieldMapping::new();
        let opts = QueryOptions::new().skip(1).top(2).inline_count("allpages");
        let t = Translator::new(&m);
        assert_eq!(t.build_query(&opts, Passthrough::none()).unwrap(), "?");
        assert_eq!(
            t.build_query(&opts, Passthrough::new(false, true, false)).unwrap(),
            "?$top=2&"
        );
        assert_eq!(
            t.build_query(&opts, Passthrough::new(true, false, true)).unwrap(),
            "?$skip=1&$inlinecount=allpages&"
        );
    }

    #[test]
    fn test_fully_pruned_filter_and_order_are_omitted() {
        let m = FieldMapping::new().delete("Phone");
        let opts = QueryOptions::new()
            .filter(Expr::eq(Expr::property("Phone"), Expr::constant("'1'")))
            .order(OrderStep::new("Phone", false))
            .top(3);
        let q = Translator::new(&m)
            .build_query(&opts, Passthrough::default())
            .unwrap();
        assert_eq!(q, "?$top=3&");
    }

    #[test]
    fn test_unsupported_rejects_whole_query() {
        let m = FieldMapping::new();
        let opts = QueryOptions::new()
            .filter(Expr::unsupported("any(o: o/Total gt 5)"))
            .top(3);
        let err = Translator::new(&m)
            .build_query(&opts, Passthrough::default())
            .unwrap_err();
        assert!(matches!(err, RemapError::UnsupportedNode(_)));
    }

    #[test]
    fn test_require_content() {
        assert!(matches!(
            require_content("?".to_string()),
            Err(RemapError::NoTranslatableContent)
        ));
        assert_eq!(require_content("?$top=1&".to_string()).unwrap(), "?$top=1&");
    }
}
