use serde::{Deserialize, Serialize};

use crate::ast::{Expr, OrderStep};

/// The query options of one request: filter, ordering and paging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    #[serde(default)]
    pub filter: Option<Expr>,
    #[serde(default)]
    pub order: Option<OrderStep>,
    #[serde(default)]
    pub skip: Option<u64>,
    #[serde(default)]
    pub top: Option<u64>,
    /// Raw `$inlinecount` value (`allpages`, `none`), passed through untouched.
    #[serde(default)]
    pub inline_count: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Expr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order(mut self, order: OrderStep) -> Self {
        self.order = Some(order);
        self
    }

    pub fn skip(mut self, n: u64) -> Self {
        self.skip = Some(n);
        self
    }

    pub fn top(mut self, n: u64) -> Self {
        self.top = Some(n);
        self
    }

    pub fn inline_count(mut self, value: impl Into<String>) -> Self {
        self.inline_count = Some(value.into());
        self
    }
}
