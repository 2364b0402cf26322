//! OData query transpiler.
//!
//! Re-serializes a parsed filter tree, ordering chain and paging options
//! against a backend field schema, renaming fields through a
//! [`FieldMapping`] and pruning clauses that reference deleted fields.

pub mod filter;
pub mod order;
pub mod query;


use crate::ast::*;
use crate::error::RemapResult;
use crate::mapping::FieldMapping;

pub use filter::{Translated, UNSUPPORTED_MARKER};
pub use query::{require_content, Passthrough};

/// Default bound on expression nesting.
///
/// Counted per tree level, so a flat `A and B and C ...` chain, which parses
/// into a left-deep tree, uses one level per clause: with the default bound a
/// filter may hold at most 255 clauses joined by `and`/`or`.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Translation context: the mapping of one entity plus limits.
///
/// Holds only shared references, so one translator (or one mapping) can serve
/// any number of concurrent translations.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'m> {
    mapping: &'m FieldMapping,
    max_depth: usize,
}

impl<'m> Translator<'m> {
    pub fn new(mapping: &'m FieldMapping) -> Self {
        Self {
            mapping,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn mapping(&self) -> &'m FieldMapping {
        self.mapping
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Trait for converting AST nodes to backend OData text.
pub trait ToOData {
    /// Convert using the default limits.
    fn to_odata(&self, mapping: &FieldMapping) -> RemapResult<String> {
        self.to_odata_with(&Translator::new(mapping))
    }
    /// Convert with a configured translator.
    fn to_odata_with(&self, translator: &Translator<'_>) -> RemapResult<String>;
}

impl ToOData for Expr {
    fn to_odata_with(&self, translator: &Translator<'_>) -> RemapResult<String> {
        translator.translate_filter(self)
    }
}

impl ToOData for OrderStep {
    fn to_odata_with(&self, translator: &Translator<'_>) -> RemapResult<String> {
        Ok(translator.translate_order(Some(self)))
    }
}

impl ToOData for QueryOptions {
    fn to_odata_with(&self, translator: &Translator<'_>) -> RemapResult<String> {
        translator.build_query(self, Passthrough::default())
    }
}
