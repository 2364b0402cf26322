//! # odata-remap
//!
//! Rewrites OData queries written against a client-facing schema so they can
//! be forwarded to a backend that names its fields differently.
//!
//! A service exposes one set of field names to callers, parses the incoming
//! query, and hands the parsed tree plus a [`mapping::FieldMapping`] to the
//! transpiler. Fields are renamed, clauses on deleted fields are pruned, and
//! the result is a query string for the backend.
//!
//! ## Quick Example
//!
//! ```
//! use odata_remap::prelude::*;
//!
//! let mapping = FieldMapping::new()
//!     .map("Email", "E_Mail")
//!     .delete("Phone");
//!
//! let options = odata_remap::parse("$filter=Email eq 'x' and Phone eq 'y'&$top=5")?;
//! let query = options.to_odata(&mapping)?;
//! assert_eq!(query, "?$filter=E_Mail eq 'x'&$top=5&");
//! # Ok::<(), RemapError>(())
//! ```
//!
//! ## Pruning rules
//!
//! | Node            | Operand references a deleted field        |
//! |-----------------|-------------------------------------------|
//! | `and` / `or`    | that operand is left out, sibling kept    |
//! | comparison/math | whole node pruned                         |
//! | conversion      | whole node pruned                         |
//! | function call   | whole call pruned                         |

pub mod ast;
pub mod config;
pub mod error;
pub mod mapping;
pub mod parser;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::{EntityConfig, RemapConfig};
    pub use crate::error::*;
    pub use crate::mapping::{FieldMapper, FieldMapping};
    pub use crate::parser::{parse_filter, parse_orderby, parse_query};
    pub use crate::transpiler::{require_content, Passthrough, ToOData, Translator};
}

/// Parse a raw OData query string into query options.
///
/// # Example
///
/// ```
/// use odata_remap::parse;
///
/// let options = parse("?$orderby=Name desc&$skip=10").unwrap();
/// assert_eq!(options.skip, Some(10));
/// ```
pub fn parse(input: &str) -> Result<ast::QueryOptions, error::RemapError> {
    parser::parse_query(input)
}
