//! Field rename table and delete set.
//!
//! A [`FieldMapping`] describes how one client-facing entity maps onto a
//! backend entity: an ordered list of `from -> to` renames plus a set of
//! fields whose clauses are stripped from outgoing queries.
//!
//! ```
//! use odata_remap::mapping::FieldMapping;
//!
//! let mapping = FieldMapping::new()
//!     .map("CustCode", "No")
//!     .map("Email", "E_Mail")
//!     .delete("Phone");
//!
//! assert_eq!(mapping.resolve("Email"), Some("E_Mail"));
//! assert_eq!(mapping.resolve("Name"), Some("Name"));
//! assert_eq!(mapping.resolve("Phone"), None);
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{trace, warn};

use crate::error::{RemapError, RemapResult};

/// One rename pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapper {
    pub from: String,
    pub to: String,
}

impl FieldMapper {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Rename table plus delete set for one entity.
///
/// When several pairs share a `from` name the first one in list order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(default)]
    pub fields: Vec<FieldMapper>,
    #[serde(default)]
    pub delete: BTreeSet<String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rename pair after the existing ones.
    pub fn map(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.fields.push(FieldMapper::new(from, to));
        self
    }

    /// Mark a field whose clauses must be removed.
    pub fn delete(mut self, name: impl Into<String>) -> Self {
        self.delete.insert(name.into());
        self
    }

    /// Identity table: every name maps onto itself.
    pub fn identity<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = names
            .into_iter()
            .map(|n| {
                let n = n.into();
                FieldMapper::new(n.clone(), n)
            })
            .collect();
        Self {
            fields,
            delete: BTreeSet::new(),
        }
    }

    pub fn is_deleted(&self, name: &str) -> bool {
        self.delete.contains(name)
    }

    /// Backend name for `name`, ignoring the delete set.
    pub fn rename<'a>(&'a self, name: &'a str) -> &'a str {
        self.fields
            .iter()
            .find(|pair| pair.from == name)
            .map(|pair| pair.to.as_str())
            .unwrap_or(name)
    }

    /// Backend name for `name`, or `None` when the field is deleted.
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.is_deleted(name) {
            return None;
        }
        let mapped = self.rename(name);
        trace!(from = name, to = mapped, "resolved field");
        Some(mapped)
    }

    /// Source names that appear in more than one pair, in first-seen order.
    pub fn duplicate_sources(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut dups: Vec<&str> = Vec::new();
        for pair in &self.fields {
            if !seen.insert(pair.from.as_str()) && !dups.contains(&pair.from.as_str()) {
                dups.push(pair.from.as_str());
            }
        }
        dups
    }

    /// Rename the keys of a backend record back to client-facing names.
    ///
    /// Each key is matched against the `to` side of the table (first match
    /// wins); keys with no pair are copied unchanged. When two backend keys
    /// land on one client name, the key renamed by a pair wins over a key
    /// copied unchanged.
    pub fn map_record_back(&self, record: &Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::new();
        let mut renamed: BTreeSet<String> = BTreeSet::new();
        for (key, value) in record {
            let pair = self.fields.iter().find(|pair| pair.to == *key);
            let name = pair.map_or(key.as_str(), |pair| pair.from.as_str());
            if out.contains_key(name) {
                warn!(field = name, backend_key = %key, "two backend keys map onto one field");
                if pair.is_none() || renamed.contains(name) {
                    continue;
                }
            }
            if pair.is_some() {
                renamed.insert(name.to_string());
            }
            out.insert(name.to_string(), value.clone());
        }
        out
    }

    /// Rename a whole backend payload: a single record, an array of records,
    /// or an object whose `value` member holds the records.
    pub fn map_payload_back(&self, payload: Value) -> RemapResult<Value> {
        match payload {
            Value::Array(rows) => rows
                .into_iter()
                .map(|row| match row {
                    Value::Object(record) => Ok(Value::Object(self.map_record_back(&record))),
                    other => Err(RemapError::InvalidPayload(format!(
                        "expected a record, got {}",
                        other
                    ))),
                })
                .collect::<RemapResult<Vec<_>>>()
                .map(Value::Array),
            Value::Object(mut envelope) if envelope.get("value").is_some_and(Value::is_array) => {
                if let Some(rows) = envelope.remove("value") {
                    envelope.insert("value".to_string(), self.map_payload_back(rows)?);
                }
                Ok(Value::Object(envelope))
            }
            Value::Object(record) => Ok(Value::Object(self.map_record_back(&record))),
            other => Err(RemapError::InvalidPayload(format!(
                "expected an object or array, got {}",
                other
            ))),
        }
    }

    /// Merge another table behind this one. Pairs from `self` keep precedence.
    pub fn extend(&mut self, other: FieldMapping) {
        self.fields.extend(other.fields);
        self.delete.extend(other.delete);
    }
}
