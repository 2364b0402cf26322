use serde::{Deserialize, Serialize};

/// One key of an `$orderby` chain. Keys are applied left to right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStep {
    pub property: String,
    #[serde(default)]
    pub descending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<OrderStep>>,
}

impl OrderStep {
    pub fn new(property: impl Into<String>, descending: bool) -> Self {
        Self {
            property: property.into(),
            descending,
            next: None,
        }
    }

    /// Append a secondary key after this one.
    pub fn then_by(self, property: impl Into<String>, descending: bool) -> Self {
        let mut keys: Vec<(String, bool)> = self
            .iter()
            .map(|s| (s.property.clone(), s.descending))
            .collect();
        keys.push((property.into(), descending));
        match OrderStep::from_keys(keys) {
            Some(chain) => chain,
            None => self,
        }
    }

    /// Build a chain from `(property, descending)` keys; `None` when empty.
    pub fn from_keys<I, S>(keys: I) -> Option<Self>
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let keys: Vec<(String, bool)> = keys.into_iter().map(|(p, d)| (p.into(), d)).collect();
        keys.into_iter().rev().fold(None, |next, (property, descending)| {
            Some(OrderStep {
                property,
                descending,
                next: next.map(Box::new),
            })
        })
    }

    /// Walk the chain from this step onwards.
    pub fn iter(&self) -> OrderIter<'_> {
        OrderIter { current: Some(self) }
    }
}

pub struct OrderIter<'a> {
    current: Option<&'a OrderStep>,
}

impl<'a> Iterator for OrderIter<'a> {
    type Item = &'a OrderStep;

    fn next(&mut self) -> Option<Self::Item> {
        let step = self.current?;
        self.current = step.next.as_deref();
        Some(step)
    }
}
