//! `$orderby` translation.

use tracing::debug;

use super::Translator;
use crate::ast::OrderStep;

impl Translator<'_> {
    /// Comma-joined backend ordering; deleted keys are skipped.
    ///
    /// Walks the chain iteratively, so chain length never grows the stack.
    pub fn translate_order(&self, chain: Option<&OrderStep>) -> String {
        let Some(first) = chain else {
            return String::new();
        };

        let mut keys: Vec<String> = Vec::new();
        for step in first.iter() {
            match self.mapping.resolve(&step.property) {
                Some(mapped) if step.descending => keys.push(format!("{} desc", mapped)),
                Some(mapped) => keys.push(mapped.to_string()),
                None => debug!(field = %step.property, "skipping sort key on deleted field"),
            }
        }
        keys.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::FieldMapping;

    fn chain(keys: &[(&str, bool)]) -> OrderStep {
        OrderStep::from_keys(keys.iter().copied()).unwrap()
    }

    #[test]
    fn test_single_key() {
        let m = FieldMapping::new().map("Name", "Cust_Name");
        let t = Translator::new(&m);
        assert_eq!(t.translate_order(Some(&chain(&[("Name", false)]))), "Cust_Name");
        assert_eq!(t.translate_order(Some(&chain(&[("Name", true)]))), "Cust_Name desc");
    }

    #[test]
    fn test_multi_key() {
        let m = FieldMapping::new().map("CreateDate", "Last_Date_Modified");
        let c = chain(&[("CreateDate", true), ("Name", false), ("City", true)]);
        assert_eq!(
            Translator::new(&m).translate_order(Some(&c)),
            "Last_Date_Modified desc,Name,City desc"
        );
    }

    #[test]
    fn test_deleted_interior_key() {
        let m = FieldMapping::new().delete("B");
        let c = chain(&[("A", false), ("B", true), ("C", false)]);
        assert_eq!(Translator::new(&m).translate_order(Some(&c)), "A,C");
    }

    #[test]
    fn test_deleted_leading_and_trailing_keys() {
        let m = FieldMapping::new().delete("A").delete("D");
        let c = chain(&[("A", false), ("B", true), ("C", false), ("D", true)]);
        assert_eq!(Translator::new(&m).translate_order(Some(&c)), "B desc,C");
    }

    #[test]
    fn test_all_keys_deleted() {
        let m = FieldMapping::new().delete("A").delete("B");
        let c = chain(&[("A", false), ("B", true)]);
        assert_eq!(Translator::new(&m).translate_order(Some(&c)), "");
    }

    #[test]
    fn test_no_chain() {
        let m = FieldMapping::new();
        assert_eq!(Translator::new(&m).translate_order(None), "");
    }
}
