use crate::models::PartialRecord;

pub fn normalize_category_type(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Keeps records carrying at least one category of the wanted type,
/// compared trimmed and case-insensitively.
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    wanted: String,
}

impl CategoryFilter {
    pub fn new(category_type: &str) -> Self {
        Self {
            wanted: normalize_category_type(category_type),
        }
    }

    pub fn wanted(&self) -> &str {
        &self.wanted
    }

    pub fn matches(&self, record: &PartialRecord) -> bool {
        record
            .categories
            .iter()
            .any(|category| normalize_category_type(&category.kind) == self.wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn record_with_types<S: AsRef<str>>(types: &[S]) -> PartialRecord {
        let categories: Vec<Value> = types
            .iter()
            .map(|kind| json!({"id": "c", "name": "Category", "type": kind.as_ref()}))
            .collect();
        let body = json!({"id": "evt", "categories": categories});
        PartialRecord::decode(body.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn wanted_type_is_normalized_once() {
        assert_eq!(CategoryFilter::new("  SpOrT \t").wanted(), "sport");
    }

    #[test]
    fn matches_case_insensitively_after_trim() {
        let filter = CategoryFilter::new("Sport");
        assert!(filter.matches(&record_with_types(&["sport"])));
        assert!(filter.matches(&record_with_types(&[" SPORT "])));
        assert!(filter.matches(&record_with_types(&["concert", "Sport"])));
    }

    #[test]
    fn rejects_other_types() {
        let filter = CategoryFilter::new("sport");
        assert!(!filter.matches(&record_with_types(&["concert", "theater"])));
        assert!(!filter.matches(&record_with_types(&["sports"])));
        assert!(!filter.matches(&record_with_types(&[""])));
    }

    #[test]
    fn empty_category_list_never_matches() {
        let none: [&str; 0] = [];
        assert!(!CategoryFilter::new("sport").matches(&record_with_types(&none)));
        assert!(!CategoryFilter::new("").matches(&record_with_types(&none)));
    }

    #[test]
    fn decoded_records_are_matched_on_type_field() {
        let record = PartialRecord::decode(
            br#"{"categories":[{"name":"sport","type":"concert"},"sport",{"type":"Theater"}]}"#,
        )
        .unwrap();
        assert!(!CategoryFilter::new("sport").matches(&record));
        assert!(CategoryFilter::new("theater").matches(&record));
    }

    proptest! {
        #[test]
        fn matches_iff_some_type_normalizes_to_wanted(
            types in prop::collection::vec("[ a-zA-Z]{0,6}", 0..5),
            wanted in "[ sSpPoOrRtT]{0,6}",
        ) {
            let expected = types
                .iter()
                .any(|kind| kind.trim().to_lowercase() == wanted.trim().to_lowercase());
            let record = record_with_types(&types);
            prop_assert_eq!(CategoryFilter::new(&wanted).matches(&record), expected);
        }
    }
}
