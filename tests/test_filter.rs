//! Field filter properties.

use proptest::prelude::*;
use taxform_oxide::extractors::FormField;
use taxform_oxide::filter::{normalize_label, FieldFilter, FilterConfig};

fn field_strategy() -> impl Strategy<Value = FormField> {
    let name = prop_oneof![
        "f[0-9]_[0-9]{2}\\[0\\]",
        "topmostSubform\\[0\\]\\.Address_ReadOrder\\[0\\]",
    ];
    let label = prop_oneof![
        "[ a-zA-Z.\\-_\t]{0,24}",
        "\\PC{0,16}",
        Just("OMB No. 1545-0074".to_string()),
        Just("   Your   first name ".to_string()),
    ];
    (name, label).prop_map(|(name, label)| FormField::new(name, label))
}

proptest! {
    #[test]
    fn proptest_filter_is_idempotent(fields in prop::collection::vec(field_strategy(), 0..20)) {
        let filter = FieldFilter::new(FilterConfig::default()).unwrap();
        let once = filter.apply(&fields);
        let twice = filter.apply(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn proptest_filter_preserves_order(fields in prop::collection::vec(field_strategy(), 0..20)) {
        let filter = FieldFilter::new(FilterConfig::default()).unwrap();
        let kept = filter.apply(&fields);

        // Kept records appear as a subsequence of the input.
        let mut input = fields.iter();
        for field in &kept {
            let found = input.any(|candidate| {
                candidate.field_name == field.field_name && normalize_label(&candidate.label) == field.label
            });
            prop_assert!(found, "{:?} out of order", field);
        }
    }

    #[test]
    fn proptest_kept_labels_are_normalized(fields in prop::collection::vec(field_strategy(), 0..20)) {
        let filter = FieldFilter::new(FilterConfig::default()).unwrap();
        for field in filter.apply(&fields) {
            prop_assert_eq!(normalize_label(&field.label), field.label.clone());
            prop_assert!(field.label.chars().count() >= 3);
            prop_assert!(!field.field_name.contains("Address_ReadOrder"));
        }
    }
}

#[test]
fn test_three_spaces_dropped_for_any_min_length() {
    for min in 0..=3 {
        let filter = FieldFilter::new(FilterConfig::default().with_min_label_length(min)).unwrap();
        let kept = filter.apply(&[FormField::new("f1_01[0]", "   ")]);
        assert!(kept.is_empty(), "min_label_length={}", min);
    }
}

#[test]
fn test_boilerplate_is_case_insensitive() {
    let fields = vec![
        FormField::new("f1", "omb no. 1545-0074"),
        FormField::new("f2", "Tax return service use only"),
        FormField::new("f3", "Continued on SHEET 2"),
        FormField::new("f4", "Qualifying surviving spouse"),
    ];
    let kept = FieldFilter::new(FilterConfig::default()).unwrap().apply(&fields);
    assert_eq!(kept, vec![FormField::new("f4", "Qualifying surviving spouse")]);
}
