//! Property-based tests of the traversal engine and the typed accessors.
//!
//! Uses proptest for generating values and trees with automatic shrinking.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use scim_patch::{Binary, Filter, GenericResource, Path, Reference};
use serde_json::{Value, json};

/// Attribute names as SCIM allows them.
fn attribute_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_-]{0,10}"
}

fn date() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_102_444_800, 0u32..1_000_000_000)
        .prop_map(|(seconds, nanos)| Utc.timestamp_opt(seconds, nanos).unwrap())
}

fn tags() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-d]{1,2}", 0..8)
}

/// A resource holding a few scalar attributes and a multi-valued one.
fn user_resource() -> impl Strategy<Value = GenericResource> {
    (
        "[a-z]{1,12}",
        any::<bool>(),
        prop::collection::vec(("[a-c]", "[a-z]{1,6}"), 0..6),
    )
        .prop_map(|(user_name, active, emails)| {
            let emails: Vec<Value> = emails
                .into_iter()
                .map(|(kind, value)| json!({"type": kind, "value": value}))
                .collect();
            let mut root = json!({"userName": user_name, "active": active});
            if !emails.is_empty() {
                root["emails"] = Value::Array(emails);
            }
            GenericResource::try_from(root).unwrap()
        })
}

proptest! {
    #[test]
    fn prop_typed_replace_round_trips(
        flag in any::<bool>(),
        count in any::<i64>(),
        small in any::<i32>(),
        ratio in prop::num::f64::NORMAL,
        text in ".*",
        when in date(),
        bytes in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let mut resource = GenericResource::new();
        resource.replace("flag", flag).unwrap();
        resource.replace("counts.long", count).unwrap();
        resource.replace("counts.int", small).unwrap();
        resource.replace("ratio", ratio).unwrap();
        resource.replace("text", text.clone()).unwrap();
        resource.replace("meta.lastModified", when).unwrap();
        resource.replace("blob", Binary(bytes.clone())).unwrap();

        prop_assert_eq!(resource.boolean_value("flag").unwrap(), Some(flag));
        prop_assert_eq!(resource.long_value("counts.long").unwrap(), Some(count));
        prop_assert_eq!(resource.integer_value("counts.int").unwrap(), Some(small));
        prop_assert_eq!(resource.double_value("ratio").unwrap(), Some(ratio));
        prop_assert_eq!(resource.string_value("text").unwrap(), Some(text));
        prop_assert_eq!(resource.date_value("meta.lastModified").unwrap(), Some(when));
        prop_assert_eq!(resource.binary_value("blob").unwrap(), Some(bytes));
    }

    #[test]
    fn prop_reference_replace_round_trips(segment in "[a-z0-9]{1,12}") {
        let mut resource = GenericResource::new();
        let absolute = Reference::parse(&format!("https://example.com/v2/Users/{segment}")).unwrap();
        let relative = Reference::parse(&format!("../Groups/{segment}")).unwrap();
        resource.replace("profileUrl", absolute.clone()).unwrap();
        resource.replace("group", relative.clone()).unwrap();
        prop_assert_eq!(resource.uri_value("profileUrl").unwrap(), Some(absolute));
        prop_assert_eq!(resource.uri_value("group").unwrap(), Some(relative));
    }

    #[test]
    fn prop_scalar_replace_is_idempotent(
        mut resource in user_resource(),
        name in attribute_name(),
        text in "[ -~]{0,20}",
    ) {
        resource.replace(name.as_str(), text.clone()).unwrap();
        let once = resource.clone();
        resource.replace(name.as_str(), text).unwrap();
        prop_assert_eq!(resource, once);
    }

    #[test]
    fn prop_list_add_preserves_order_and_dedupes(first in tags(), second in tags()) {
        let mut resource = GenericResource::new();
        resource.add("tags", first.clone()).unwrap();
        resource.add("tags", second.clone()).unwrap();

        let mut expected = first.clone();
        for tag in second {
            if !expected.contains(&tag) {
                expected.push(tag);
            }
        }
        prop_assert_eq!(resource.string_list("tags").unwrap(), expected);
    }

    #[test]
    fn prop_void_updates_change_nothing(mut resource in user_resource(), name in attribute_name()) {
        let before = resource.clone();
        resource.replace_value(name.as_str(), Value::Null).unwrap();
        resource.add_value(name.as_str(), json!([])).unwrap();
        resource.replace_value(name.as_str(), json!([])).unwrap();
        prop_assert_eq!(resource, before);
    }

    #[test]
    fn prop_remove_of_absent_path_changes_nothing(mut resource in user_resource()) {
        let before = resource.clone();
        prop_assert!(!resource.remove("nickName").unwrap());
        prop_assert!(!resource.remove(r#"emails[type eq "z"]"#).unwrap());
        prop_assert_eq!(resource, before);
    }

    #[test]
    fn prop_filtered_remove_partitions(mut resource in user_resource()) {
        let emails = resource.values("emails").unwrap();
        let total = emails.first().and_then(Value::as_array).map_or(0, Vec::len);
        let matching = resource.values(r#"emails[type eq "a"]"#).unwrap();
        let hits = matching.first().and_then(Value::as_array).map_or(0, Vec::len);

        let removed = resource.remove(r#"emails[type eq "a"]"#).unwrap();
        prop_assert_eq!(removed, hits > 0);
        prop_assert!(!resource.exists(r#"emails[type eq "a"]"#).unwrap());

        let left = resource.values("emails").unwrap();
        let remaining = left.first().and_then(Value::as_array).map_or(0, Vec::len);
        prop_assert_eq!(remaining, total - hits);
        // An emptied attribute disappears instead of lingering as []
        prop_assert_eq!(resource.as_map().contains_key("emails"), remaining > 0);
    }

    #[test]
    fn prop_filtered_replace_without_match_changes_nothing(mut resource in user_resource()) {
        let before = resource.clone();
        prop_assert!(resource
            .replace(r#"emails[type eq "z"].value"#, "x".to_string())
            .is_err());
        prop_assert!(resource
            .replace_value(r#"emails[type eq "z"]"#, json!({"value": "x"}))
            .is_err(), "filtered replace_value without match must fail");
        prop_assert_eq!(resource, before);
    }

    #[test]
    fn prop_path_display_reparses(
        names in prop::collection::vec(attribute_name(), 1..4),
        literal in "[a-z ]{0,10}",
    ) {
        let mut path = Path::root();
        for (i, name) in names.iter().enumerate() {
            path = if i == 0 {
                path.with_filtered_attribute(
                    name.as_str(),
                    Filter::eq(Path::parse("type").unwrap(), json!(literal)),
                )
            } else {
                path.with_attribute(name.as_str())
            };
        }
        let reparsed = Path::parse(&path.to_string()).unwrap();
        prop_assert_eq!(reparsed, path);
    }
}
