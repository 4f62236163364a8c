//! Filter expressions evaluated against whole example resources.

use crate::common::rfc_examples;
use scim_patch::{EngineConfig, Evaluator, Filter, ScimError};
use serde_json::Value;

fn matches(expression: &str, resource: &Value) -> bool {
    let filter = Filter::parse(expression).expect("filter parses");
    Evaluator::new()
        .evaluate(&filter, resource)
        .expect("filter evaluates")
}

#[test]
fn test_rfc_filter_examples() {
    let user = rfc_examples::user_full();
    let cases = [
        (r#"userName eq "bjensen@example.com""#, true),
        (r#"userName Eq "BJENSEN@EXAMPLE.COM""#, true),
        (r#"name.familyName co "ens""#, true),
        (r#"userName sw "bj""#, true),
        (r#"userName ew "@example.org""#, false),
        ("title pr", true),
        ("nickName pr and honorificPrefix pr", false),
        (r#"meta.lastModified gt "2011-05-13T04:42:34Z""#, false),
        (r#"meta.lastModified ge "2011-05-13T04:42:34Z""#, true),
        (r#"meta.lastModified lt "2011-05-13T06:42:34+02:00""#, false),
        (r#"meta.created lt "2011-01-01T00:00:00Z""#, true),
        (r#"title pr and userType eq "Employee""#, true),
        (r#"title pr or userType eq "Intern""#, true),
        (r#"userType eq "Employee" and (emails.value co "example.com" or emails.value co "example.org")"#, true),
        (r#"userType ne "Employee" and not (emails.value co "example.com")"#, false),
        (r#"not (emails.value co "example.org")"#, true),
        (r#"emails co "example.com""#, false),
        (r#"userType eq "Employee" and emails[type eq "work" and value co "@example.com"]"#, true),
        (r#"emails[type eq "work" and value co "@example.com"] or ims[type eq "xmpp" and value co "@foo.com"]"#, true),
        (r#"ims[type eq "xmpp"]"#, false),
        ("active eq true", true),
        ("active ne false", true),
        ("nickName eq null", false),
        ("profileUrl eq null", false),
        ("manager eq null", true),
    ];
    for (expression, expected) in cases {
        assert_eq!(matches(expression, &user), expected, "{expression}");
    }
}

#[test]
fn test_extension_attributes_in_filters() {
    let user = rfc_examples::user_enterprise();
    assert!(matches(
        r#"urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:employeeNumber eq "701984""#,
        &user
    ));
    assert!(matches(
        r#"urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.displayName sw "John""#,
        &user
    ));
}

#[test]
fn test_case_exact_configuration() {
    let user = rfc_examples::user_full();
    let filter = Filter::parse(r#"userName eq "BJensen@example.com""#).unwrap();
    let exact = Evaluator::from_config(&EngineConfig::default().with_case_exact(true));
    assert!(!exact.evaluate(&filter, &user).unwrap());
    assert!(Evaluator::new().evaluate(&filter, &user).unwrap());
}

#[test]
fn test_ordering_of_booleans_is_rejected() {
    let user = rfc_examples::user_full();
    let filter = Filter::parse("active gt false").unwrap();
    let error = Evaluator::new().evaluate(&filter, &user).unwrap_err();
    assert!(matches!(error, ScimError::InvalidFilter { .. }));
    assert_eq!(error.scim_type(), Some("invalidFilter"));
}

#[test]
fn test_filters_display_and_reparse() {
    for expression in [
        r#"userType eq "Employee" and (emails.value co "example.com" or emails.value co "example.org")"#,
        "not (title pr)",
        r#"emails[type eq "work" and value co "@example.com"]"#,
        "meta.lastModified gt \"2011-05-13T04:42:34Z\"",
    ] {
        let filter = Filter::parse(expression).unwrap();
        let reparsed = Filter::parse(&filter.to_string()).unwrap();
        assert_eq!(reparsed, filter, "{expression}");
    }
}

#[test]
fn test_malformed_filters() {
    for expression in [
        "",
        "title",
        "title xx \"a\"",
        "not title pr",
        "(title pr",
        "emails[type eq \"work\"",
        "title eq unquoted",
        "title pr and",
    ] {
        assert!(
            matches!(Filter::parse(expression), Err(ScimError::InvalidFilter { .. })),
            "accepted {expression:?}"
        );
    }
}
