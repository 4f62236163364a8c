//! PATCH requests from RFC 7644 Section 3.5.2 applied to example resources.

use crate::common::{self, CORE_USER, ENTERPRISE_USER, rfc_examples};
use scim_patch::{Evaluator, GenericResource, PatchRequest, ScimError};
use serde_json::{Value, json};

fn request(value: Value) -> PatchRequest {
    serde_json::from_value(value).expect("valid PATCH request")
}

fn patched(resource: Value, body: Value) -> GenericResource {
    common::init_logging();
    let mut resource = common::resource(resource);
    resource.patch(&request(body)).expect("PATCH applies");
    resource
}

#[test]
fn test_add_member_to_group() {
    let group = patched(
        rfc_examples::group_basic(),
        json!({
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
            "Operations": [{
                "op": "add",
                "path": "members",
                "value": [{
                    "display": "James Smith",
                    "$ref": "https://example.com/v2/Users/08e1d05d-121c-4561-8b96-473d93df9210",
                    "value": "08e1d05d-121c-4561-8b96-473d93df9210"
                }]
            }]
        }),
    );
    assert_eq!(
        group.string_list("members.display").unwrap(),
        vec!["Babs Jensen", "Mandy Pepperidge", "James Smith"]
    );
}

#[test]
fn test_add_existing_member_is_not_duplicated() {
    let existing = rfc_examples::group_basic()["members"][0].clone();
    let group = patched(
        rfc_examples::group_basic(),
        json!({"Operations": [{"op": "add", "path": "members", "value": [existing]}]}),
    );
    assert_eq!(group.values("members").unwrap()[0].as_array().unwrap().len(), 2);
}

#[test]
fn test_remove_single_member() {
    let group = patched(
        rfc_examples::group_basic(),
        json!({"Operations": [{
            "op": "remove",
            "path": "members[value eq \"2819c223-7f76-453a-919d-413861904646\"]"
        }]}),
    );
    assert_eq!(
        group.string_list("members.value").unwrap(),
        vec!["902c246b-6245-4190-8e05-00816be7344a"]
    );
}

#[test]
fn test_remove_all_members() {
    let group = patched(
        rfc_examples::group_basic(),
        json!({"Operations": [{"op": "remove", "path": "members"}]}),
    );
    assert!(!group.exists("members").unwrap());
    assert_eq!(group.string_value("displayName").unwrap().as_deref(), Some("Tour Guides"));
}

#[test]
fn test_remove_every_filtered_member_drops_attribute() {
    let group = patched(
        rfc_examples::group_basic(),
        json!({"Operations": [{"op": "remove", "path": "members[value pr]"}]}),
    );
    assert!(group.as_map().get("members").is_none());
}

#[test]
fn test_replace_region_of_home_address() {
    let user = patched(
        rfc_examples::user_full(),
        json!({"Operations": [{
            "op": "replace",
            "path": "addresses[type eq \"home\"].region",
            "value": "TX"
        }]}),
    );
    assert_eq!(user.string_list("addresses.region").unwrap(), vec!["CA", "TX"]);
    assert_eq!(
        user.string_value(r#"addresses[type eq "home"].streetAddress"#)
            .unwrap()
            .as_deref(),
        Some("456 Hollywood Blvd")
    );
}

#[test]
fn test_replace_filtered_email_merges_element() {
    let user = patched(
        rfc_examples::user_full(),
        json!({"Operations": [{
            "op": "replace",
            "path": "emails[type eq \"work\"]",
            "value": {"value": "bjensen@acme.com"}
        }]}),
    );
    let emails = &user.as_map()["emails"];
    assert_eq!(
        emails[0],
        json!({"value": "bjensen@acme.com", "type": "work", "primary": true})
    );
    assert_eq!(emails[1]["value"], json!("babs@jensen.org"));
}

#[test]
fn test_replace_without_path_merges_attributes() {
    let user = patched(
        rfc_examples::user_full(),
        json!({"Operations": [{
            "op": "replace",
            "value": {
                "displayName": "Barbara Jensen",
                "name": {"familyName": "Jensen-Smith"},
                "active": false
            }
        }]}),
    );
    assert_eq!(user.string_value("displayName").unwrap().as_deref(), Some("Barbara Jensen"));
    assert_eq!(user.string_value("name.familyName").unwrap().as_deref(), Some("Jensen-Smith"));
    assert_eq!(user.string_value("name.givenName").unwrap().as_deref(), Some("Barbara"));
    assert_eq!(user.boolean_value("active").unwrap(), Some(false));
}

#[test]
fn test_enterprise_attribute_registers_schema() {
    let user = patched(
        rfc_examples::user_full(),
        json!({"Operations": [{
            "op": "add",
            "path": format!("{ENTERPRISE_USER}:employeeNumber"),
            "value": "701984"
        }]}),
    );
    assert_eq!(user.schemas().unwrap(), vec![CORE_USER, ENTERPRISE_USER]);
    assert_eq!(
        user.string_value(format!("{ENTERPRISE_USER}:employeeNumber")).unwrap().as_deref(),
        Some("701984")
    );
}

#[test]
fn test_enterprise_replace_keeps_schema_list() {
    let user = patched(
        rfc_examples::user_enterprise(),
        json!({"Operations": [{
            "op": "replace",
            "path": format!("{ENTERPRISE_USER}:manager.displayName"),
            "value": "Jane Smith"
        }]}),
    );
    assert_eq!(user.schemas().unwrap().len(), 2);
    assert_eq!(
        user.string_value(format!("{ENTERPRISE_USER}:manager.displayName"))
            .unwrap()
            .as_deref(),
        Some("Jane Smith")
    );
    assert_eq!(
        user.string_value(format!("{ENTERPRISE_USER}:manager.value")).unwrap().as_deref(),
        Some("26118915-6090-4610-87e4-49d8ca9f808d")
    );
}

#[test]
fn test_failed_operation_keeps_earlier_changes() {
    common::init_logging();
    let mut user = common::resource(rfc_examples::user_full());
    let body = request(json!({"Operations": [
        {"op": "replace", "path": "title", "value": "Head Guide"},
        {"op": "replace", "path": "phoneNumbers[type eq \"fax\"].value", "value": "555-555-0000"},
        {"op": "remove", "path": "nickName"}
    ]}));

    let error = user.patch(&body).unwrap_err();
    assert!(matches!(error, ScimError::InvalidTarget { .. }));
    assert_eq!(error.scim_type(), Some("noTarget"));
    assert_eq!(user.string_value("title").unwrap().as_deref(), Some("Head Guide"));
    assert_eq!(user.string_value("nickName").unwrap().as_deref(), Some("Babs"));
}

#[test]
fn test_replace_filtered_without_match_is_no_target() {
    let mut root = common::object(rfc_examples::user_full());
    let before = root.clone();
    let body = request(json!({"Operations": [{
        "op": "replace",
        "path": "emails[type eq \"other\"]",
        "value": {"value": "x@example.com"}
    }]}));
    let error = body.apply(&mut root, &Evaluator::new()).unwrap_err();
    assert!(matches!(error, ScimError::NoTarget { .. }));
    assert_eq!(root, before);
}

#[test]
fn test_invalid_requests_are_rejected_while_parsing() {
    let cases = [
        json!({"Operations": [{"op": "add", "path": "emails[type eq \"work\"].value", "value": "x"}]}),
        json!({"Operations": [{"op": "add", "value": "not an object"}]}),
        json!({"Operations": [{"op": "replace", "path": "title", "value": null}]}),
        json!({"Operations": [{"op": "remove"}]}),
        json!({"Operations": [{"op": "merge", "path": "title", "value": "x"}]}),
        json!({"Operations": [{"op": "replace", "path": "name.givenName.first", "value": "x"}]}),
        json!({"Operations": [{"op": "remove", "path": "emails[type eq"}]}),
        json!({"schemas": ["urn:example:Other"], "Operations": []}),
    ];
    for case in cases {
        assert!(
            serde_json::from_value::<PatchRequest>(case.clone()).is_err(),
            "accepted {case}"
        );
    }
}

#[test]
fn test_request_round_trips_through_json() {
    let body = json!({
        "schemas": ["urn:ietf:params:scim:api:messages:2.0:PatchOp"],
        "Operations": [
            {"op": "add", "path": "nickName", "value": "Babs"},
            {"op": "replace", "path": "emails[type eq \"work\"].value", "value": "b@example.com"},
            {"op": "remove", "path": "x509Certificates"}
        ]
    });
    assert_eq!(serde_json::to_value(request(body.clone())).unwrap(), body);
}
