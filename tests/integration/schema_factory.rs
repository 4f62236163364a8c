//! Attribute derivation for Rust types describing SCIM resources.

use crate::common::{self, ENTERPRISE_USER};
use scim_patch::schema::{
    AttributeDefinition, AttributeType, FieldDescriptor, FieldKind, Mutability, Returned,
    SchemaFactory, ScimType, TypeDescriptor, Uniqueness,
};
use scim_patch::{Meta, ScimError};
use serde_json::json;

struct Manager;

impl ScimType for Manager {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new("Manager")
            .field(FieldDescriptor::simple("value", AttributeType::String))
            .field(
                FieldDescriptor::simple("$ref", AttributeType::Reference)
                    .reference_types(["User"]),
            )
            .field(
                FieldDescriptor::simple("displayName", AttributeType::String)
                    .mutability(Mutability::ReadOnly),
            )
    }
}

struct EnterpriseUser;

impl ScimType for EnterpriseUser {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new("EnterpriseUser")
            .schema_id(ENTERPRISE_USER)
            .schema_name("EnterpriseUser")
            .description("Enterprise User")
            .field(
                FieldDescriptor::simple("employeeNumber", AttributeType::String)
                    .description("Numeric or alphanumeric identifier assigned to a person."),
            )
            .field(FieldDescriptor::simple("costCenter", AttributeType::String))
            .field(FieldDescriptor::simple("organization", AttributeType::String))
            .field(FieldDescriptor::simple("division", AttributeType::String))
            .field(FieldDescriptor::simple("department", AttributeType::String))
            .field(FieldDescriptor::complex("manager", "Manager"))
    }
}

struct Account;

impl ScimType for Account {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new("Account")
            .field(
                FieldDescriptor::simple("id", AttributeType::String)
                    .case_exact(true)
                    .mutability(Mutability::ReadOnly)
                    .returned(Returned::Always)
                    .uniqueness(Uniqueness::Server),
            )
            .field(
                FieldDescriptor::simple("password", AttributeType::String)
                    .mutability(Mutability::WriteOnly)
                    .returned(Returned::Never),
            )
            .field(FieldDescriptor::multi_valued(
                "loginHours",
                FieldKind::Simple(AttributeType::Integer),
            ))
            .field(FieldDescriptor::complex("meta", "Meta"))
    }
}

fn factory() -> SchemaFactory {
    let mut factory = SchemaFactory::new();
    factory
        .register::<Manager>()
        .register::<EnterpriseUser>()
        .register::<Account>();
    factory
}

#[test]
fn test_enterprise_schema_wire_form() {
    common::init_logging();
    let schema = factory().schema("EnterpriseUser").unwrap();
    let value = serde_json::to_value(&schema).unwrap();

    assert_eq!(value["id"], json!(ENTERPRISE_USER));
    assert_eq!(value["name"], json!("EnterpriseUser"));
    assert_eq!(value["attributes"].as_array().unwrap().len(), 6);
    assert_eq!(
        value["attributes"][5],
        json!({
            "name": "manager",
            "type": "complex",
            "multiValued": false,
            "required": false,
            "caseExact": false,
            "mutability": "readWrite",
            "returned": "default",
            "uniqueness": "none",
            "subAttributes": [
                {
                    "name": "value",
                    "type": "string",
                    "multiValued": false,
                    "required": false,
                    "caseExact": false,
                    "mutability": "readWrite",
                    "returned": "default",
                    "uniqueness": "none"
                },
                {
                    "name": "$ref",
                    "type": "reference",
                    "multiValued": false,
                    "required": false,
                    "caseExact": false,
                    "mutability": "readWrite",
                    "returned": "default",
                    "uniqueness": "none",
                    "referenceTypes": ["User"]
                },
                {
                    "name": "displayName",
                    "type": "string",
                    "multiValued": false,
                    "required": false,
                    "caseExact": false,
                    "mutability": "readOnly",
                    "returned": "default",
                    "uniqueness": "none"
                }
            ]
        })
    );
}

#[test]
fn test_characteristics_carry_over() {
    let attributes = factory().attributes("Account").unwrap();

    let id = AttributeDefinition::find(&attributes, &"id".parse().unwrap()).unwrap();
    assert!(id.case_exact);
    assert_eq!(id.returned, Returned::Always);
    assert_eq!(id.uniqueness, Uniqueness::Server);

    let password = AttributeDefinition::find(&attributes, &"password".parse().unwrap()).unwrap();
    assert_eq!(password.mutability, Mutability::WriteOnly);
    assert_eq!(password.returned, Returned::Never);

    let hours = AttributeDefinition::find(&attributes, &"loginHours".parse().unwrap()).unwrap();
    assert!(hours.multi_valued);
    assert_eq!(hours.data_type, AttributeType::Integer);

    let created =
        AttributeDefinition::find(&attributes, &"meta.created".parse().unwrap()).unwrap();
    assert_eq!(created.data_type, AttributeType::DateTime);
    assert_eq!(created.mutability, Mutability::ReadOnly);
}

#[test]
fn test_meta_descriptor_matches_meta_wire_names() {
    let factory = SchemaFactory::new();
    let attributes = factory.attributes("Meta").unwrap();
    let meta = serde_json::to_value(Meta {
        created: Some(chrono::Utc::now()),
        last_modified: Some(chrono::Utc::now()),
        location: Some("https://example.com/v2/Users/1".to_string()),
        version: Some("W/\"1\"".to_string()),
        ..Meta::new("User")
    })
    .unwrap();
    let wire_names: Vec<&String> = meta.as_object().unwrap().keys().collect();
    let attribute_names: Vec<&String> = attributes.iter().map(|a| &a.name).collect();
    assert_eq!(wire_names, attribute_names);
}

#[test]
fn test_attribute_definition_schema_describes_itself() {
    let factory = SchemaFactory::new();
    let schema = factory
        .schema(scim_patch::schema::ATTRIBUTE_DEFINITION_TYPE)
        .unwrap();
    let names: Vec<&str> = schema.attributes.iter().map(|a| a.name.as_str()).collect();
    for expected in ["name", "type", "multiValued", "caseExact", "subAttributes"] {
        assert!(names.contains(&expected), "missing {expected}");
    }

    // A derived definition round-trips through its own wire form
    let text = serde_json::to_string(&schema.attributes).unwrap();
    let back: Vec<AttributeDefinition> = serde_json::from_str(&text).unwrap();
    assert_eq!(back, schema.attributes);
}

#[test]
fn test_unregistered_nested_type() {
    let mut factory = SchemaFactory::new();
    factory.register::<EnterpriseUser>();
    let error = factory.schema("EnterpriseUser").unwrap_err();
    assert!(matches!(
        error,
        ScimError::SchemaNotFound { ref type_name } if type_name == "Manager"
    ));
    assert_eq!(error.scim_type(), None);
}

#[test]
fn test_self_referencing_type_is_a_cycle() {
    struct Employee;

    impl ScimType for Employee {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::new("Employee")
                .field(FieldDescriptor::simple("employeeNumber", AttributeType::String))
                .field(FieldDescriptor::complex("manager", "Employee"))
        }
    }

    let mut factory = SchemaFactory::new();
    factory.register::<Employee>();
    assert!(matches!(
        factory.attributes("Employee"),
        Err(ScimError::SchemaCycle { ref type_name }) if type_name == "Employee"
    ));
}
