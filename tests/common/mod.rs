//! Common helpers for the integration tests.

use scim_patch::GenericResource;
use serde_json::{Map, Value};

pub mod fixtures;

pub use fixtures::rfc_examples;

pub const CORE_USER: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const ENTERPRISE_USER: &str = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";

/// Route the crate's log output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrap an object fixture as a resource.
pub fn resource(value: Value) -> GenericResource {
    GenericResource::try_from(value).expect("fixture must be a JSON object")
}

/// The object of an object fixture.
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be a JSON object, got {other}"),
    }
}
