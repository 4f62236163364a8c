//! RFC 7643 example resources shared by the integration tests.
//!
//! Every function returns a fresh `Value`, so tests mutate their own copy.
//! The resources are assembled from small parts to keep the multi-valued
//! attributes easy to vary in individual tests.

/// Resources from RFC 7643 Section 8.
pub mod rfc_examples {
    use crate::common::{CORE_USER, ENTERPRISE_USER};
    use serde_json::{Value, json};

    const BASE_URL: &str = "https://example.com/v2";
    const USER_ID: &str = "2819c223-7f76-453a-919d-413861904646";
    const GROUP_ID: &str = "e9e30dba-f08f-4109-8486-d5c6a331660a";
    const CORE_GROUP: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";

    /// Leading bytes of the RFC's example certificate, still a DER SEQUENCE.
    const CERTIFICATE: &str = "MIIDQzCCAqygAwIBAgICEAAwDQYJKoZIhvcNAQEFBQAwTjELMAkGA1UEBhMCVVMx";

    fn meta(resource_type: &str, endpoint: &str, id: &str, version: &str) -> Value {
        json!({
            "resourceType": resource_type,
            "created": "2010-01-23T04:56:22Z",
            "lastModified": "2011-05-13T04:42:34Z",
            "version": format!("W/\"{version}\""),
            "location": format!("{BASE_URL}/{endpoint}/{id}")
        })
    }

    fn typed(value: &str, kind: &str) -> Value {
        json!({"value": value, "type": kind})
    }

    fn member(endpoint: &str, id: &str, display: &str) -> Value {
        json!({
            "value": id,
            "$ref": format!("{BASE_URL}/{endpoint}/{id}"),
            "display": display
        })
    }

    fn address(kind: &str, street: &str) -> Value {
        json!({
            "type": kind,
            "streetAddress": street,
            "locality": "Hollywood",
            "region": "CA",
            "postalCode": "91608",
            "country": "USA",
            "formatted": format!("{street}\nHollywood, CA 91608 USA")
        })
    }

    /// Section 8.1, the minimal user.
    pub fn user_minimal() -> Value {
        json!({
            "schemas": [CORE_USER],
            "id": USER_ID,
            "userName": "bjensen@example.com",
            "meta": meta("User", "Users", USER_ID, "3694e05e9dff590")
        })
    }

    /// Section 8.2, the full user.
    pub fn user_full() -> Value {
        let mut work_email = typed("bjensen@example.com", "work");
        work_email["primary"] = json!(true);
        let mut work_address = address("work", "100 Universal City Plaza");
        work_address["primary"] = json!(true);

        let mut user = user_minimal();
        let extra = json!({
            "externalId": "701984",
            "name": {
                "formatted": "Ms. Barbara J Jensen, III",
                "familyName": "Jensen",
                "givenName": "Barbara",
                "middleName": "Jane",
                "honorificPrefix": "Ms.",
                "honorificSuffix": "III"
            },
            "displayName": "Babs Jensen",
            "nickName": "Babs",
            "profileUrl": "https://login.example.com/bjensen",
            "emails": [work_email, typed("babs@jensen.org", "home")],
            "addresses": [work_address, address("home", "456 Hollywood Blvd")],
            "phoneNumbers": [typed("555-555-5555", "work"), typed("555-555-4444", "mobile")],
            "ims": [typed("someaimhandle", "aim")],
            "photos": [
                typed("https://photos.example.com/profilephoto/72930000000Ccne/F", "photo"),
                typed("https://photos.example.com/profilephoto/72930000000Ccne/T", "thumbnail")
            ],
            "userType": "Employee",
            "title": "Tour Guide",
            "preferredLanguage": "en-US",
            "locale": "en-US",
            "timezone": "America/Los_Angeles",
            "active": true,
            "password": "t1meMa$heen",
            "groups": [
                member("Groups", GROUP_ID, "Tour Guides"),
                member("Groups", "fc348aa8-3835-40eb-a20b-c726e15c55b5", "Employees"),
                member("Groups", "71ddacd2-a8e7-49b8-a5db-ae50d0a5bfd7", "US Employees")
            ],
            "x509Certificates": [{"value": CERTIFICATE}]
        });
        if let (Some(user), Value::Object(extra)) = (user.as_object_mut(), extra) {
            // keep meta last, as the RFC lists it
            let meta = user.shift_remove("meta");
            user.extend(extra);
            user.extend(meta.map(|meta| ("meta".to_owned(), meta)));
        }
        user["meta"]["version"] = json!("W/\"a330bc54f0671c9\"");
        user
    }

    /// Section 8.3, the full user with the enterprise extension.
    pub fn user_enterprise() -> Value {
        let mut user = user_full();
        user["schemas"] = json!([CORE_USER, ENTERPRISE_USER]);
        user[ENTERPRISE_USER] = json!({
            "employeeNumber": "701984",
            "costCenter": "4130",
            "organization": "Universal Studios",
            "division": "Theme Park",
            "department": "Tour Operations",
            "manager": {
                "value": "26118915-6090-4610-87e4-49d8ca9f808d",
                "$ref": "../Users/26118915-6090-4610-87e4-49d8ca9f808d",
                "displayName": "John Smith"
            }
        });
        user
    }

    /// Section 8.4, a group with two members.
    pub fn group_basic() -> Value {
        json!({
            "schemas": [CORE_GROUP],
            "id": GROUP_ID,
            "displayName": "Tour Guides",
            "members": [
                member("Users", USER_ID, "Babs Jensen"),
                member("Users", "902c246b-6245-4190-8e05-00816be7344a", "Mandy Pepperidge")
            ],
            "meta": meta("Group", "Groups", GROUP_ID, "3694e05e9dff592")
        })
    }
}
