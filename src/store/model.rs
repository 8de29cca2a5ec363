//! Entities read from the directory database.
//!
//! Field names follow the stored documents and are reused verbatim for the
//! JSON export. Unknown fields (including `_id`) are ignored; missing required
//! fields fail decoding.

use mongodb::bson::{self, Document};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Result};

/// An organization, looked up by its human-readable path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,

    pub path: String,

    /// Billing reference. Absent on some older records.
    #[serde(rename = "customerId", default)]
    pub customer_id: String,
}

/// One user's membership in one organization, embedded in [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationMembership {
    #[serde(rename = "userId")]
    pub user_id: String,

    #[serde(rename = "orgId")]
    pub org_id: String,

    pub email: String,
}

/// A user and the organizations it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub external_id: String,

    pub organizations: Vec<OrganizationMembership>,
}

impl User {
    /// Whether any membership points at `org_id`
    pub fn is_member_of(&self, org_id: &str) -> bool {
        self.organizations.iter().any(|m| m.org_id == org_id)
    }
}

/// Decode a raw document into an entity, tagging failures with `operation`.
pub fn decode<T: DeserializeOwned>(operation: &'static str, doc: Document) -> Result<T> {
    bson::from_document(doc).map_err(|e| DecodeError::new(operation, e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};

    #[test]
    fn test_decode_organization_ignores_unknown_fields() {
        let org: Organization = decode(
            "resolve_org_id",
            doc! {
                "_id": ObjectId::new(),
                "id": "org_123",
                "path": "acme",
                "customerId": "cus_9",
                "plan": "enterprise",
            },
        )
        .unwrap();

        assert_eq!(org.id, "org_123");
        assert_eq!(org.path, "acme");
        assert_eq!(org.customer_id, "cus_9");
    }

    #[test]
    fn test_customer_id_is_optional() {
        let org: Organization =
            decode("resolve_org_id", doc! { "id": "org_1", "path": "p" }).unwrap();
        assert_eq!(org.customer_id, "");
    }

    #[test]
    fn test_missing_required_field_fails() {
        let err = decode::<Organization>("resolve_org_id", doc! { "path": "acme" }).unwrap_err();
        assert_eq!(err.kind(), "decode");
        assert_eq!(err.operation(), Some("resolve_org_id"));

        let err = decode::<User>(
            "fetch_users",
            doc! {
                "external_id": "ext-1",
                "organizations": [ { "userId": "u1", "orgId": "org_123" } ],
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_wrong_type_fails() {
        let err = decode::<User>(
            "fetch_users",
            doc! { "external_id": 7, "organizations": [] },
        )
        .unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn test_decode_user_with_memberships() {
        let user: User = decode(
            "fetch_users",
            doc! {
                "_id": ObjectId::new(),
                "external_id": "ext-2",
                "organizations": [
                    { "userId": "u2", "orgId": "org_999", "email": "b@y.com" },
                    { "userId": "u2", "orgId": "org_123", "email": "b@x.com", "role": "admin" },
                ],
            },
        )
        .unwrap();

        assert_eq!(user.organizations.len(), 2);
        assert!(user.is_member_of("org_123"));
        assert!(user.is_member_of("org_999"));
        assert!(!user.is_member_of("org_1"));
    }

    #[test]
    fn test_json_field_names() {
        let user = User {
            external_id: "ext-1".into(),
            organizations: vec![OrganizationMembership {
                user_id: "u1".into(),
                org_id: "org_123".into(),
                email: "a@x.com".into(),
            }],
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["external_id"], "ext-1");
        assert_eq!(value["organizations"][0]["userId"], "u1");
        assert_eq!(value["organizations"][0]["orgId"], "org_123");
        assert_eq!(value["organizations"][0]["email"], "a@x.com");
    }
}
