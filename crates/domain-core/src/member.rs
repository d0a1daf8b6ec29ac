//! 会员

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EntityKind, Resource, SortKey, SortValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CreateMemberRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateMemberRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    pub name: String,
}

static MEMBER_SORT_KEYS: &[SortKey<Member>] = &[
    SortKey {
        name: "name",
        accessor: |m| Some(SortValue::Text(&m.name)),
    },
    SortKey {
        name: "email",
        accessor: |m| Some(SortValue::Text(&m.email)),
    },
    SortKey {
        name: "createdAt",
        accessor: |m| Some(SortValue::Timestamp(m.created_at)),
    },
    SortKey {
        name: "updatedAt",
        accessor: |m| Some(SortValue::Timestamp(m.updated_at)),
    },
    SortKey {
        name: "lastLoginAt",
        accessor: |m| m.last_login_at.map(SortValue::Timestamp),
    },
];

impl Resource for Member {
    type Create = CreateMemberRequest;
    type Update = UpdateMemberRequest;

    const KIND: EntityKind = EntityKind::Member;

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_keys() -> &'static [SortKey<Self>] {
        MEMBER_SORT_KEYS
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![Some(&self.name), Some(&self.email)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn member() -> Member {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        Member {
            id: "usr_abc".to_string(),
            name: "Budi Santoso".to_string(),
            email: "budi@tmii.id".to_string(),
            created_at: at,
            updated_at: at,
            last_login_at: None,
        }
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_value(member()).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("lastLoginAt").unwrap().is_null());
    }

    #[test]
    fn test_search_matches_name_or_email() {
        let m = member();
        assert!(m.matches_search("SANTOSO"));
        assert!(m.matches_search("tmii.id"));
        assert!(!m.matches_search("transaction"));
        assert!(m.matches_search(""));
    }

    #[test]
    fn test_last_login_is_nullable_sort_key() {
        let key = Member::sort_key("lastLoginAt").unwrap();
        assert!(key.value(&member()).is_none());
        assert!(Member::sort_key("password").is_none());
    }

    #[test]
    fn test_create_request_debug_redacts_password() {
        let req = CreateMemberRequest {
            name: "a".into(),
            email: "a@b.c".into(),
            username: "a".into(),
            password: "hunter2".into(),
        };
        let out = format!("{:?}", req);
        assert!(!out.contains("hunter2"));
        assert!(out.contains("[REDACTED]"));
    }
}
