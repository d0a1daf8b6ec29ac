//! 后台用户

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EntityKind, Resource, SortKey, SortValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CreateUserRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
}

static USER_SORT_KEYS: &[SortKey<User>] = &[
    SortKey {
        name: "name",
        accessor: |u| Some(SortValue::Text(&u.name)),
    },
    SortKey {
        name: "email",
        accessor: |u| Some(SortValue::Text(&u.email)),
    },
    SortKey {
        name: "createdAt",
        accessor: |u| Some(SortValue::Timestamp(u.created_at)),
    },
    SortKey {
        name: "updatedAt",
        accessor: |u| Some(SortValue::Timestamp(u.updated_at)),
    },
    SortKey {
        name: "lastLoginAt",
        accessor: |u| u.last_login_at.map(SortValue::Timestamp),
    },
];

impl Resource for User {
    type Create = CreateUserRequest;
    type Update = UpdateUserRequest;

    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_keys() -> &'static [SortKey<Self>] {
        USER_SORT_KEYS
    }

    fn search_fields(&self) -> Vec<Option<&str>> {
        vec![Some(&self.name), Some(&self.email)]
    }
}
