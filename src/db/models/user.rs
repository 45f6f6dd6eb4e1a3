use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub profile_id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Staff,
    Faculty,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
            Role::Faculty => "FACULTY",
            Role::Student => "STUDENT",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "ADMIN" => Some(Role::Admin),
            "STAFF" => Some(Role::Staff),
            "FACULTY" => Some(Role::Faculty),
            "STUDENT" => Some(Role::Student),
            _ => None,
        }
    }

    /// Audiences an announcement may be addressed to.
    pub fn is_announcement_target(&self) -> bool {
        matches!(self, Role::Staff | Role::Faculty | Role::Student)
    }
}

impl User {
    pub fn new(profile_id: String, name: String, email: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            profile_id,
            name,
            email,
            password: password_hash,
            role: role.as_str().to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
