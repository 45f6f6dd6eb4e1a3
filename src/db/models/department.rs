use serde::{Deserialize, Serialize};

/// A department; `department` is its unique display name and doubles as the
/// path key of the admin endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub department: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct DepartmentRequest {
    pub department: Option<String>,
}

impl DepartmentRequest {
    /// Trimmed name, `None` when missing or blank.
    pub fn name(&self) -> Option<String> {
        self.department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }
}
