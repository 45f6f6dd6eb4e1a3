use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub enrollment_no: String,
    pub department: Option<String>,
    pub semester: Option<i64>,
    pub phone: Option<String>,
    pub student_details_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetails {
    pub id: String,
    pub guardian_name: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A student together with its one-to-one details row.
#[derive(Debug, Clone, Serialize)]
pub struct StudentProfile {
    #[serde(flatten)]
    pub student: Student,
    pub details: Option<StudentDetails>,
}

impl Student {
    pub fn profile_fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Editable student fields. `email` and `enrollmentNo` are rejected before
/// this type is ever deserialized.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub department: Option<String>,
    pub semester: Option<i64>,
    pub phone: Option<String>,
    pub details: Option<UpdateStudentDetailsRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateStudentDetailsRequest {
    pub guardian_name: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
}
