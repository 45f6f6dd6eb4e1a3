use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;

use super::user::Role;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub message: String,
    /// Profile id of the creator.
    pub issuer: String,
    pub role: String,
    /// Profile field name → accepted values.
    pub filter: Option<Json<Value>>,
    pub is_global: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    pub filter: Option<Value>,
    pub role: Option<String>,
    #[serde(default)]
    pub is_global: bool,
}

/// `id` plus any subset of the editable fields. `"filter": null` clears the
/// filter, an absent `filter` leaves it untouched.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnnouncementRequest {
    pub id: Option<Value>,
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub filter: Option<Option<Value>>,
    pub role: Option<String>,
    pub is_global: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AnnouncementIdRequest {
    pub id: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Value>::deserialize(deserializer).map(Some)
}

/// Request ids arrive either as strings or as bare numbers.
pub fn id_from_value(id: Option<&Value>) -> Option<String> {
    match id? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// True when any `(key, values)` entry lists the profile's `key` value.
/// Non-array values and fields missing from the profile never match.
pub fn matches_profile(filter: &Map<String, Value>, profile: &Map<String, Value>) -> bool {
    filter.iter().any(|(key, values)| match (values, profile.get(key)) {
        (Value::Array(accepted), Some(actual)) => accepted.contains(actual),
        _ => false,
    })
}

impl Announcement {
    /// The filter map when it has at least one entry. Null, empty and
    /// non-object filters all count as "no filter".
    pub fn filter_entries(&self) -> Option<&Map<String, Value>> {
        match self.filter.as_ref().map(|f| &f.0) {
            Some(Value::Object(map)) if !map.is_empty() => Some(map),
            _ => None,
        }
    }

    /// Whether a staff member sees this announcement in their feed.
    pub fn is_visible_to(&self, viewer_id: &str, profile: &Map<String, Value>) -> bool {
        if self.is_global {
            return true;
        }

        let addressed = self.role == Role::Staff.as_str() || self.issuer == viewer_id;

        match self.filter_entries() {
            None => addressed,
            Some(filter) => addressed && matches_profile(filter, profile),
        }
    }

    /// Whether a user with `role` and `profile` should be notified about this
    /// announcement when it is created.
    pub fn targets(&self, role: &str, profile: Option<&Map<String, Value>>) -> bool {
        if self.is_global {
            return true;
        }
        if self.role != role {
            return false;
        }
        match (self.filter_entries(), profile) {
            (None, _) => true,
            (Some(filter), Some(profile)) => matches_profile(filter, profile),
            (Some(_), None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn announcement(role: &str, issuer: &str, filter: Option<Value>, is_global: bool) -> Announcement {
        Announcement {
            id: "a1".to_string(),
            title: "Exam schedule".to_string(),
            message: "Mid-terms start Monday".to_string(),
            issuer: issuer.to_string(),
            role: role.to_string(),
            filter: filter.map(Json),
            is_global,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn profile(department: &str) -> Map<String, Value> {
        match json!({"id": "staff-2", "department": department, "designation": "Clerk"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_global_visible_to_everyone() {
        let a = announcement("STUDENT", "other", Some(json!({"department": ["EEE"]})), true);
        assert!(a.is_visible_to("staff-2", &profile("CSE")));
    }

    #[test]
    fn test_empty_filter_visible_to_staff_role() {
        let a = announcement("STAFF", "other", None, false);
        assert!(a.is_visible_to("staff-2", &profile("CSE")));

        let empty = announcement("STAFF", "other", Some(json!({})), false);
        assert!(empty.is_visible_to("staff-2", &profile("CSE")));
    }

    #[test]
    fn test_empty_filter_other_role_only_for_issuer() {
        let a = announcement("STUDENT", "staff-1", None, false);
        assert!(!a.is_visible_to("staff-2", &profile("CSE")));
        assert!(a.is_visible_to("staff-1", &profile("CSE")));
    }

    #[test]
    fn test_filter_requires_matching_profile_field() {
        let a = announcement("STAFF", "other", Some(json!({"department": ["CSE", "ECE"]})), false);
        assert!(a.is_visible_to("staff-2", &profile("ECE")));
        assert!(!a.is_visible_to("staff-2", &profile("MECH")));
    }

    #[test]
    fn test_filter_match_still_needs_staff_role_or_issuer() {
        let a = announcement("STUDENT", "staff-1", Some(json!({"department": ["CSE"]})), false);
        assert!(!a.is_visible_to("staff-2", &profile("CSE")));
        assert!(a.is_visible_to("staff-1", &profile("CSE")));
    }

    #[test]
    fn test_any_filter_entry_is_enough() {
        let a = announcement(
            "STAFF",
            "other",
            Some(json!({"department": ["EEE"], "designation": ["Clerk"]})),
            false,
        );
        assert!(a.is_visible_to("staff-2", &profile("CSE")));
    }

    #[test]
    fn test_non_array_values_and_missing_fields_never_match() {
        let scalar = announcement("STAFF", "other", Some(json!({"department": "CSE"})), false);
        assert!(!scalar.is_visible_to("staff-2", &profile("CSE")));

        let missing = announcement("STAFF", "other", Some(json!({"hostel": ["A"]})), false);
        assert!(!missing.is_visible_to("staff-2", &profile("CSE")));
    }

    #[test]
    fn test_targets_respects_role_and_filter() {
        let a = announcement("STUDENT", "staff-1", Some(json!({"semester": [3, 5]})), false);
        let student = match json!({"semester": 5}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert!(a.targets("STUDENT", Some(&student)));
        assert!(!a.targets("FACULTY", Some(&student)));
        assert!(!a.targets("STUDENT", None));
    }

    #[test]
    fn test_id_from_value_accepts_strings_and_numbers() {
        assert_eq!(id_from_value(Some(&json!("abc"))), Some("abc".to_string()));
        assert_eq!(id_from_value(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(id_from_value(Some(&json!(""))), None);
        assert_eq!(id_from_value(Some(&json!(null))), None);
        assert_eq!(id_from_value(None), None);
    }

    #[test]
    fn test_update_request_distinguishes_null_filter() {
        let cleared: UpdateAnnouncementRequest =
            serde_json::from_value(json!({"id": "a1", "filter": null})).expect("valid");
        assert!(matches!(cleared.filter, Some(None)));

        let untouched: UpdateAnnouncementRequest =
            serde_json::from_value(json!({"id": "a1"})).expect("valid");
        assert!(untouched.filter.is_none());
    }
}
