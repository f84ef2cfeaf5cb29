//! User and profile models

use chrono::{DateTime, Utc};
use common::validation::{RegistrationForm, validate_registration};
use serde::{Deserialize, Serialize};

/// Profile of the logged-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(
        default,
        deserialize_with = "common::timestamp::deserialize_optional"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl ProfileData {
    /// First and last name joined for display
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Profile update payload; unset fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.user_name.is_none()
    }
}

/// New user registration payload
///
/// `user_name` is the user's email address. `confirm_password` never leaves
/// the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
}

impl Registration {
    /// Client-side validation problems as `(field, message)`, in form order
    pub fn validate(&self) -> Vec<(&'static str, String)> {
        validate_registration(&RegistrationForm {
            first_name: &self.first_name,
            last_name: &self.last_name,
            email: &self.user_name,
            password: &self.password,
            confirm_password: &self.confirm_password,
        })
    }
}

/// JSON shape of a login response carrying the token
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: Option<String>,
    pub access_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_registration_payload_omits_confirmation() {
        let registration = Registration {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            user_name: "jane@example.com".to_string(),
            password: "Secret1!".to_string(),
            confirm_password: "Secret1!".to_string(),
        };

        let payload = serde_json::to_value(&registration).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({
                "firstName": "Jane",
                "lastName": "Doe",
                "userName": "jane@example.com",
                "password": "Secret1!"
            })
        );
        assert!(registration.validate().is_empty());
    }

    #[test]
    fn test_profile_tolerates_naive_timestamps() {
        let profile: ProfileData = serde_json::from_str(
            r#"{"firstName":"Jane","lastName":"Doe","userName":"jane@example.com","createdAt":"2024-03-01T09:30:00"}"#,
        )
        .unwrap();

        assert_eq!(profile.full_name(), "Jane Doe");
        assert!(profile.created_at.is_some());
    }

    #[test]
    fn test_profile_accepts_numeric_and_array_timestamps() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();

        for created_at in ["1709285400000", "[2024,3,1,9,30,0]"] {
            let profile: ProfileData = serde_json::from_str(&format!(
                r#"{{"firstName":"Jane","lastName":"Doe","userName":"jane@example.com","createdAt":{}}}"#,
                created_at
            ))
            .unwrap();
            assert_eq!(profile.created_at, Some(expected), "{}", created_at);
        }

        let profile: ProfileData = serde_json::from_str(
            r#"{"firstName":"Jane","userName":"jane@example.com","createdAt":{"seconds":1}}"#,
        )
        .unwrap();
        assert_eq!(profile.full_name(), "Jane");
        assert_eq!(profile.created_at, None);
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            last_name: Some("Smith".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({ "lastName": "Smith" })
        );
        assert!(ProfileUpdate::default().is_empty());
    }
}
