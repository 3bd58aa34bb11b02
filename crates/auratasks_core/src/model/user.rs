//! Account model.
//!
//! # Responsibility
//! - Define the stored account record and its public profile projection.
//! - Validate registration input.
//!
//! # Invariants
//! - `email` is the account identity and the owner key for tasks and goals.
//! - Password accounts carry an argon2 PHC hash; Google accounts carry none.

use super::normalize_optional_text;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Registration input as received from the router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub photo_url: Option<String>,
    pub password: Option<String>,
    pub is_google_user: bool,
}

impl Registration {
    /// Trims every field and checks that required ones are present.
    pub fn normalized(self) -> Result<Self, UserValidationError> {
        let email = required(self.email, "email")?;
        let display_name = required(self.display_name, "displayName")?;
        let first_name = required(self.first_name, "firstName")?;
        let last_name = required(self.last_name, "lastName")?;
        Ok(Self {
            email,
            display_name,
            first_name,
            last_name,
            photo_url: normalize_optional_text(self.photo_url),
            password: self.password.filter(|value| !value.is_empty()),
            is_google_user: self.is_google_user,
        })
    }
}

/// Stored account row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub email: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub photo_url: Option<String>,
    pub password_hash: Option<String>,
    pub is_google_user: bool,
    /// Epoch ms.
    pub registration_date: i64,
}

impl UserRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            photo_url: self.photo_url.clone(),
        }
    }
}

/// Public account projection returned to clients. Never includes the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Required field is absent or blank. Carries the wire field name.
    MissingField(&'static str),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field missing: {field}"),
        }
    }
}

impl Error for UserValidationError {}

fn required(value: String, field: &'static str) -> Result<String, UserValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(UserValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{Registration, UserValidationError};

    fn registration() -> Registration {
        Registration {
            email: " ada@example.com ".to_string(),
            display_name: "Ada".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            photo_url: Some(String::new()),
            password: Some("hunter22".to_string()),
            is_google_user: false,
        }
    }

    #[test]
    fn normalized_trims_and_drops_empty_photo() {
        let normalized = registration().normalized().unwrap();
        assert_eq!(normalized.email, "ada@example.com");
        assert_eq!(normalized.photo_url, None);
    }

    #[test]
    fn normalized_reports_first_missing_field() {
        let mut input = registration();
        input.first_name = "  ".to_string();
        let err = input.normalized().unwrap_err();
        assert_eq!(err, UserValidationError::MissingField("firstName"));
    }

    #[test]
    fn profile_serializes_with_wire_field_names() {
        let profile = super::UserProfile {
            email: "ada@example.com".to_string(),
            display_name: "Ada".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            photo_url: None,
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["displayName"], "Ada");
        assert!(json.get("photoURL").is_some());
    }
}
