use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// A stored contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Contact {
    /// Generated by storage
    #[schema(read_only)]
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// 1 for favorites, 0 otherwise
    #[schema(minimum = 0, maximum = 1)]
    pub favorite: i16,
    /// URL path of the uploaded avatar, set by the server
    #[schema(read_only)]
    pub avatar: Option<String>,
}

/// Validated fields for a new contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub favorite: i16,
    pub avatar: Option<String>,
}

/// Validated partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub favorite: Option<i16>,
    pub avatar: Option<String>,
}

impl ContactChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.favorite.is_none()
            && self.avatar.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFilter {
    pub favorite: Option<bool>,
    pub name: Option<String>,
}

impl ContactFilter {
    pub fn matches(&self, contact: &Contact) -> bool {
        if let Some(favorite) = self.favorite {
            if contact.favorite != i16::from(favorite) {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if !contact.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Boolean-like value as sent by clients: `true`, `1`, `"true"`, `"0"`...
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FlagValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FlagValue::Bool(b) => Some(*b),
            FlagValue::Int(1) => Some(true),
            FlagValue::Int(0) => Some(false),
            FlagValue::Int(_) => None,
            FlagValue::Text(s) => parse_flag(s),
        }
    }
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Contact fields as submitted in a create or update request.
///
/// `avatar` is deliberately absent: it can only be set through an upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub favorite: Option<FlagValue>,
}

impl ContactInput {
    pub fn into_new_contact(self) -> AppResult<NewContact> {
        let name = non_empty(self.name).ok_or_else(|| AppError::validation("Name is required"))?;
        let favorite = favorite_value(self.favorite)?.unwrap_or(0);

        Ok(NewContact {
            name,
            email: validated_email(self.email)?,
            address: non_empty(self.address),
            phone: non_empty(self.phone),
            favorite,
            avatar: None,
        })
    }

    pub fn into_changes(self) -> AppResult<ContactChanges> {
        let name = match self.name {
            Some(name) => Some(
                non_empty(Some(name)).ok_or_else(|| AppError::validation("Name cannot be empty"))?,
            ),
            None => None,
        };
        let favorite = favorite_value(self.favorite)?;

        Ok(ContactChanges {
            name,
            email: validated_email(self.email)?,
            address: non_empty(self.address),
            phone: non_empty(self.phone),
            favorite,
            avatar: None,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validated_email(email: Option<String>) -> AppResult<Option<String>> {
    match non_empty(email) {
        Some(email) if !EMAIL_RE.is_match(&email) => {
            Err(AppError::validation("Email must be a valid email address"))
        }
        email => Ok(email),
    }
}

/// Blank text counts as absent, like the other optional fields.
fn favorite_value(flag: Option<FlagValue>) -> AppResult<Option<i16>> {
    match flag {
        None => Ok(None),
        Some(FlagValue::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(flag) => flag
            .as_bool()
            .map(|favorite| Some(i16::from(favorite)))
            .ok_or_else(|| AppError::validation("Favorite must be a boolean (true/false or 1/0)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: Option<&str>) -> ContactInput {
        ContactInput {
            name: name.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn create_requires_name() {
        assert!(matches!(
            input(None).into_new_contact(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            input(Some("   ")).into_new_contact(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn create_defaults_favorite_and_trims() {
        let contact = ContactInput {
            name: Some("  Ann Lee ".into()),
            email: Some("ann@example.com".into()),
            address: Some("".into()),
            ..Default::default()
        }
        .into_new_contact()
        .unwrap();

        assert_eq!(contact.name, "Ann Lee");
        assert_eq!(contact.favorite, 0);
        assert_eq!(contact.address, None);
        assert_eq!(contact.avatar, None);
    }

    #[test]
    fn rejects_malformed_email() {
        let result = ContactInput {
            name: Some("Bob".into()),
            email: Some("bob-at-example".into()),
            ..Default::default()
        }
        .into_new_contact();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn favorite_accepts_boolean_like_values() {
        for (flag, expected) in [
            (FlagValue::Bool(true), 1),
            (FlagValue::Int(0), 0),
            (FlagValue::Text("TRUE".into()), 1),
            (FlagValue::Text("0".into()), 0),
        ] {
            let contact = ContactInput {
                name: Some("Cat".into()),
                favorite: Some(flag),
                ..Default::default()
            }
            .into_new_contact()
            .unwrap();
            assert_eq!(contact.favorite, expected);
        }

        let result = ContactInput {
            name: Some("Cat".into()),
            favorite: Some(FlagValue::Int(2)),
            ..Default::default()
        }
        .into_new_contact();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn changes_keep_absent_fields_unset() {
        let changes = ContactInput {
            phone: Some("555-0100".into()),
            ..Default::default()
        }
        .into_changes()
        .unwrap();

        assert_eq!(changes.phone.as_deref(), Some("555-0100"));
        assert!(changes.name.is_none());
        assert!(changes.favorite.is_none());
        assert!(!changes.is_empty());
        assert!(ContactInput::default().into_changes().unwrap().is_empty());
    }

    #[test]
    fn blank_favorite_counts_as_absent() {
        let contact = ContactInput {
            name: Some("Dan".into()),
            favorite: Some(FlagValue::Text("  ".into())),
            ..Default::default()
        }
        .into_new_contact()
        .unwrap();
        assert_eq!(contact.favorite, 0);

        let changes = ContactInput {
            favorite: Some(FlagValue::Text(String::new())),
            ..Default::default()
        }
        .into_changes()
        .unwrap();
        assert!(changes.favorite.is_none());
        assert!(changes.is_empty());
    }

    #[test]
    fn changes_reject_blank_name() {
        assert!(matches!(
            input(Some("")).into_changes(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn filter_matches_name_case_insensitively() {
        let contact = Contact {
            id: 1,
            name: "Joanna".into(),
            email: None,
            address: None,
            phone: None,
            favorite: 1,
            avatar: None,
        };
        let filter = ContactFilter {
            favorite: Some(true),
            name: Some("ANN".into()),
        };
        assert!(filter.matches(&contact));

        let filter = ContactFilter {
            favorite: Some(false),
            name: None,
        };
        assert!(!filter.matches(&contact));
    }
}
