//! Item record and validated write input

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ValidationError;

/// Maximum length for item names (matches `VARCHAR(255)`)
pub const MAX_NAME_LEN: usize = 255;

/// Item record from the `items` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub value: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Item identifier parsed from a path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(i32);

impl ItemId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

/// Returned when a path segment is not an integer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidId(pub String);

impl FromStr for ItemId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i32>()
            .map(Self)
            .map_err(|_| InvalidId(s.to_owned()))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated item name: present, not blank, fits the column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemName(String);

impl ItemName {
    /// Create a new item name.
    ///
    /// # Example
    /// ```
    /// use itemctl_server::models::ItemName;
    ///
    /// assert!(ItemName::new("widget").is_ok());
    /// assert!(ItemName::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Missing { field: "name" });
        }

        if s.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "name",
                max: MAX_NAME_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for ItemName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Request body for create and update.
///
/// `name` stays optional here so a missing field surfaces as a validation
/// error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPayload {
    pub name: Option<String>,
    pub value: Option<String>,
}

/// Validated input for insert and full replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: ItemName,
    pub value: Option<String>,
}

impl TryFrom<ItemPayload> for NewItem {
    type Error = ValidationError;

    fn try_from(payload: ItemPayload) -> Result<Self, Self::Error> {
        let name = ItemName::new(payload.name.as_deref().unwrap_or_default())?;
        Ok(Self {
            name,
            value: payload.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numeric_ids() {
        assert_eq!("42".parse::<ItemId>(), Ok(ItemId::new(42)));
        assert_eq!("-1".parse::<ItemId>(), Ok(ItemId::new(-1)));
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert!("abc".parse::<ItemId>().is_err());
        assert!("1.5".parse::<ItemId>().is_err());
        assert!("".parse::<ItemId>().is_err());
        assert!("99999999999".parse::<ItemId>().is_err());
    }

    #[test]
    fn rejects_blank_names() {
        assert_eq!(
            ItemName::new(""),
            Err(ValidationError::Missing { field: "name" })
        );
        assert_eq!(
            ItemName::new(" \t"),
            Err(ValidationError::Missing { field: "name" })
        );
    }

    #[test]
    fn name_max_length() {
        assert!(ItemName::new(&"a".repeat(255)).is_ok());
        let err = ItemName::new(&"a".repeat(256)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 255, .. }));
    }

    #[test]
    fn payload_without_name_is_missing() {
        let payload = ItemPayload {
            name: None,
            value: Some("bar".into()),
        };
        let err = NewItem::try_from(payload).unwrap_err();
        assert_eq!(err, ValidationError::Missing { field: "name" });
    }

    #[test]
    fn payload_keeps_value() {
        let payload: ItemPayload =
            serde_json::from_str(r#"{"name": "foo", "value": "bar"}"#).unwrap();
        let item = NewItem::try_from(payload).unwrap();
        assert_eq!(item.name.as_str(), "foo");
        assert_eq!(item.value.as_deref(), Some("bar"));
    }
}
