//! Unit-of-measure domain model.
//!
//! Units are a shared catalog (kilometers, pages, sessions...), not scoped
//! to a tenant. Statistics over units are always caller-scoped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of measure that progress and statistics are expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier
    pub id: Uuid,
    /// Singular display name ("kilometer")
    pub name: String,
    /// Plural display name ("kilometers")
    pub plural_name: Option<String>,
    /// Verb form used when a goal completes ("ran")
    pub completed_word: Option<String>,
    /// When this unit was created
    pub created_at: DateTime<Utc>,
    /// When this unit was last updated
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUnit {
    pub name: String,
    pub plural_name: Option<String>,
    pub completed_word: Option<String>,
}

impl NewUnit {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Unit name cannot be empty".to_string());
        }
        if self.name.len() > 100 {
            return Err("Unit name cannot exceed 100 characters".to_string());
        }
        Ok(())
    }

    pub fn into_unit(self, now: DateTime<Utc>) -> Unit {
        Unit {
            id: Uuid::new_v4(),
            name: self.name,
            plural_name: self.plural_name,
            completed_word: self.completed_word,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Editable fields of an existing unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitUpdate {
    pub name: Option<String>,
    pub plural_name: Option<String>,
    pub completed_word: Option<String>,
}

impl UnitUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("Unit name cannot be empty".to_string());
            }
            if name.len() > 100 {
                return Err("Unit name cannot exceed 100 characters".to_string());
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.plural_name.is_none() && self.completed_word.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_unit_validation() {
        let unit = NewUnit {
            name: "kilometer".to_string(),
            plural_name: Some("kilometers".to_string()),
            completed_word: Some("ran".to_string()),
        };
        assert!(unit.validate().is_ok());

        let unit = NewUnit { name: "  ".to_string(), plural_name: None, completed_word: None };
        assert!(unit.validate().is_err());
    }

    #[test]
    fn test_into_unit_assigns_identity() {
        let now = Utc::now();
        let unit = NewUnit { name: "page".to_string(), plural_name: None, completed_word: None }
            .into_unit(now);
        assert_eq!(unit.name, "page");
        assert_eq!(unit.created_at, now);
        assert_eq!(unit.updated_at, now);
    }
}
