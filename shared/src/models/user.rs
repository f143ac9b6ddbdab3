//! User accounts, roles, and the people behind them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role tag carried by a logged-in user.
///
/// `produtor` and `agricultor` are synonyms in the stored data; parsing is
/// total and unknown tags yield `None`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[serde(rename = "produtor", alias = "agricultor")]
    Farmer,
    #[serde(rename = "tecnico")]
    Technician,
    #[serde(rename = "operador")]
    Operator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Farmer => "produtor",
            Role::Technician => "tecnico",
            Role::Operator => "operador",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "admin" | "gestor" => Some(Role::Admin),
            "produtor" | "agricultor" => Some(Role::Farmer),
            "tecnico" => Some(Role::Technician),
            "operador" => Some(Role::Operator),
            _ => None,
        }
    }

    /// Municipal staff roles (everyone who is not a farmer)
    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Farmer)
    }

    /// Field personnel with a personal schedule instead of management screens
    pub fn is_field_staff(&self) -> bool {
        matches!(self, Role::Technician | Role::Operator)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A farmer profile, linked to a user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Farmer {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    /// CPF document number, digits only
    pub document: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A municipal staff member (technician or operator)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub occupation: Role,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_synonyms() {
        assert_eq!(Role::parse("agricultor"), Some(Role::Farmer));
        assert_eq!(Role::parse("produtor"), Some(Role::Farmer));
        assert_eq!(Role::parse("gestor"), Some(Role::Admin));
        assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
    }

    #[test]
    fn test_role_unknown() {
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn test_staff_partition() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Technician.is_field_staff());
        assert!(!Role::Admin.is_field_staff());
        assert!(!Role::Farmer.is_staff());
    }
}
