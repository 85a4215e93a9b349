//! User mirror and customer entities.
//!
//! Identities are issued elsewhere; the engine keeps a local mirror of the
//! fields it needs (display name for notifications, role for capabilities).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_INSTRUCTOR, ROLE_STUDENT};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Instructor,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Students and instructors buy courses, so both get a customer record.
    pub fn has_customer(&self) -> bool {
        matches!(self, UserRole::Student | UserRole::Instructor)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => ROLE_STUDENT,
            UserRole::Instructor => ROLE_INSTRUCTOR,
            UserRole::Admin => ROLE_ADMIN,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            ROLE_INSTRUCTOR => UserRole::Instructor,
            _ => UserRole::Student,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local mirror of an externally issued identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Authenticated caller, as asserted by the identity provider's token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl Actor {
    pub fn new(id: Uuid, email: impl Into<String>, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            role,
        }
    }
}

/// Buyer identity, 1:1 with a user
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Customer {
    pub id: i32,
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_and_default() {
        assert_eq!(UserRole::from("instructor"), UserRole::Instructor);
        assert_eq!(UserRole::from("admin").to_string(), "admin");
        assert_eq!(UserRole::from("anything-else"), UserRole::Student);
    }

    #[test]
    fn test_only_buyers_get_customers() {
        assert!(UserRole::Student.has_customer());
        assert!(UserRole::Instructor.has_customer());
        assert!(!UserRole::Admin.has_customer());
    }
}
