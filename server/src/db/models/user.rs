//! User Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::client::UserInfo;
use shared::{Role, Timestamp};
use surrealdb::RecordId;

/// User ID type
pub type UserId = RecordId;

/// User account (customer, staff or admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hash_pass: String,
    #[serde(default)]
    pub role: Role,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Timestamp,
}

fn default_true() -> bool {
    true
}

/// Create user payload (repository-level; API validation happens upstream)
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl User {
    /// Verify password using argon2
    pub fn verify_password(&self, password: &str) -> Result<bool, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHash, PasswordVerifier},
        };

        let parsed_hash = PasswordHash::new(&self.hash_pass)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash password using argon2
    pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
        use argon2::{
            Argon2,
            password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(password_hash.to_string())
    }

    /// Public view of this account
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let hash = User::hash_password("secret123").unwrap();
        let user = User {
            id: None,
            name: "Jane".into(),
            email: "jane@example.com".into(),
            hash_pass: hash,
            role: Role::Customer,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        };

        assert!(user.verify_password("secret123").unwrap());
        assert!(!user.verify_password("wrong").unwrap());
    }
}
