//! User Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{User, UserCreate};
use crate::utils::time::now_millis;
use shared::Role;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing = parse_record_id(id)?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_lowercase()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user account (password is hashed here)
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        let email = data.email.to_lowercase();
        if self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "User with email '{}' already exists",
                email
            )));
        }

        let hash_pass = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Password hashing failed: {e}")))?;

        // hash_pass 带 skip_serializing，不能走 content()，显式 SET 写入
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    name = $name,
                    email = $email,
                    hash_pass = $hash_pass,
                    role = $role,
                    is_active = true,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("email", email))
            .bind(("hash_pass", hash_pass))
            .bind(("role", data.role.as_str()))
            .bind(("now", now))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Seed a default admin account on first boot
    ///
    /// No-op if any admin already exists.
    pub async fn ensure_default_admin(&self, email: &str, password: &str) -> RepoResult<()> {
        let mut result = self
            .base
            .db()
            .query("SELECT count() FROM user WHERE role = 'admin' GROUP ALL")
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;

        if count.unwrap_or(0) > 0 {
            return Ok(());
        }

        self.create(UserCreate {
            name: "Administrator".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: Role::Admin,
        })
        .await?;

        tracing::warn!(
            email = %email,
            "Seeded default admin account — change the password before going live"
        );
        Ok(())
    }
}
