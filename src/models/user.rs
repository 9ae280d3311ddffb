use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::AppError;

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// A user account as stored in the database.
///
/// `password_hash` is set only through `NewUser` creation or `set_password`,
/// and is skipped by serialization so it can never appear in an API response.
#[derive(Debug, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Input for provisioning a new account. There is no registration route;
/// accounts are created out-of-band (ops tooling, test setup).
#[derive(Debug, Validate)]
pub struct NewUser {
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1))]
    pub name: String,
}

impl User {
    /// Inserts a new user, hashing the password exactly once on the way in.
    ///
    /// A duplicate username or email surfaces as `AppError::Conflict` via the
    /// unique-violation mapping on `From<sqlx::Error>`.
    pub async fn create(pool: &PgPool, input: &NewUser) -> Result<User, AppError> {
        input.validate()?;
        let password_hash = hash_password(&input.password)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash, name)
             VALUES ($1, $2, $3, $4)
             RETURNING id, username, email, password_hash, name, created_at",
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Single lookup matching either the username or the email column.
    /// This is the login resolution path.
    pub async fn find_by_username_or_email(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, name, created_at
             FROM users WHERE username = $1 OR email = $1",
        )
        .bind(identifier)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, name, created_at
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces the stored hash with `hash(plaintext)` and persists it.
    ///
    /// This is the only code path that writes `password_hash` after creation.
    /// Making the hash-and-assign explicit here removes any need for a
    /// "did the field change" check on every save.
    pub async fn set_password(&mut self, pool: &PgPool, plaintext: &str) -> Result<(), AppError> {
        let password_hash = hash_password(plaintext)?;

        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(&password_hash)
            .bind(self.id)
            .execute(pool)
            .await?;

        self.password_hash = password_hash;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_new_user_validation() {
        let input = NewUser {
            username: "test_user-123".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            name: "Test User".to_string(),
        };
        assert!(input.validate().is_ok());

        let invalid_username = NewUser {
            username: "test user!".to_string(), // Contains space and exclamation
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            name: "Test User".to_string(),
        };
        assert!(invalid_username.validate().is_err());

        let invalid_email = NewUser {
            username: "testuser".to_string(),
            email: "invalid-email".to_string(),
            password: "password123".to_string(),
            name: "Test User".to_string(),
        };
        assert!(invalid_email.validate().is_err());

        let short_password = NewUser {
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password: "short".to_string(),
            name: "Test User".to_string(),
        };
        assert!(short_password.validate().is_err());

        let empty_name = NewUser {
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            name: "".to_string(),
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$2b$10$abcdefghijklmnopqrstuv".to_string(),
            name: "Alice".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
        assert_eq!(json["name"], "Alice");
    }
}
