//! User entity and repository
//!
//! Handles account records registered through the public API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;
use uuid::Uuid;

/// User entity from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub country: String,
    pub agreed_to_terms: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// DTO for creating a new user (password already hashed by the caller)
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub country: String,
    pub agreed_to_terms: bool,
}

/// User response DTO (excludes internal fields)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// User unique identifier
    #[schema(value_type = String, example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Given name
    #[schema(example = "Ada")]
    pub first_name: String,
    /// Family name
    #[schema(example = "Lovelace")]
    pub last_name: String,
    /// User email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Country of residence
    #[schema(example = "GB")]
    pub country: String,
    /// Account creation timestamp
    #[schema(value_type = String, example = "2026-01-08T10:00:00Z")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            country: user.country,
            created_at: user.created_at,
        }
    }
}

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, country, agreed_to_terms, created_at, updated_at, deleted_at
            FROM users
            WHERE email = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find user by internal ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, password_hash, country, agreed_to_terms, created_at, updated_at, deleted_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Create a new user. A duplicate email surfaces as a unique-violation
    /// database error for the handler to classify.
    pub async fn create(&self, input: CreateUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash, country, agreed_to_terms)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, first_name, last_name, email, password_hash, country, agreed_to_terms, created_at, updated_at, deleted_at
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.country)
        .bind(input.agreed_to_terms)
        .fetch_one(&self.pool)
        .await
    }

    /// SQL for GDPR-compliant soft delete with PII anonymization (GDPR Article 17)
    const SOFT_DELETE_SQL: &str = r#"
        UPDATE users
        SET
            email = 'deleted-' || id::text,
            first_name = '',
            last_name = '',
            country = '',
            password_hash = '',
            deleted_at = NOW()
        WHERE id = $1 AND deleted_at IS NULL
    "#;

    /// Soft delete user (GDPR compliance - anonymizes PII)
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(Self::SOFT_DELETE_SQL)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            country: "GB".to_string(),
            agreed_to_terms: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_user_response_from_user() {
        let user = sample_user();
        let response = UserResponse::from(user.clone());
        assert_eq!(response.id, user.id);
        assert_eq!(response.email, user.email);
        assert_eq!(response.first_name, user.first_name);
        assert_eq!(response.country, user.country);
    }

    #[test]
    fn test_user_never_serializes_password_hash() {
        let value = serde_json::to_value(sample_user()).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("password_hash"));
        assert!(object.contains_key("email"));
    }

    #[test]
    fn test_soft_delete_sql_anonymizes_pii() {
        // Verify that soft_delete SQL includes GDPR-compliant PII anonymization (Article 17)
        assert!(
            UserRepository::SOFT_DELETE_SQL.contains("email = 'deleted-' || id::text"),
            "soft_delete must anonymize email with 'deleted-{{id}}' pattern"
        );
        assert!(
            UserRepository::SOFT_DELETE_SQL.contains("first_name = ''"),
            "soft_delete must clear first_name field"
        );
        assert!(
            UserRepository::SOFT_DELETE_SQL.contains("password_hash = ''"),
            "soft_delete must discard the stored credential"
        );
        assert!(
            UserRepository::SOFT_DELETE_SQL.contains("deleted_at = NOW()"),
            "soft_delete must set deleted_at timestamp"
        );
    }
}
