//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::AdminUserId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{admin_user::AdminUser, login_attempt::LoginAttempt};
use crate::domain::repository::{AdminUserRepository, LoginAttemptSink};
use crate::domain::value_object::login_id::LoginId;
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed credential store and audit log
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace an admin account. Used for seeding.
    pub async fn upsert_admin(&self, user: &AdminUser) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_users (id, user_id, password_hash, full_name, is_active)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET password_hash = EXCLUDED.password_hash,
                full_name = EXCLUDED.full_name,
                is_active = EXCLUDED.is_active,
                updated_at = NOW()
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.login_id.as_str())
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Admin User Repository Implementation
// ============================================================================

impl AdminUserRepository for PgAuthRepository {
    async fn find_by_login_id(&self, login_id: &LoginId) -> AuthResult<Option<AdminUser>> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r#"
            SELECT
                id,
                user_id,
                password_hash,
                full_name,
                is_active,
                failed_attempts,
                locked_until,
                last_login
            FROM admin_users
            WHERE user_id = $1
            "#,
        )
        .bind(login_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_admin_user()).transpose()
    }

    async fn increment_failed_attempts(
        &self,
        id: &AdminUserId,
        new_count: u32,
        locked_until: Option<DateTime<Utc>>,
    ) -> AuthResult<()> {
        let new_count = i32::try_from(new_count)
            .map_err(|_| AuthError::Internal("failed_attempts overflow".to_string()))?;

        sqlx::query(
            r#"
            UPDATE admin_users
            SET failed_attempts = $2,
                locked_until = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(new_count)
        .bind(locked_until)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn reset_failure_state(&self, id: &AdminUserId) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE admin_users
            SET failed_attempts = 0,
                locked_until = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn touch_last_login(&self, id: &AdminUserId, at: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query("UPDATE admin_users SET last_login = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Login Attempt Sink Implementation
// ============================================================================

impl LoginAttemptSink for PgAuthRepository {
    async fn append(&self, attempt: &LoginAttempt) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO login_attempts (user_id, ip_address, success, error_message, attempted_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&attempt.login_id)
        .bind(&attempt.source_address)
        .bind(attempt.success)
        .bind(attempt.failure_reason.as_deref())
        .bind(attempt.attempted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AdminUserRow {
    id: Uuid,
    user_id: String,
    password_hash: String,
    full_name: String,
    is_active: bool,
    failed_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    last_login: Option<DateTime<Utc>>,
}

impl AdminUserRow {
    fn into_admin_user(self) -> AuthResult<AdminUser> {
        let failed_attempts = u32::try_from(self.failed_attempts)
            .map_err(|_| AuthError::Internal(format!("Invalid failed_attempts: {}", self.failed_attempts)))?;

        Ok(AdminUser {
            id: AdminUserId::from_uuid(self.id),
            login_id: LoginId::from_db(self.user_id),
            password_hash: self.password_hash,
            display_name: self.full_name,
            is_active: self.is_active,
            failed_attempts,
            locked_until: self.locked_until,
            last_login_at: self.last_login,
        })
    }
}
