//! Portal user accounts
//!
//! Login accounts live in the `portal_users` table next to the roster data.

use crate::db::queries::{CREATE_PORTAL_USERS, FIND_USER_BY_EMAIL, INSERT_USER};
use crate::error::AppError;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tracing::info;

/// Stored portal account
#[derive(Debug, Clone)]
pub struct PortalUser {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
}

impl TryFrom<&Row> for PortalUser {
    type Error = AppError;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
        })
    }
}

/// Lowercased, trimmed form used for lookups and storage
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Database-backed account store
pub struct UserStore {
    pool: Pool,
}

impl UserStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create the accounts table when missing
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        let client = self.pool.get().await?;
        client.batch_execute(CREATE_PORTAL_USERS).await?;
        info!("Portal user table ready");
        Ok(())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<PortalUser>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(FIND_USER_BY_EMAIL, &[&normalize_email(email)])
            .await?;

        row.as_ref().map(PortalUser::try_from).transpose()
    }

    /// Insert a new account; `None` if the email is already registered
    pub async fn create(&self, email: &str, password_hash: &str) -> Result<Option<PortalUser>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(INSERT_USER, &[&normalize_email(email), &password_hash])
            .await?;

        row.as_ref().map(PortalUser::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Teacher@School.ORG "), "teacher@school.org");
    }
}
