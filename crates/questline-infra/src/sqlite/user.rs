//! SQLite user repository implementation.

use sqlx::Row;

use questline_core::repository::user::UserRepository;
use questline_types::error::RepositoryError;
use questline_types::user::{Role, User};

use super::map_sqlx_err;
use super::pool::DatabasePool;

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO users (username, chat_id, role) VALUES (?, ?, ?) \
             ON CONFLICT(username) DO UPDATE SET chat_id = excluded.chat_id, role = excluded.role",
        )
        .bind(user.username())
        .bind(user.chat_id())
        .bind(user.role().to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn get(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT chat_id, username, role FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_err)?;

        match row {
            None => Ok(None),
            Some(row) => {
                let chat_id: i64 = row.try_get("chat_id").map_err(map_sqlx_err)?;
                let username: String = row.try_get("username").map_err(map_sqlx_err)?;
                let role: String = row.try_get("role").map_err(map_sqlx_err)?;

                let role = role.parse::<Role>().map_err(RepositoryError::Query)?;
                Ok(Some(
                    User::new(chat_id, username, role)
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_user_upsert_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        let repo = SqliteUserRepository::new(pool);

        let user = User::new(7, "rocket_admin", Role::Administrator).unwrap();
        repo.upsert(&user).await.unwrap();
        assert_eq!(repo.get("rocket_admin").await.unwrap(), Some(user));

        // Upsert replaces the role in place.
        let demoted = User::new(7, "rocket_admin", Role::Participant).unwrap();
        repo.upsert(&demoted).await.unwrap();
        assert_eq!(repo.get("rocket_admin").await.unwrap(), Some(demoted));

        assert!(repo.get("nobody").await.unwrap().is_none());
    }
}
