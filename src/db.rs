use anyhow::Result;
use sqlx::SqlitePool;

/// Run database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            subject TEXT NOT NULL,
            message TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactMessage, User};
    use chrono::Utc;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = test_pool().await;
        run_migrations(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_username_unique_constraint() {
        let pool = test_pool().await;
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind("alice")
            .bind("alice@example.com")
            .bind("hash")
            .bind(&now)
            .execute(&pool)
            .await
            .unwrap();

        let dup = sqlx::query("INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind("alice")
            .bind("alice2@example.com")
            .bind("hash")
            .bind(&now)
            .execute(&pool)
            .await;
        assert!(dup.is_err());

        // First row survives the failed duplicate insert
        let user: User = sqlx::query_as("SELECT * FROM users WHERE username = ?")
            .bind("alice")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_contact_defaults_to_unread() {
        let pool = test_pool().await;
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO contacts (name, email, subject, message, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind("Bob")
            .bind("bob@example.com")
            .bind("Hello")
            .bind("A message of sufficient length")
            .bind(&now)
            .execute(&pool)
            .await
            .unwrap();

        let msg: ContactMessage = sqlx::query_as("SELECT * FROM contacts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(!msg.is_read);
        assert_eq!(msg.name, "Bob");
    }
}
