use crate::error::HubResult;

use chrono::Local;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;

/// Connection bookkeeping in SQLite: one row per currently-connected
/// client. Best effort by contract; the registry logs failures and moves
/// on, so nothing here may ever block or kill a registration.
#[derive(Clone)]
pub struct AuditLog {
    pool: SqlitePool,
}

impl AuditLog {
    pub async fn open(path: impl AsRef<Path>) -> HubResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Self::with_pool(pool).await
    }

    #[cfg(test)]
    pub async fn in_memory() -> HubResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> HubResult<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS connected_users (
                user_id TEXT PRIMARY KEY,
                connected_at TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        Ok(AuditLog { pool })
    }

    pub async fn record_added(&self, id: &str) -> HubResult<()> {
        sqlx::query("REPLACE INTO connected_users (user_id, connected_at) VALUES (?, ?)")
            .bind(id)
            .bind(Local::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn record_removed(&self, id: &str) -> HubResult<()> {
        sqlx::query("DELETE FROM connected_users WHERE user_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn connected_ids(&self) -> HubResult<Vec<String>> {
        let ids = sqlx::query_scalar("SELECT user_id FROM connected_users ORDER BY user_id")
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::registry::Registry;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn add_then_remove_roundtrip() {
        let audit = AuditLog::in_memory().await.unwrap();

        audit.record_added("user_1").await.unwrap();
        audit.record_added("user_2").await.unwrap();
        assert_eq!(audit.connected_ids().await.unwrap(), ["user_1", "user_2"]);

        audit.record_removed("user_1").await.unwrap();
        assert_eq!(audit.connected_ids().await.unwrap(), ["user_2"]);
    }

    #[tokio::test]
    async fn re_adding_an_id_replaces_the_row() {
        let audit = AuditLog::in_memory().await.unwrap();

        audit.record_added("user_1").await.unwrap();
        audit.record_added("user_1").await.unwrap();
        assert_eq!(audit.connected_ids().await.unwrap(), ["user_1"]);
    }

    #[tokio::test]
    async fn removing_an_unknown_id_is_harmless() {
        let audit = AuditLog::in_memory().await.unwrap();
        audit.record_removed("user_404").await.unwrap();
        assert!(audit.connected_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn registry_mirrors_membership_into_the_audit_log() {
        let audit = AuditLog::in_memory().await.unwrap();
        let registry = Registry::with_audit(audit.clone());

        let (sink_a, _rx_a) = mpsc::unbounded_channel();
        let (sink_b, _rx_b) = mpsc::unbounded_channel();
        let id_a = registry.register(sink_a).await;
        let id_b = registry.register(sink_b).await;
        assert_eq!(
            audit.connected_ids().await.unwrap(),
            vec![id_a.clone(), id_b.clone()]
        );

        registry.unregister(&id_a).await;
        assert_eq!(audit.connected_ids().await.unwrap(), vec![id_b]);
    }

    #[tokio::test]
    async fn registration_survives_a_broken_audit_pool() {
        let audit = AuditLog::in_memory().await.unwrap();
        audit.pool.close().await;
        let registry = Registry::with_audit(audit);

        let (sink, _rx) = mpsc::unbounded_channel();
        let id = registry.register(sink).await;

        // Audit failure is logged, never propagated.
        assert_eq!(registry.count(), 1);
        registry.unregister(&id).await;
        assert_eq!(registry.count(), 0);
    }
}
