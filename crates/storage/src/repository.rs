//! Repository Implementation
//!
//! Every operation opens its own connection and drops it when done, on the
//! error path too. There is no pool.

use crate::StorageError;
use aggregator::DailyAggregate;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS air_quality_daily (
        date TEXT PRIMARY KEY,
        pm2_5_avg REAL,
        pm10_avg REAL,
        nitrogen_dioxide_avg REAL
    )";

const UPSERT: &str = "
    INSERT OR REPLACE INTO air_quality_daily
    (date, pm2_5_avg, pm10_avg, nitrogen_dioxide_avg)
    VALUES (?, ?, ?, ?)";

const SELECT_RECENT: &str = "
    SELECT date, pm2_5_avg, pm10_avg, nitrogen_dioxide_avg
    FROM air_quality_daily
    ORDER BY date DESC
    LIMIT ?";

const SELECT_BY_DATE: &str = "
    SELECT date, pm2_5_avg, pm10_avg, nitrogen_dioxide_avg
    FROM air_quality_daily
    WHERE date = ?";

type AggregateRow = (String, Option<f64>, Option<f64>, Option<f64>);

fn from_row((date, pm2_5_avg, pm10_avg, nitrogen_dioxide_avg): AggregateRow) -> DailyAggregate {
    DailyAggregate {
        date,
        pm2_5_avg,
        pm10_avg,
        nitrogen_dioxide_avg,
    }
}

/// Handle to the on-disk aggregate table
#[derive(Debug, Clone)]
pub struct Repository {
    options: SqliteConnectOptions,
    path: PathBuf,
}

impl Repository {
    /// Open the database at `path`, creating the file and table if absent
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);

        let repository = Self { options, path };
        repository.ensure_schema().await?;

        info!("Opened SQLite repository at {}", repository.path.display());
        Ok(repository)
    }

    /// Database file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn connect(&self) -> Result<SqliteConnection, StorageError> {
        Ok(self.options.connect().await?)
    }

    /// Create the table if it does not exist yet. Safe to call repeatedly.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        let mut conn = self.connect().await?;
        sqlx::query(CREATE_TABLE).execute(&mut conn).await?;
        conn.close().await?;
        Ok(())
    }

    /// Insert or replace every row in one transaction.
    ///
    /// Returns the number of rows submitted.
    pub async fn upsert_many(&self, rows: &[DailyAggregate]) -> Result<usize, StorageError> {
        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;

        for row in rows {
            sqlx::query(UPSERT)
                .bind(&row.date)
                .bind(row.pm2_5_avg)
                .bind(row.pm10_avg)
                .bind(row.nitrogen_dioxide_avg)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        conn.close().await?;

        debug!("Upserted {} daily rows", rows.len());
        Ok(rows.len())
    }

    /// The `limit` most recent dates, oldest first
    pub async fn query_recent_ascending(
        &self,
        limit: usize,
    ) -> Result<Vec<DailyAggregate>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut conn = self.connect().await?;
        let rows: Vec<AggregateRow> = sqlx::query_as(SELECT_RECENT)
            .bind(limit)
            .fetch_all(&mut conn)
            .await?;
        conn.close().await?;

        Ok(rows.into_iter().rev().map(from_row).collect())
    }

    /// Exact-match lookup by date
    pub async fn query_by_date(&self, date: &str) -> Result<DailyAggregate, StorageError> {
        let mut conn = self.connect().await?;
        let row: Option<AggregateRow> = sqlx::query_as(SELECT_BY_DATE)
            .bind(date)
            .fetch_optional(&mut conn)
            .await?;
        conn.close().await?;

        row.map(from_row)
            .ok_or_else(|| StorageError::NotFound(date.to_string()))
    }

    /// Number of stored dates
    pub async fn count(&self) -> Result<usize, StorageError> {
        let mut conn = self.connect().await?;
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM air_quality_daily")
            .fetch_one(&mut conn)
            .await?;
        conn.close().await?;

        Ok(n.max(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aggregator::{aggregate_daily, HourlySeries};
    use tempfile::TempDir;

    async fn temp_repo() -> (TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::open(dir.path().join("air_quality.db")).await.unwrap();
        (dir, repo)
    }

    fn day(date: &str, pm2_5: f64) -> DailyAggregate {
        DailyAggregate {
            date: date.to_string(),
            pm2_5_avg: Some(pm2_5),
            pm10_avg: Some(pm2_5 / 2.0),
            nitrogen_dioxide_avg: None,
        }
    }

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let (dir, repo) = temp_repo().await;
        repo.upsert_many(&[day("2024-01-01", 1.0)]).await.unwrap();

        let reopened = Repository::open(dir.path().join("air_quality.db")).await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
        assert_eq!(reopened.path(), repo.path());
        assert!(repo.path().is_file());
    }

    #[tokio::test]
    async fn test_aggregate_roundtrip() {
        let (_dir, repo) = temp_repo().await;
        let series = HourlySeries {
            time: vec![
                "2024-01-01T00:00".into(),
                "2024-01-01T01:00".into(),
                "2024-01-02T00:00".into(),
            ],
            pm2_5: vec![Some(10.0), Some(20.5), Some(30.0)],
            pm10: vec![Some(5.0), Some(5.0), Some(5.0)],
            nitrogen_dioxide: vec![Some(1.0), Some(2.0), Some(3.0)],
        };
        let daily = aggregate_daily(&series).unwrap();

        assert_eq!(repo.upsert_many(&daily).await.unwrap(), 2);
        for expected in &daily {
            let stored = repo.query_by_date(&expected.date).await.unwrap();
            assert_eq!(&stored, expected);
        }
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let (_dir, repo) = temp_repo().await;
        let rows = vec![day("2024-01-01", 1.0), day("2024-01-02", 2.0)];

        repo.upsert_many(&rows).await.unwrap();
        let first = repo.query_by_date("2024-01-02").await.unwrap();
        assert_eq!(repo.upsert_many(&rows).await.unwrap(), 2);

        assert_eq!(repo.query_by_date("2024-01-02").await.unwrap(), first);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_date() {
        let (_dir, repo) = temp_repo().await;
        repo.upsert_many(&[day("2024-01-01", 1.0)]).await.unwrap();

        let replacement = DailyAggregate {
            date: "2024-01-01".into(),
            pm2_5_avg: Some(9.99),
            pm10_avg: None,
            nitrogen_dioxide_avg: Some(4.2),
        };
        repo.upsert_many(&[replacement.clone()]).await.unwrap();

        assert_eq!(repo.query_by_date("2024-01-01").await.unwrap(), replacement);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_recent_rows_are_ascending() {
        let (_dir, repo) = temp_repo().await;
        let rows: Vec<_> = ["2024-01-03", "2024-01-01", "2024-01-05", "2024-01-02", "2024-01-04"]
            .iter()
            .map(|d| day(d, 1.0))
            .collect();
        repo.upsert_many(&rows).await.unwrap();

        let dates: Vec<_> = repo
            .query_recent_ascending(3)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.date)
            .collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-04", "2024-01-05"]);

        assert_eq!(repo.query_recent_ascending(10).await.unwrap().len(), 5);
        assert!(repo.query_recent_ascending(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_store() {
        let (_dir, repo) = temp_repo().await;
        assert!(repo.query_recent_ascending(5).await.unwrap().is_empty());
        assert!(matches!(
            repo.query_by_date("2024-01-01").await,
            Err(StorageError::NotFound(date)) if date == "2024-01-01"
        ));
    }

    #[tokio::test]
    async fn test_empty_upsert() {
        let (_dir, repo) = temp_repo().await;
        assert_eq!(repo.upsert_many(&[]).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
