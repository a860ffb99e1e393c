use std::collections::VecDeque;
use std::path::Path;

use futures::stream::{self, Stream};
use rusqlite::{params, Row};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{FeedRecord, NewFeed};

use super::schema::MIGRATIONS;

const SCAN_PAGE_SIZE: usize = 64;

/// Handle to the feed store. Cloning shares the same background connection.
#[derive(Clone)]
pub struct Repository {
    conn: Connection,
}

impl Repository {
    /// Opens the database at `db_path` and upgrades it to `schema_version`.
    ///
    /// Every failure here is reported as [`AppError::StoreUnavailable`]; the
    /// caller is expected to give up rather than retry.
    pub async fn open(db_path: impl AsRef<Path>, schema_version: u32) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::StoreUnavailable(format!("{}: {}", parent.display(), e)))?;
        }

        let conn = Connection::open(db_path)
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("{}: {}", db_path.display(), e)))?;

        let repository = Self { conn };
        repository
            .migrate(schema_version)
            .await
            .map_err(|e| match e {
                err @ AppError::StoreUnavailable(_) => err,
                other => AppError::StoreUnavailable(other.to_string()),
            })?;

        tracing::info!("Opened feed store at {}", db_path.display());
        Ok(repository)
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        let repository = Self { conn };
        repository.migrate(super::SCHEMA_VERSION).await?;
        Ok(repository)
    }

    async fn migrate(&self, target: u32) -> Result<()> {
        if target == 0 {
            return Err(AppError::StoreUnavailable(
                "schema version must be at least 1".to_string(),
            ));
        }

        let current = self
            .conn
            .call(|conn| {
                let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
                Ok(version)
            })
            .await?;

        if current > target {
            return Err(AppError::StoreUnavailable(format!(
                "database schema version {} is newer than supported version {}",
                current, target
            )));
        }
        if target as usize > MIGRATIONS.len() {
            return Err(AppError::StoreUnavailable(format!(
                "no migration available for schema version {}",
                target
            )));
        }
        if current == target {
            return Ok(());
        }

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                for migration in &MIGRATIONS[current as usize..target as usize] {
                    tx.execute_batch(migration)?;
                }
                tx.pragma_update(None, "user_version", target)?;
                tx.commit()?;
                Ok(())
            })
            .await?;

        tracing::info!("Migrated feed store from version {} to {}", current, target);
        Ok(())
    }

    #[cfg(test)]
    pub async fn schema_version(&self) -> Result<u32> {
        let version = self
            .conn
            .call(|conn| {
                let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
                Ok(version)
            })
            .await?;
        Ok(version)
    }

    // Feed operations

    /// Persists a new feed and returns it with its assigned id once committed.
    pub async fn insert_feed(&self, feed: NewFeed) -> Result<FeedRecord> {
        let record = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO feeds (name, url, timestamp) VALUES (?1, ?2, ?3)",
                    params![feed.name, feed.url, feed.timestamp],
                )?;
                let id = tx.last_insert_rowid();
                tx.commit()?;
                Ok(feed.into_record(id))
            })
            .await?;

        tracing::debug!("Inserted feed {} ({})", record.id, record.url);
        Ok(record)
    }

    /// Returns `false` when there was nothing to delete.
    pub async fn delete_feed(&self, id: i64) -> Result<bool> {
        let removed = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let removed = tx.execute("DELETE FROM feeds WHERE id = ?1", params![id])?;
                tx.commit()?;
                Ok(removed > 0)
            })
            .await?;

        if removed {
            tracing::debug!("Deleted feed {}", id);
        } else {
            tracing::debug!("Feed {} already absent", id);
        }
        Ok(removed)
    }

    #[cfg(test)]
    pub async fn count_feeds(&self) -> Result<i64> {
        let count = self
            .conn
            .call(|conn| {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM feeds", [], |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }

    /// Streams every feed in ascending id order, reading one page at a time.
    ///
    /// The stream cannot be rewound; start a new scan to read again.
    pub fn scan_all(&self) -> impl Stream<Item = Result<FeedRecord>> {
        self.scan_with_page_size(SCAN_PAGE_SIZE)
    }

    fn scan_with_page_size(&self, page_size: usize) -> impl Stream<Item = Result<FeedRecord>> {
        let cursor = ScanCursor {
            conn: self.conn.clone(),
            after: 0,
            page_size: page_size.max(1),
            buffer: VecDeque::new(),
            exhausted: false,
        };
        stream::try_unfold(cursor, next_record)
    }
}

struct ScanCursor {
    conn: Connection,
    after: i64,
    page_size: usize,
    buffer: VecDeque<FeedRecord>,
    exhausted: bool,
}

async fn next_record(mut cursor: ScanCursor) -> Result<Option<(FeedRecord, ScanCursor)>> {
    if cursor.buffer.is_empty() && !cursor.exhausted {
        let after = cursor.after;
        let limit = cursor.page_size as i64;
        let page = cursor
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, name, url, timestamp FROM feeds WHERE id > ?1 ORDER BY id ASC LIMIT ?2",
                )?;
                let feeds = stmt
                    .query_map(params![after, limit], feed_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(feeds)
            })
            .await?;

        cursor.exhausted = page.len() < cursor.page_size;
        cursor.buffer.extend(page);
    }

    Ok(cursor.buffer.pop_front().map(|record| {
        cursor.after = record.id;
        (record, cursor)
    }))
}

fn feed_from_row(row: &Row) -> rusqlite::Result<FeedRecord> {
    Ok(FeedRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        timestamp: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;
    use crate::db::SCHEMA_VERSION;

    fn feed(name: &str, url: &str) -> NewFeed {
        NewFeed::new(name, url).unwrap()
    }

    async fn scan(repo: &Repository) -> Vec<FeedRecord> {
        repo.scan_all().try_collect().await.unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_fresh_ids_visible_to_scan() {
        let repo = Repository::open_in_memory().await.unwrap();
        let first = repo
            .insert_feed(feed("Board 1", "https://lichess.org/abcd1234"))
            .await
            .unwrap();
        let second = repo
            .insert_feed(feed("Board 2", "https://example.com/stream"))
            .await
            .unwrap();

        assert!(second.id > first.id);

        let records = scan(&repo).await;
        let matching: Vec<_> = records
            .iter()
            .filter(|r| r.name == "Board 2" && r.url == "https://example.com/stream")
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0], &second);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = Repository::open_in_memory().await.unwrap();
        let keep = repo.insert_feed(feed("Keep", "https://a.test")).await.unwrap();
        let gone = repo.insert_feed(feed("Gone", "https://b.test")).await.unwrap();

        assert!(repo.delete_feed(gone.id).await.unwrap());
        let after_once = scan(&repo).await;
        assert!(!repo.delete_feed(gone.id).await.unwrap());
        let after_twice = scan(&repo).await;

        assert_eq!(after_once, after_twice);
        assert_eq!(after_twice, vec![keep]);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let repo = Repository::open_in_memory().await.unwrap();
        let a = repo.insert_feed(feed("A", "https://a.test")).await.unwrap();
        let b = repo.insert_feed(feed("B", "https://b.test")).await.unwrap();
        repo.delete_feed(b.id).await.unwrap();

        let c = repo.insert_feed(feed("C", "https://c.test")).await.unwrap();
        assert!(c.id > b.id);
        assert!(c.id > a.id);
    }

    #[tokio::test]
    async fn scan_walks_pages_in_id_order() {
        let repo = Repository::open_in_memory().await.unwrap();
        let mut inserted = Vec::new();
        for i in 0..5 {
            let record = repo
                .insert_feed(feed(&format!("Feed {i}"), &format!("https://feed{i}.test")))
                .await
                .unwrap();
            inserted.push(record);
        }

        let paged: Vec<FeedRecord> = repo.scan_with_page_size(2).try_collect().await.unwrap();
        assert_eq!(paged, inserted);
        assert_eq!(repo.count_feeds().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn scan_of_empty_store_ends_immediately() {
        let repo = Repository::open_in_memory().await.unwrap();
        assert!(scan(&repo).await.is_empty());
    }

    #[tokio::test]
    async fn store_persists_across_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("feeds.db");

        let repo = Repository::open(&path, SCHEMA_VERSION).await.unwrap();
        let saved = repo.insert_feed(feed("Saved", "https://saved.test")).await.unwrap();
        drop(repo);

        let reopened = Repository::open(&path, SCHEMA_VERSION).await.unwrap();
        assert_eq!(reopened.schema_version().await.unwrap(), SCHEMA_VERSION);
        assert_eq!(scan(&reopened).await, vec![saved]);
    }

    #[tokio::test]
    async fn open_refuses_newer_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feeds.db");
        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.pragma_update(None, "user_version", 5).unwrap();
        }

        let err = Repository::open(&path, SCHEMA_VERSION).await.err().unwrap();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn open_rejects_schema_version_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feeds.db");

        let err = Repository::open(&path, 0).await.err().unwrap();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn sql_failures_surface_as_database_errors() {
        let repo = Repository::open_in_memory().await.unwrap();
        repo.conn
            .call(|conn| {
                conn.execute_batch("DROP TABLE feeds")?;
                Ok(())
            })
            .await
            .unwrap();

        let err = repo.scan_all().try_collect::<Vec<_>>().await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let err = repo
            .insert_feed(feed("Lost", "https://lost.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn open_reports_unusable_location() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let err = Repository::open(blocker.join("feeds.db"), SCHEMA_VERSION)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }
}
