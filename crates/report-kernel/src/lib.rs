use anyhow::{anyhow, Result};
use async_trait::async_trait;
use report_contracts::{NewReport, Report};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod memory;
mod target;

pub use memory::MemoryStore;
pub use target::{StoreTarget, StoreTargetError};

/// Seed key used for the default report inserted at startup.
pub const DEFAULT_SEED_KEY: &str = "default";

/// Persistence seam for reports. Implementations own identifier allocation and
/// the atomicity of a single insert; callers add no locking of their own.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// All reports in ascending id order.
    async fn list(&self) -> Result<Vec<Report>>;

    async fn get(&self, id: i64) -> Result<Option<Report>>;

    /// Insert and return the stored row with its generated id.
    async fn insert(&self, new: &NewReport) -> Result<Report>;

    /// Insert `new` unless a row already carries `key`. Returns true when a row was written.
    async fn insert_seed(&self, key: &str, new: &NewReport) -> Result<bool>;
}

/// Open the store a connection target points at.
pub fn open_store(target: &StoreTarget) -> Result<Arc<dyn ReportStore>> {
    Ok(match target {
        StoreTarget::Sqlite(path) => Arc::new(Kernel::open(path)?),
        StoreTarget::Memory => Arc::new(MemoryStore::new()),
    })
}

/// [`open_store`] on the blocking pool; opening a SQLite file creates
/// directories, sets pragmas and runs DDL.
pub async fn open_store_async(target: &StoreTarget) -> Result<Arc<dyn ReportStore>> {
    let target = target.clone();
    tokio::task::spawn_blocking(move || open_store(&target))
        .await
        .map_err(|e| anyhow!("join error: {}", e))?
}

/// SQLite-backed report store.
#[derive(Clone)]
pub struct Kernel {
    db_path: PathBuf,
    busy_ms: u64,
}

impl Kernel {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        // Busy timeout (default 5000ms; override with REPORT_SQLITE_BUSY_MS)
        let busy_ms: u64 = std::env::var("REPORT_SQLITE_BUSY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);
        let kernel = Self {
            db_path: db_path.to_path_buf(),
            busy_ms,
        };
        let conn = kernel.conn()?;
        // Pragmas tuned for async server usage
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::init_schema(&conn)?;
        Ok(kernel)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS reports (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              title TEXT NOT NULL,
              content TEXT NOT NULL,
              seed_key TEXT UNIQUE,      -- set only for startup seed rows
              created TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(std::time::Duration::from_millis(self.busy_ms))?;
        Ok(conn)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn list_reports(&self) -> Result<Vec<Report>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id,title,content FROM reports ORDER BY id ASC")?;
        let rows = stmt.query_map([], report_from_row)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn get_report(&self, id: i64) -> Result<Option<Report>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id,title,content FROM reports WHERE id=? LIMIT 1")?;
        let report = stmt.query_row([id], report_from_row).optional()?;
        Ok(report)
    }

    pub fn insert_report(&self, new: &NewReport) -> Result<Report> {
        let conn = self.conn()?;
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let mut stmt = conn.prepare(
            "INSERT INTO reports(title,content,created) VALUES (?,?,?) RETURNING id,title,content",
        )?;
        let report = stmt.query_row(params![new.title, new.content, now], report_from_row)?;
        Ok(report)
    }

    pub fn insert_seed_report(&self, key: &str, new: &NewReport) -> Result<bool> {
        let conn = self.conn()?;
        let now = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let n = conn.execute(
            "INSERT OR IGNORE INTO reports(title,content,seed_key,created) VALUES (?,?,?,?)",
            params![new.title, new.content, key, now],
        )?;
        Ok(n > 0)
    }

    // ---------------- Async wrappers (spawn_blocking) ----------------
    // These helpers offload rusqlite work from async executors.

    pub async fn list_reports_async(&self) -> Result<Vec<Report>> {
        let k = self.clone();
        tokio::task::spawn_blocking(move || k.list_reports())
            .await
            .map_err(|e| anyhow!("join error: {}", e))?
    }

    pub async fn get_report_async(&self, id: i64) -> Result<Option<Report>> {
        let k = self.clone();
        tokio::task::spawn_blocking(move || k.get_report(id))
            .await
            .map_err(|e| anyhow!("join error: {}", e))?
    }

    pub async fn insert_report_async(&self, new: &NewReport) -> Result<Report> {
        let k = self.clone();
        let new = new.clone();
        tokio::task::spawn_blocking(move || k.insert_report(&new))
            .await
            .map_err(|e| anyhow!("join error: {}", e))?
    }

    pub async fn insert_seed_report_async(&self, key: &str, new: &NewReport) -> Result<bool> {
        let k = self.clone();
        let key = key.to_string();
        let new = new.clone();
        tokio::task::spawn_blocking(move || k.insert_seed_report(&key, &new))
            .await
            .map_err(|e| anyhow!("join error: {}", e))?
    }
}

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<Report> {
    Ok(Report {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
    })
}

#[async_trait]
impl ReportStore for Kernel {
    async fn list(&self) -> Result<Vec<Report>> {
        self.list_reports_async().await
    }

    async fn get(&self, id: i64) -> Result<Option<Report>> {
        self.get_report_async(id).await
    }

    async fn insert(&self, new: &NewReport) -> Result<Report> {
        self.insert_report_async(new).await
    }

    async fn insert_seed(&self, key: &str, new: &NewReport) -> Result<bool> {
        self.insert_seed_report_async(key, new).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn open_temp(dir: &Path) -> Kernel {
        Kernel::open(&dir.join("reports.sqlite")).expect("open kernel")
    }

    #[test]
    fn insert_assigns_ids_and_get_round_trips() {
        let dir = tempdir().unwrap();
        let kernel = open_temp(dir.path());
        let created = kernel
            .insert_report(&NewReport::new("A", "x"))
            .expect("insert");
        assert!(created.id > 0);
        assert_eq!(created.title, "A");
        assert_eq!(created.content, "x");
        let fetched = kernel.get_report(created.id).unwrap();
        assert_eq!(fetched, Some(created));
    }

    #[test]
    fn get_missing_returns_none() {
        let dir = tempdir().unwrap();
        let kernel = open_temp(dir.path());
        assert_eq!(kernel.get_report(999).unwrap(), None);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let dir = tempdir().unwrap();
        let kernel = open_temp(dir.path());
        let ids: Vec<i64> = (0..5)
            .map(|i| {
                kernel
                    .insert_report(&NewReport::new(format!("r{i}"), "body"))
                    .unwrap()
                    .id
            })
            .collect();
        let listed: Vec<i64> = kernel.list_reports().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn reopen_keeps_rows() {
        let dir = tempdir().unwrap();
        let created = open_temp(dir.path())
            .insert_report(&NewReport::new("durable", "content"))
            .unwrap();
        let reopened = open_temp(dir.path());
        assert_eq!(reopened.get_report(created.id).unwrap(), Some(created));
    }

    #[test]
    fn seed_is_idempotent() {
        let dir = tempdir().unwrap();
        let kernel = open_temp(dir.path());
        let seed = NewReport::new("seed", "content");
        assert!(kernel.insert_seed_report(DEFAULT_SEED_KEY, &seed).unwrap());
        assert!(!kernel.insert_seed_report(DEFAULT_SEED_KEY, &seed).unwrap());
        // a second process opening the same file sees the existing seed
        let other = open_temp(dir.path());
        assert!(!other.insert_seed_report(DEFAULT_SEED_KEY, &seed).unwrap());
        assert_eq!(kernel.list_reports().unwrap().len(), 1);
    }

    #[test]
    fn seed_does_not_block_caller_rows_with_same_title() {
        let dir = tempdir().unwrap();
        let kernel = open_temp(dir.path());
        let seed = NewReport::new("seed", "content");
        kernel.insert_report(&seed).unwrap();
        assert!(kernel.insert_seed_report(DEFAULT_SEED_KEY, &seed).unwrap());
        assert_eq!(kernel.list_reports().unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_get_distinct_ids() {
        let dir = tempdir().unwrap();
        let store: Arc<dyn ReportStore> = Arc::new(open_temp(dir.path()));
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert(&NewReport::new(format!("t{i}"), "c"))
                    .await
                    .expect("insert")
                    .id
            }));
        }
        let mut ids = HashSet::new();
        for h in handles {
            assert!(ids.insert(h.await.unwrap()));
        }
        assert_eq!(store.list().await.unwrap().len(), 16);
    }

    #[test]
    fn open_store_dispatches_on_target() {
        let dir = tempdir().unwrap();
        let target = StoreTarget::Sqlite(dir.path().join("nested/dir/reports.db"));
        assert!(open_store(&target).is_ok());
        assert!(dir.path().join("nested/dir/reports.db").exists());
        assert!(open_store(&StoreTarget::Memory).is_ok());
    }

    #[tokio::test]
    async fn open_store_async_prepares_schema_off_the_runtime() {
        let dir = tempdir().unwrap();
        let target = StoreTarget::Sqlite(dir.path().join("async/reports.db"));
        let store = open_store_async(&target).await.expect("open");
        let created = store.insert(&NewReport::new("A", "x")).await.unwrap();
        assert_eq!(store.get(created.id).await.unwrap(), Some(created));
    }
}
