use super::{AttendanceRepository, RepoResult, Repository};
use crate::db;
use crate::error::RepoError;
use crate::model::{AttendanceRecord, Entity, RecordId};
use crate::normalize::{self, Normalize};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// A workspace database shared by the five hosted repositories.
#[derive(Clone)]
pub struct HostedBackend {
    conn: Arc<Mutex<Connection>>,
    workspace: PathBuf,
}

impl HostedBackend {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        let conn = db::open_db(workspace)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            workspace: workspace.to_path_buf(),
        })
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn repository<T: Normalize>(&self) -> HostedRepository<T> {
        HostedRepository {
            backend: self.clone(),
            _kind: PhantomData,
        }
    }

    #[cfg(test)]
    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        lock_conn(&self.conn)
    }

    /// Runs `f` against the connection on the blocking pool so SQLite I/O
    /// never stalls a runtime worker.
    async fn run<R, F>(&self, f: F) -> RepoResult<R>
    where
        F: FnOnce(&mut Connection) -> RepoResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = lock_conn(&conn)?;
            f(&mut guard)
        })
        .await
        .map_err(|e| RepoError::Backend(format!("workspace task failed: {e}")))?
    }
}

fn lock_conn(conn: &Mutex<Connection>) -> RepoResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| RepoError::Backend("workspace connection poisoned".into()))
}

/// Rows are written in hosted naming and read back through the normalizer,
/// exactly as if they had come from the remote service.
pub struct HostedRepository<T> {
    backend: HostedBackend,
    _kind: PhantomData<fn() -> T>,
}

fn now_stamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn row_keys<T: Entity>(record: &T) -> (Option<RecordId>, Option<String>) {
    (record.owner(), record.day().map(day_key))
}

fn encode<T: Normalize>(record: &T) -> RepoResult<String> {
    Ok(serde_json::to_string(&record.to_hosted()?)?)
}

fn decode<T: Normalize>(rows: Vec<(RecordId, String)>) -> Vec<T> {
    let raw = rows.into_iter().filter_map(|(id, json)| {
        match serde_json::from_str::<Map<String, Value>>(&json) {
            Ok(mut row) => {
                row.insert("Id".to_string(), Value::from(id));
                Some(Value::Object(row))
            }
            Err(e) => {
                tracing::warn!(kind = T::KIND, id, error = %e, "unreadable stored row");
                None
            }
        }
    });
    normalize::collect(raw)
}

fn query_rows(
    conn: &Connection,
    sql: &str,
    args: impl rusqlite::Params,
) -> RepoResult<Vec<(RecordId, String)>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(args, |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[async_trait]
impl<T: Normalize> Repository<T> for HostedRepository<T> {
    async fn get_all(&self) -> RepoResult<Vec<T>> {
        let rows = self
            .backend
            .run(|conn| {
                query_rows(
                    conn,
                    &format!("SELECT Id, row_json FROM {} ORDER BY Id", T::KIND),
                    params![],
                )
            })
            .await?;
        Ok(decode(rows))
    }

    async fn get_by_id(&self, id: RecordId) -> RepoResult<Option<T>> {
        let rows = self
            .backend
            .run(move |conn| {
                query_rows(
                    conn,
                    &format!("SELECT Id, row_json FROM {} WHERE Id = ?", T::KIND),
                    params![id],
                )
            })
            .await?;
        Ok(decode(rows).into_iter().next())
    }

    async fn get_by_student(&self, student_id: RecordId) -> RepoResult<Vec<T>> {
        let rows = self
            .backend
            .run(move |conn| {
                query_rows(
                    conn,
                    &format!(
                        "SELECT Id, row_json FROM {} WHERE student_key = ? ORDER BY Id",
                        T::KIND
                    ),
                    params![student_id],
                )
            })
            .await?;
        Ok(decode(rows))
    }

    async fn create(&self, mut record: T) -> RepoResult<T> {
        self.backend
            .run(move |conn| {
                let tx = conn.transaction()?;
                let (student_key, day_key) = row_keys(&record);
                tx.execute(
                    &format!(
                        "INSERT INTO {}(student_key, day_key, row_json, modified_on) VALUES(?, ?, '{{}}', ?)",
                        T::KIND
                    ),
                    params![student_key, day_key, now_stamp()],
                )?;
                record.assign_id(tx.last_insert_rowid());
                // Written after the id is known so id-derived fields land in the row.
                tx.execute(
                    &format!("UPDATE {} SET row_json = ? WHERE Id = ?", T::KIND),
                    params![encode(&record)?, record.id()],
                )?;
                tx.commit()?;
                Ok(record)
            })
            .await
    }

    async fn update(&self, id: RecordId, mut record: T) -> RepoResult<Option<T>> {
        record.assign_id(id);
        self.backend
            .run(move |conn| {
                let (student_key, day_key) = row_keys(&record);
                let changed = conn.execute(
                    &format!(
                        "UPDATE {} SET student_key = ?, day_key = ?, row_json = ?, modified_on = ? WHERE Id = ?",
                        T::KIND
                    ),
                    params![student_key, day_key, encode(&record)?, now_stamp(), id],
                )?;
                Ok((changed > 0).then_some(record))
            })
            .await
    }

    async fn delete(&self, id: RecordId) -> RepoResult<bool> {
        self.backend
            .run(move |conn| {
                let changed =
                    conn.execute(&format!("DELETE FROM {} WHERE Id = ?", T::KIND), params![id])?;
                Ok(changed > 0)
            })
            .await
    }
}

#[async_trait]
impl AttendanceRepository for HostedRepository<AttendanceRecord> {
    async fn upsert_for_day(&self, mut record: AttendanceRecord) -> RepoResult<AttendanceRecord> {
        self.backend
            .run(move |conn| {
                let day_key = day_key(record.date);
                let tx = conn.transaction()?;

                let existing: Option<(RecordId, String)> = tx
                    .query_row(
                        "SELECT Id, row_json FROM attendance WHERE student_key = ? AND day_key = ?",
                        params![record.student_id, day_key],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;
                let previous = existing
                    .map(|row| decode::<AttendanceRecord>(vec![row]))
                    .and_then(|rows| rows.into_iter().next());
                if let Some(previous) = previous {
                    record.assign_id(previous.id);
                    if record.notes.is_empty() {
                        record.notes = previous.notes;
                    }
                }

                tx.execute(
                    "INSERT INTO attendance(student_key, day_key, row_json, modified_on)
                     VALUES(?, ?, ?, ?)
                     ON CONFLICT(student_key, day_key)
                     DO UPDATE SET row_json = excluded.row_json, modified_on = excluded.modified_on",
                    params![record.student_id, day_key, encode(&record)?, now_stamp()],
                )?;
                let id: RecordId = tx.query_row(
                    "SELECT Id FROM attendance WHERE student_key = ? AND day_key = ?",
                    params![record.student_id, day_key],
                    |row| row.get(0),
                )?;
                tx.commit()?;
                record.assign_id(id);
                Ok(record)
            })
            .await
    }

    async fn insert_if_absent(
        &self,
        mut record: AttendanceRecord,
    ) -> RepoResult<Option<AttendanceRecord>> {
        self.backend
            .run(move |conn| {
                let inserted = conn.execute(
                    "INSERT INTO attendance(student_key, day_key, row_json, modified_on)
                     VALUES(?, ?, ?, ?)
                     ON CONFLICT(student_key, day_key) DO NOTHING",
                    params![
                        record.student_id,
                        day_key(record.date),
                        encode(&record)?,
                        now_stamp()
                    ],
                )?;
                if inserted == 0 {
                    return Ok(None);
                }
                record.assign_id(conn.last_insert_rowid());
                Ok(Some(record))
            })
            .await
    }
}
