//! Persistence behind one interface. Canonical code never branches on which
//! adapter is active.

mod hosted;
mod memory;

pub use hosted::{HostedBackend, HostedRepository};
pub use memory::MemoryRepository;

use crate::error::RepoError;
use crate::model::{AttendanceRecord, Entity, RecordId};
use async_trait::async_trait;

pub type RepoResult<T> = Result<T, RepoError>;

/// CRUD over one record kind.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn get_all(&self) -> RepoResult<Vec<T>>;

    /// `Ok(None)` when no record has this id.
    async fn get_by_id(&self, id: RecordId) -> RepoResult<Option<T>>;

    async fn get_by_student(&self, student_id: RecordId) -> RepoResult<Vec<T>> {
        Ok(self
            .get_all()
            .await?
            .into_iter()
            .filter(|r| r.owner() == Some(student_id))
            .collect())
    }

    /// Stores a new record and returns it with its assigned id.
    async fn create(&self, record: T) -> RepoResult<T>;

    /// Replaces the stored record. `Ok(None)` when the id is unknown.
    async fn update(&self, id: RecordId, record: T) -> RepoResult<Option<T>>;

    async fn delete(&self, id: RecordId) -> RepoResult<bool>;
}

#[async_trait]
pub trait AttendanceRepository: Repository<AttendanceRecord> {
    /// Insert or update the single record for `(student_id, date)` as one
    /// atomic step. Existing notes survive an upsert that carries none.
    async fn upsert_for_day(&self, record: AttendanceRecord) -> RepoResult<AttendanceRecord>;

    /// Stores the record only if its student has nothing for that day yet,
    /// checked and written as one step. `Ok(None)` when the day was taken.
    async fn insert_if_absent(
        &self,
        record: AttendanceRecord,
    ) -> RepoResult<Option<AttendanceRecord>>;
}
