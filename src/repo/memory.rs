use super::{AttendanceRepository, RepoResult, Repository};
use crate::model::{AttendanceRecord, Entity, RecordId};
use crate::normalize::{self, Normalize};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

/// Array-backed store. Ids are `max + 1`, like the mock services the UI was
/// first built against.
pub struct MemoryRepository<T> {
    records: RwLock<Vec<T>>,
}

impl<T: Entity> MemoryRepository<T> {
    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Seed from raw rows in either naming convention.
    pub fn from_raw(rows: Vec<Value>) -> Self
    where
        T: Normalize,
    {
        Self::with_records(normalize::collect(rows))
    }

    fn next_id(records: &[T]) -> RecordId {
        records.iter().map(Entity::id).max().unwrap_or(0) + 1
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn get_all(&self) -> RepoResult<Vec<T>> {
        Ok(self.records.read().await.clone())
    }

    async fn get_by_id(&self, id: RecordId) -> RepoResult<Option<T>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    async fn create(&self, mut record: T) -> RepoResult<T> {
        let mut records = self.records.write().await;
        record.assign_id(Self::next_id(&records));
        records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: RecordId, mut record: T) -> RepoResult<Option<T>> {
        let mut records = self.records.write().await;
        let Some(slot) = records.iter_mut().find(|r| r.id() == id) else {
            return Ok(None);
        };
        record.assign_id(id);
        *slot = record.clone();
        Ok(Some(record))
    }

    async fn delete(&self, id: RecordId) -> RepoResult<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id() != id);
        Ok(records.len() != before)
    }
}

#[async_trait]
impl AttendanceRepository for MemoryRepository<AttendanceRecord> {
    async fn upsert_for_day(&self, mut record: AttendanceRecord) -> RepoResult<AttendanceRecord> {
        // Lookup and write share one write guard, so two marks for the same
        // day cannot both miss the existing record.
        let mut records = self.records.write().await;
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.student_id == record.student_id && r.date == record.date)
        {
            existing.status = record.status;
            if !record.notes.is_empty() {
                existing.notes = record.notes;
            }
            return Ok(existing.clone());
        }
        record.assign_id(Self::next_id(&records));
        records.push(record.clone());
        Ok(record)
    }

    async fn insert_if_absent(
        &self,
        mut record: AttendanceRecord,
    ) -> RepoResult<Option<AttendanceRecord>> {
        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|r| r.student_id == record.student_id && r.date == record.date)
        {
            return Ok(None);
        }
        record.assign_id(Self::next_id(&records));
        records.push(record.clone());
        Ok(Some(record))
    }
}
