use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AttendanceStore, PairKey, RecordPair, Versioned};
use crate::error::{Result, StorageError};
use crate::models::{AttendanceRecord, Period, RollNumber};

type LiveKey = (String, RollNumber);
type ArchiveKey = (String, Period, RollNumber);

#[derive(Debug, Default)]
struct Documents {
    live: HashMap<LiveKey, Versioned<AttendanceRecord>>,
    archive: HashMap<ArchiveKey, Versioned<AttendanceRecord>>,
}

/// Process-local store, used when no database is configured and in tests
#[derive(Debug, Default)]
pub struct MemoryAttendanceStore {
    documents: RwLock<Documents>,
}

impl MemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_version(current: Option<i64>) -> i64 {
    current.map_or(1, |v| v + 1)
}

#[async_trait]
impl AttendanceStore for MemoryAttendanceStore {
    async fn load_pair(&self, key: &PairKey) -> Result<RecordPair> {
        let docs = self.documents.read().await;

        Ok(RecordPair {
            live: docs
                .live
                .get(&(key.department.clone(), key.roll_number))
                .cloned(),
            archive: docs
                .archive
                .get(&(key.department.clone(), key.period, key.roll_number))
                .cloned(),
        })
    }

    async fn commit_pair(
        &self,
        key: &PairKey,
        expected: &RecordPair,
        live: &AttendanceRecord,
        archive: &AttendanceRecord,
    ) -> Result<()> {
        let live_key = (key.department.clone(), key.roll_number);
        let archive_key = (key.department.clone(), key.period, key.roll_number);

        let mut docs = self.documents.write().await;

        let live_version = docs.live.get(&live_key).map(|v| v.version);
        let archive_version = docs.archive.get(&archive_key).map(|v| v.version);

        if live_version != expected.live_version() || archive_version != expected.archive_version()
        {
            return Err(StorageError::Conflict);
        }

        docs.live.insert(
            live_key,
            Versioned {
                version: next_version(live_version),
                value: live.clone(),
            },
        );
        docs.archive.insert(
            archive_key,
            Versioned {
                version: next_version(archive_version),
                value: archive.clone(),
            },
        );

        Ok(())
    }

    async fn find_live(
        &self,
        department: &str,
        roll_number: RollNumber,
    ) -> Result<Option<AttendanceRecord>> {
        let docs = self.documents.read().await;
        Ok(docs
            .live
            .get(&(department.to_string(), roll_number))
            .map(|v| v.value.clone()))
    }

    async fn list_live(&self, department: &str) -> Result<Vec<AttendanceRecord>> {
        let docs = self.documents.read().await;

        let mut records: Vec<AttendanceRecord> = docs
            .live
            .iter()
            .filter(|((dept, _), _)| dept == department)
            .map(|(_, v)| v.value.clone())
            .collect();
        records.sort_by_key(|r| r.roll_number);

        Ok(records)
    }

    async fn find_archive(
        &self,
        department: &str,
        period: Period,
        roll_number: RollNumber,
    ) -> Result<Option<AttendanceRecord>> {
        let docs = self.documents.read().await;
        Ok(docs
            .archive
            .get(&(department.to_string(), period, roll_number))
            .map(|v| v.value.clone()))
    }

    async fn list_archive(&self, period: Period) -> Result<Vec<AttendanceRecord>> {
        let docs = self.documents.read().await;

        let mut records: Vec<(String, AttendanceRecord)> = docs
            .archive
            .iter()
            .filter(|((_, p, _), _)| *p == period)
            .map(|((dept, _, _), v)| (dept.clone(), v.value.clone()))
            .collect();
        records.sort_by(|(da, a), (db, b)| da.cmp(db).then(a.roll_number.cmp(&b.roll_number)));

        Ok(records.into_iter().map(|(_, r)| r).collect())
    }
}
