use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AttendanceRecord, Period, RollNumber};

pub mod memory;
pub mod postgres;

pub use memory::MemoryAttendanceStore;
pub use postgres::PgAttendanceStore;

/// Addresses the live record of a roll number together with its archive copy
/// for one period.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub department: String,
    pub roll_number: RollNumber,
    pub period: Period,
}

impl PairKey {
    pub fn new(department: impl Into<String>, roll_number: RollNumber, period: Period) -> Self {
        Self {
            department: department.into(),
            roll_number,
            period,
        }
    }
}

/// A stored document and the version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: i64,
    pub value: T,
}

/// Snapshot of both documents of a [`PairKey`]. `None` means the document
/// did not exist when the snapshot was taken.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPair {
    pub live: Option<Versioned<AttendanceRecord>>,
    pub archive: Option<Versioned<AttendanceRecord>>,
}

impl RecordPair {
    pub fn live_version(&self) -> Option<i64> {
        self.live.as_ref().map(|v| v.version)
    }

    pub fn archive_version(&self) -> Option<i64> {
        self.archive.as_ref().map(|v| v.version)
    }

    pub fn live_record(&self) -> Option<&AttendanceRecord> {
        self.live.as_ref().map(|v| &v.value)
    }

    pub fn archive_record(&self) -> Option<&AttendanceRecord> {
        self.archive.as_ref().map(|v| &v.value)
    }
}

/// Document storage for attendance records.
///
/// `load_pair` followed by `commit_pair` forms an optimistic transaction: the
/// commit writes both documents at once, and only if neither changed (or came
/// into existence) since the snapshot passed as `expected` was taken. Otherwise
/// it fails with [`crate::StorageError::Conflict`] and writes nothing.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn load_pair(&self, key: &PairKey) -> Result<RecordPair>;

    async fn commit_pair(
        &self,
        key: &PairKey,
        expected: &RecordPair,
        live: &AttendanceRecord,
        archive: &AttendanceRecord,
    ) -> Result<()>;

    async fn find_live(
        &self,
        department: &str,
        roll_number: RollNumber,
    ) -> Result<Option<AttendanceRecord>>;

    /// All live records of a department, ordered by roll number
    async fn list_live(&self, department: &str) -> Result<Vec<AttendanceRecord>>;

    async fn find_archive(
        &self,
        department: &str,
        period: Period,
        roll_number: RollNumber,
    ) -> Result<Option<AttendanceRecord>>;

    /// All archive records of a period, ordered by department then roll number
    async fn list_archive(&self, period: Period) -> Result<Vec<AttendanceRecord>>;
}

pub type SharedStore = Arc<dyn AttendanceStore>;
