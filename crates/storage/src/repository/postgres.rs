use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::{AttendanceStore, PairKey, RecordPair, Versioned};
use crate::error::{Result, StorageError};
use crate::models::{AttendanceRecord, Period, RollNumber};

const RECORD_COLUMNS: &str = r#"
    department, roll_number, count, paid_fine, unpaid_fine, timestamps,
    last_marked_date, created_period, paid_at, last_updated, version
"#;

#[derive(Debug, FromRow)]
struct RecordRow {
    department: String,
    roll_number: i64,
    count: i32,
    paid_fine: i64,
    unpaid_fine: i64,
    timestamps: Json<BTreeMap<String, DateTime<Utc>>>,
    last_marked_date: Option<NaiveDate>,
    created_period: String,
    paid_at: Option<DateTime<Utc>>,
    last_updated: DateTime<Utc>,
    version: i64,
}

impl RecordRow {
    fn into_versioned(self) -> Result<Versioned<AttendanceRecord>> {
        let roll_number = u64::try_from(self.roll_number)
            .ok()
            .and_then(|v| RollNumber::parse(&v.to_string()).ok())
            .ok_or_else(|| {
                StorageError::Corrupt(format!("invalid roll number {}", self.roll_number))
            })?;
        let count = u32::try_from(self.count)
            .map_err(|_| StorageError::Corrupt(format!("negative count {}", self.count)))?;

        Ok(Versioned {
            version: self.version,
            value: AttendanceRecord {
                roll_number,
                department: self.department,
                count,
                paid_fine: self.paid_fine,
                unpaid_fine: self.unpaid_fine,
                timestamps: self.timestamps.0,
                last_marked_date: self.last_marked_date,
                created_at: self.created_period.parse()?,
                paid_at: self.paid_at,
                last_updated: self.last_updated,
            },
        })
    }
}

fn roll_column(roll_number: RollNumber) -> Result<i64> {
    i64::try_from(roll_number.value()).map_err(|_| {
        StorageError::InvalidRollNumber(format!("roll number {} is too large", roll_number))
    })
}

fn count_column(count: u32) -> Result<i32> {
    i32::try_from(count)
        .map_err(|_| StorageError::ConstraintViolation(format!("count {} is too large", count)))
}

/// Writes that touch no row mean the snapshot was stale
fn ensure_written(rows_affected: u64) -> Result<()> {
    if rows_affected == 0 {
        Err(StorageError::Conflict)
    } else {
        Ok(())
    }
}

/// PostgreSQL-backed attendance records
#[derive(Debug, Clone)]
pub struct PgAttendanceStore {
    pool: PgPool,
}

impl PgAttendanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write_live(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        expected_version: Option<i64>,
        record: &AttendanceRecord,
    ) -> Result<()> {
        let roll_number = roll_column(record.roll_number)?;
        let count = count_column(record.count)?;

        let result = match expected_version {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO live_records (
                        department, roll_number, count, paid_fine, unpaid_fine, timestamps,
                        last_marked_date, created_period, paid_at, last_updated, version
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 1)
                    ON CONFLICT (department, roll_number) DO NOTHING
                    "#,
                )
                .bind(&record.department)
                .bind(roll_number)
                .bind(count)
                .bind(record.paid_fine)
                .bind(record.unpaid_fine)
                .bind(Json(record.timestamps.clone()))
                .bind(record.last_marked_date)
                .bind(record.created_at.label())
                .bind(record.paid_at)
                .bind(record.last_updated)
                .execute(&mut **tx)
                .await?
            }
            Some(version) => {
                sqlx::query(
                    r#"
                    UPDATE live_records
                    SET count = $3,
                        paid_fine = $4,
                        unpaid_fine = $5,
                        timestamps = $6,
                        last_marked_date = $7,
                        created_period = $8,
                        paid_at = $9,
                        last_updated = $10,
                        version = version + 1
                    WHERE department = $1 AND roll_number = $2 AND version = $11
                    "#,
                )
                .bind(&record.department)
                .bind(roll_number)
                .bind(count)
                .bind(record.paid_fine)
                .bind(record.unpaid_fine)
                .bind(Json(record.timestamps.clone()))
                .bind(record.last_marked_date)
                .bind(record.created_at.label())
                .bind(record.paid_at)
                .bind(record.last_updated)
                .bind(version)
                .execute(&mut **tx)
                .await?
            }
        };

        ensure_written(result.rows_affected())
    }

    async fn write_archive(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        period: Period,
        expected_version: Option<i64>,
        record: &AttendanceRecord,
    ) -> Result<()> {
        let roll_number = roll_column(record.roll_number)?;
        let count = count_column(record.count)?;
        // month is validated to 1..=12 by Period
        let month = period.month() as i32;

        let result = match expected_version {
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO archive_records (
                        department, period_year, period_month, roll_number, count,
                        paid_fine, unpaid_fine, timestamps, last_marked_date,
                        created_period, paid_at, last_updated, version
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 1)
                    ON CONFLICT (department, period_year, period_month, roll_number) DO NOTHING
                    "#,
                )
                .bind(&record.department)
                .bind(period.year())
                .bind(month)
                .bind(roll_number)
                .bind(count)
                .bind(record.paid_fine)
                .bind(record.unpaid_fine)
                .bind(Json(record.timestamps.clone()))
                .bind(record.last_marked_date)
                .bind(record.created_at.label())
                .bind(record.paid_at)
                .bind(record.last_updated)
                .execute(&mut **tx)
                .await?
            }
            Some(version) => {
                sqlx::query(
                    r#"
                    UPDATE archive_records
                    SET count = $5,
                        paid_fine = $6,
                        unpaid_fine = $7,
                        timestamps = $8,
                        last_marked_date = $9,
                        created_period = $10,
                        paid_at = $11,
                        last_updated = $12,
                        version = version + 1
                    WHERE department = $1
                      AND period_year = $2
                      AND period_month = $3
                      AND roll_number = $4
                      AND version = $13
                    "#,
                )
                .bind(&record.department)
                .bind(period.year())
                .bind(month)
                .bind(roll_number)
                .bind(count)
                .bind(record.paid_fine)
                .bind(record.unpaid_fine)
                .bind(Json(record.timestamps.clone()))
                .bind(record.last_marked_date)
                .bind(record.created_at.label())
                .bind(record.paid_at)
                .bind(record.last_updated)
                .bind(version)
                .execute(&mut **tx)
                .await?
            }
        };

        ensure_written(result.rows_affected())
    }
}

#[async_trait]
impl AttendanceStore for PgAttendanceStore {
    async fn load_pair(&self, key: &PairKey) -> Result<RecordPair> {
        let live = self.find_live_row(&key.department, key.roll_number).await?;
        let archive = self
            .find_archive_row(&key.department, key.period, key.roll_number)
            .await?;

        Ok(RecordPair {
            live: live.map(RecordRow::into_versioned).transpose()?,
            archive: archive.map(RecordRow::into_versioned).transpose()?,
        })
    }

    async fn commit_pair(
        &self,
        key: &PairKey,
        expected: &RecordPair,
        live: &AttendanceRecord,
        archive: &AttendanceRecord,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // an early return drops `tx`, which rolls both writes back
        self.write_live(&mut tx, expected.live_version(), live).await?;
        self.write_archive(&mut tx, key.period, expected.archive_version(), archive)
            .await?;

        tx.commit().await.map_err(StorageError::from).map_err(|e| {
            if e.is_conflict() {
                StorageError::Conflict
            } else {
                e
            }
        })
    }

    async fn find_live(
        &self,
        department: &str,
        roll_number: RollNumber,
    ) -> Result<Option<AttendanceRecord>> {
        self.find_live_row(department, roll_number)
            .await?
            .map(|row| row.into_versioned().map(|v| v.value))
            .transpose()
    }

    async fn list_live(&self, department: &str) -> Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, RecordRow>(&format!(
            "SELECT {} FROM live_records WHERE department = $1 ORDER BY roll_number",
            RECORD_COLUMNS
        ))
        .bind(department)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_versioned().map(|v| v.value))
            .collect()
    }

    async fn find_archive(
        &self,
        department: &str,
        period: Period,
        roll_number: RollNumber,
    ) -> Result<Option<AttendanceRecord>> {
        self.find_archive_row(department, period, roll_number)
            .await?
            .map(|row| row.into_versioned().map(|v| v.value))
            .transpose()
    }

    async fn list_archive(&self, period: Period) -> Result<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, RecordRow>(&format!(
            r#"
            SELECT {}
            FROM archive_records
            WHERE period_year = $1 AND period_month = $2
            ORDER BY department, roll_number
            "#,
            RECORD_COLUMNS
        ))
        .bind(period.year())
        .bind(period.month() as i32)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_versioned().map(|v| v.value))
            .collect()
    }
}

impl PgAttendanceStore {
    async fn find_live_row(
        &self,
        department: &str,
        roll_number: RollNumber,
    ) -> Result<Option<RecordRow>> {
        let row = sqlx::query_as::<_, RecordRow>(&format!(
            "SELECT {} FROM live_records WHERE department = $1 AND roll_number = $2",
            RECORD_COLUMNS
        ))
        .bind(department)
        .bind(roll_column(roll_number)?)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_archive_row(
        &self,
        department: &str,
        period: Period,
        roll_number: RollNumber,
    ) -> Result<Option<RecordRow>> {
        let row = sqlx::query_as::<_, RecordRow>(&format!(
            r#"
            SELECT {}
            FROM archive_records
            WHERE department = $1
              AND period_year = $2
              AND period_month = $3
              AND roll_number = $4
            "#,
            RECORD_COLUMNS
        ))
        .bind(department)
        .bind(period.year())
        .bind(period.month() as i32)
        .bind(roll_column(roll_number)?)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rows_is_conflict() {
        assert!(matches!(ensure_written(0), Err(StorageError::Conflict)));
        assert!(ensure_written(1).is_ok());
    }

    #[test]
    fn test_row_conversion() {
        let now = Utc::now();
        let mut timestamps = BTreeMap::new();
        timestamps.insert("L1".to_string(), now);

        let row = RecordRow {
            department: "cse".to_string(),
            roll_number: 12345,
            count: 1,
            paid_fine: 0,
            unpaid_fine: 0,
            timestamps: Json(timestamps),
            last_marked_date: None,
            created_period: "3 2025".to_string(),
            paid_at: None,
            last_updated: now,
            version: 4,
        };

        let versioned = row.into_versioned().unwrap();
        assert_eq!(versioned.version, 4);
        assert_eq!(versioned.value.roll_number.value(), 12345);
        assert_eq!(versioned.value.created_at, Period::new(2025, 3).unwrap());
        assert_eq!(versioned.value.timestamp_of(1), Some(now));
    }

    #[test]
    fn test_corrupt_rows_are_reported() {
        let row = RecordRow {
            department: "cse".to_string(),
            roll_number: 0,
            count: 1,
            paid_fine: 0,
            unpaid_fine: 0,
            timestamps: Json(BTreeMap::new()),
            last_marked_date: None,
            created_period: "3 2025".to_string(),
            paid_at: None,
            last_updated: Utc::now(),
            version: 1,
        };

        assert!(matches!(
            row.into_versioned(),
            Err(StorageError::Corrupt(_))
        ));
    }
}
