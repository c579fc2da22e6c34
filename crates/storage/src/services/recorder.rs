use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::fine_ledger::outstanding_fine;
use crate::dto::payment::PaymentReceipt;
use crate::error::{Result, StorageError};
use crate::models::{AttendanceRecord, Period, RollNumber, StaffContext, local_date, mark_label};
use crate::repository::{AttendanceStore, PairKey, RecordPair};

/// Result of a successful late mark
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkOutcome {
    pub roll_number: RollNumber,
    pub department: String,
    pub count: u32,
    pub label: String,
    pub unpaid_fine: i64,
    pub marked_at: DateTime<Utc>,
}

/// Records late marks and fine payments.
///
/// Every operation reads the live record and the archive record of the current
/// period, computes the next state of both, and commits them together. A
/// concurrent write to either document makes the commit fail with
/// [`StorageError::Conflict`]; nothing is retried here.
pub struct AttendanceRecorder<'a> {
    store: &'a dyn AttendanceStore,
    offset: FixedOffset,
}

impl<'a> AttendanceRecorder<'a> {
    /// `offset` decides which calendar day and month a moment belongs to
    pub fn new(store: &'a dyn AttendanceStore, offset: FixedOffset) -> Self {
        Self { store, offset }
    }

    pub async fn record_late_mark(
        &self,
        actor: &StaffContext,
        roll_number: &str,
        now: DateTime<Utc>,
    ) -> Result<MarkOutcome> {
        let roll_number = RollNumber::parse(roll_number)?;
        let today = local_date(now, self.offset);
        let key = PairKey::new(actor.department(), roll_number, Period::of_date(today));

        let snapshot = self.store.load_pair(&key).await?;

        let (live, archive) = match apply_mark(&key, &snapshot, now, today) {
            Ok(next) => next,
            Err(e) => {
                warn!(
                    department = %key.department,
                    roll_number = %roll_number,
                    "Late mark rejected: {}",
                    e
                );
                return Err(e);
            }
        };

        self.commit(&key, &snapshot, &live, &archive).await?;

        info!(
            department = %key.department,
            roll_number = %roll_number,
            count = live.count,
            unpaid_fine = live.unpaid_fine,
            "Late mark recorded"
        );

        Ok(MarkOutcome {
            roll_number,
            department: key.department,
            count: live.count,
            label: mark_label(live.count),
            unpaid_fine: live.unpaid_fine,
            marked_at: now,
        })
    }

    pub async fn reconcile_payment(
        &self,
        actor: &StaffContext,
        roll_number: &str,
        now: DateTime<Utc>,
    ) -> Result<PaymentReceipt> {
        let roll_number = RollNumber::parse(roll_number)?;
        let key = PairKey::new(
            actor.department(),
            roll_number,
            Period::of_instant(now, self.offset),
        );

        let snapshot = self.store.load_pair(&key).await?;
        let (live, archive, amount) = apply_payment(&snapshot, now)?;

        self.commit(&key, &snapshot, &live, &archive).await?;

        info!(
            department = %key.department,
            roll_number = %roll_number,
            amount,
            paid_fine = live.paid_fine,
            "Fine payment recorded"
        );

        Ok(PaymentReceipt {
            receipt_id: Uuid::new_v4(),
            roll_number: roll_number.to_string(),
            department: key.department,
            amount_paid: amount,
            paid_fine: live.paid_fine,
            unpaid_fine: live.unpaid_fine,
            paid_at: now,
        })
    }

    async fn commit(
        &self,
        key: &PairKey,
        snapshot: &RecordPair,
        live: &AttendanceRecord,
        archive: &AttendanceRecord,
    ) -> Result<()> {
        match self.store.commit_pair(key, snapshot, live, archive).await {
            Err(e) if e.is_conflict() => {
                warn!(
                    department = %key.department,
                    roll_number = %key.roll_number,
                    "Concurrent update detected, nothing written"
                );
                Err(StorageError::Conflict)
            }
            other => other,
        }
    }
}

/// Next state of the live and archive records after one late mark
pub fn apply_mark(
    key: &PairKey,
    snapshot: &RecordPair,
    now: DateTime<Utc>,
    today: NaiveDate,
) -> Result<(AttendanceRecord, AttendanceRecord)> {
    let mut live = snapshot.live_record().cloned().unwrap_or_else(|| {
        AttendanceRecord::empty(key.roll_number, &key.department, key.period, now)
    });

    if live.is_marked_on(today) {
        return Err(StorageError::AlreadyMarkedToday {
            roll_number: key.roll_number.to_string(),
            date: today,
        });
    }

    let count = live.count.checked_add(1).ok_or_else(|| {
        StorageError::ConstraintViolation("late mark count overflow".to_string())
    })?;
    let label = mark_label(count);
    let unpaid_fine = outstanding_fine(count, live.paid_fine);

    live.count = count;
    live.unpaid_fine = unpaid_fine;
    live.timestamps.insert(label.clone(), now);
    live.last_marked_date = Some(today);
    live.last_updated = now;

    let mut archive = snapshot.archive_record().cloned().unwrap_or_else(|| {
        AttendanceRecord::empty(key.roll_number, &key.department, live.created_at, now)
    });

    archive.count = live.count;
    archive.paid_fine = live.paid_fine;
    archive.unpaid_fine = live.unpaid_fine;
    archive.timestamps.insert(label, now);
    archive.last_marked_date = live.last_marked_date;
    archive.created_at = live.created_at;
    archive.last_updated = now;

    Ok((live, archive))
}

/// Next state of both records after settling the outstanding fine, plus the
/// amount settled
pub fn apply_payment(
    snapshot: &RecordPair,
    now: DateTime<Utc>,
) -> Result<(AttendanceRecord, AttendanceRecord, i64)> {
    let current = snapshot.live_record().ok_or(StorageError::NotFound)?;

    if current.unpaid_fine <= 0 {
        return Err(StorageError::NotFound);
    }

    let amount = current.unpaid_fine;

    let mut archive = snapshot
        .archive_record()
        .cloned()
        .unwrap_or_else(|| current.clone());

    let mut live = current.clone();
    live.paid_fine += amount;
    live.unpaid_fine = 0;
    live.paid_at = Some(now);
    live.last_updated = now;

    archive.paid_fine += amount;
    archive.unpaid_fine = 0;
    archive.count = live.count;
    archive.paid_at = Some(now);
    archive.last_updated = now;

    Ok((live, archive, amount))
}
