use std::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use storage::StorageError;
use storage::models::{Period, RollNumber, StaffContext};
use storage::repository::{AttendanceStore, MemoryAttendanceStore};
use storage::services::AttendanceRecorder;
use storage::services::late_comers;
use storage::services::report_match;

fn ist() -> FixedOffset {
    FixedOffset::east_opt(330 * 60).unwrap()
}

fn cse() -> StaffContext {
    StaffContext::new("cse")
}

/// 09:00 local time on the given March 2025 day
fn morning(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, 3, 30, 0).unwrap()
}

async fn mark_days(store: &MemoryAttendanceStore, roll: &str, days: &[u32]) {
    let recorder = AttendanceRecorder::new(store, ist());
    for day in days {
        recorder
            .record_late_mark(&cse(), roll, morning(*day))
            .await
            .unwrap();
    }
}

async fn assert_paired(store: &MemoryAttendanceStore, roll: &str, period: Period) {
    let roll = RollNumber::parse(roll).unwrap();
    let live = store.find_live("cse", roll).await.unwrap().unwrap();
    let archive = store
        .find_archive("cse", period, roll)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(live.count, archive.count);
    assert_eq!(live.unpaid_fine, archive.unpaid_fine);
}

#[tokio::test]
async fn first_mark_starts_the_tally() {
    let store = MemoryAttendanceStore::new();
    let recorder = AttendanceRecorder::new(&store, ist());

    let outcome = recorder
        .record_late_mark(&cse(), "12345", morning(3))
        .await
        .unwrap();

    assert_eq!(outcome.count, 1);
    assert_eq!(outcome.unpaid_fine, 0);
    assert_eq!(outcome.label, "L1");

    let live = store
        .find_live("cse", RollNumber::parse("12345").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(live.timestamp_of(1), Some(morning(3)));
    assert_eq!(live.created_at.label(), "3 2025");
    assert_paired(&store, "12345", Period::new(2025, 3).unwrap()).await;
}

#[tokio::test]
async fn fourth_mark_accrues_a_fine() {
    let store = MemoryAttendanceStore::new();
    mark_days(&store, "12345", &[3, 4, 5]).await;

    let recorder = AttendanceRecorder::new(&store, ist());
    let outcome = recorder
        .record_late_mark(&cse(), "12345", morning(6))
        .await
        .unwrap();

    assert_eq!(outcome.count, 4);
    assert_eq!(outcome.unpaid_fine, 50);
    assert_paired(&store, "12345", Period::new(2025, 3).unwrap()).await;
}

#[tokio::test]
async fn fine_is_recomputed_after_a_payment() {
    let store = MemoryAttendanceStore::new();
    mark_days(&store, "12345", &[3, 4, 5, 6]).await;

    let recorder = AttendanceRecorder::new(&store, ist());
    let receipt = recorder
        .reconcile_payment(&cse(), "12345", morning(6))
        .await
        .unwrap();
    assert_eq!(receipt.amount_paid, 50);
    assert_eq!(receipt.paid_fine, 50);

    recorder
        .record_late_mark(&cse(), "12345", morning(7))
        .await
        .unwrap();
    let outcome = recorder
        .record_late_mark(&cse(), "12345", morning(10))
        .await
        .unwrap();

    // count=6 accrues 150, 50 already paid
    assert_eq!(outcome.count, 6);
    assert_eq!(outcome.unpaid_fine, 100);

    let receipt = recorder
        .reconcile_payment(&cse(), "12345", morning(11))
        .await
        .unwrap();
    assert_eq!(receipt.amount_paid, 100);
    assert_eq!(receipt.paid_fine, 150);
    assert_eq!(receipt.unpaid_fine, 0);

    let roll = RollNumber::parse("12345").unwrap();
    let archive = store
        .find_archive("cse", Period::new(2025, 3).unwrap(), roll)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(archive.paid_fine, 150);
    assert_eq!(archive.unpaid_fine, 0);
    assert_eq!(archive.paid_at, Some(morning(11)));
}

#[tokio::test]
async fn second_mark_on_the_same_day_is_rejected_without_writing() {
    let store = MemoryAttendanceStore::new();
    let recorder = AttendanceRecorder::new(&store, ist());

    recorder
        .record_late_mark(&cse(), "12345", morning(3))
        .await
        .unwrap();

    // later the same local day
    let evening = Utc.with_ymd_and_hms(2025, 3, 3, 15, 0, 0).unwrap();
    let err = recorder
        .record_late_mark(&cse(), "12345", evening)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::AlreadyMarkedToday { .. }));

    let live = store
        .find_live("cse", RollNumber::parse("12345").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(live.count, 1);
    assert_eq!(live.timestamps.len(), 1);
}

#[tokio::test]
async fn invalid_roll_numbers_never_touch_the_store() {
    let store = MemoryAttendanceStore::new();
    let recorder = AttendanceRecorder::new(&store, ist());

    for input in ["0", "abc", ""] {
        let err = recorder
            .record_late_mark(&cse(), input, morning(3))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidRollNumber(_)));
    }

    assert!(store.list_live("cse").await.unwrap().is_empty());
}

#[tokio::test]
async fn paying_without_a_record_is_not_found() {
    let store = MemoryAttendanceStore::new();
    let recorder = AttendanceRecorder::new(&store, ist());

    let err = recorder
        .reconcile_payment(&cse(), "12345", morning(3))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn departments_are_separate_buckets() {
    let store = MemoryAttendanceStore::new();
    let recorder = AttendanceRecorder::new(&store, ist());

    recorder
        .record_late_mark(&cse(), "12345", morning(3))
        .await
        .unwrap();
    let ece = recorder
        .record_late_mark(&StaffContext::new("ece"), "12345", morning(3))
        .await
        .unwrap();

    assert_eq!(ece.count, 1);
    assert_eq!(store.list_live("cse").await.unwrap().len(), 1);
    assert_eq!(store.list_live("ece").await.unwrap().len(), 1);
}

#[tokio::test]
async fn new_month_opens_a_new_archive_record() {
    let store = MemoryAttendanceStore::new();
    mark_days(&store, "12345", &[28, 31]).await;

    let recorder = AttendanceRecorder::new(&store, ist());
    let april = Utc.with_ymd_and_hms(2025, 4, 1, 3, 30, 0).unwrap();
    recorder
        .record_late_mark(&cse(), "12345", april)
        .await
        .unwrap();

    let roll = RollNumber::parse("12345").unwrap();
    let april_archive = store
        .find_archive("cse", Period::new(2025, 4).unwrap(), roll)
        .await
        .unwrap()
        .unwrap();
    let live = store.find_live("cse", roll).await.unwrap().unwrap();

    assert_eq!(live.count, 3);
    assert_eq!(april_archive.count, 3);
    assert_eq!(april_archive.timestamps.len(), 1);
    // first-mark period is kept
    assert_eq!(live.created_at, Period::new(2025, 3).unwrap());
    assert_eq!(april_archive.created_at, Period::new(2025, 3).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_marks_for_one_roll_number_count_once() {
    let store = Arc::new(MemoryAttendanceStore::new());
    mark_days(&store, "12345", &[3, 4]).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let recorder = AttendanceRecorder::new(store.as_ref(), ist());
            recorder
                .record_late_mark(&cse(), "12345", morning(5))
                .await
        }));
    }

    let mut succeeded = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(outcome) => {
                succeeded += 1;
                assert_eq!(outcome.count, 3);
            }
            Err(StorageError::Conflict) | Err(StorageError::AlreadyMarkedToday { .. }) => {}
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(succeeded, 1);
    let live = store
        .find_live("cse", RollNumber::parse("12345").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(live.count, 3);
    assert_paired(&store, "12345", Period::new(2025, 3).unwrap()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_marks_for_different_roll_numbers_all_succeed() {
    let store = Arc::new(MemoryAttendanceStore::new());

    let mut handles = Vec::new();
    for roll in 1..=20u32 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let recorder = AttendanceRecorder::new(store.as_ref(), ist());
            loop {
                // another roll number committing in between is not a conflict,
                // but retry anyway so the test only checks the final state
                match recorder
                    .record_late_mark(&cse(), &roll.to_string(), morning(3))
                    .await
                {
                    Err(StorageError::Conflict) => continue,
                    other => break other,
                }
            }
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().count, 1);
    }

    assert_eq!(store.list_live("cse").await.unwrap().len(), 20);
}

#[tokio::test]
async fn stale_transaction_conflicts_and_leaves_state_alone() {
    let store = MemoryAttendanceStore::new();
    mark_days(&store, "12345", &[3]).await;

    let key = storage::repository::PairKey::new(
        "cse",
        RollNumber::parse("12345").unwrap(),
        Period::new(2025, 3).unwrap(),
    );
    let stale = store.load_pair(&key).await.unwrap();

    // someone else marks in between
    mark_days(&store, "12345", &[4]).await;

    let (live, archive) = storage::services::recorder::apply_mark(
        &key,
        &stale,
        morning(5),
        morning(5).with_timezone(&ist()).date_naive(),
    )
    .unwrap();
    let err = store
        .commit_pair(&key, &stale, &live, &archive)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let current = store.find_live("cse", key.roll_number).await.unwrap().unwrap();
    assert_eq!(current.count, 2);
}

#[tokio::test]
async fn stale_payment_conflicts_and_leaves_both_records_unpaid() {
    let store = MemoryAttendanceStore::new();
    mark_days(&store, "12345", &[3, 4, 5, 6]).await;

    let march = Period::new(2025, 3).unwrap();
    let key = storage::repository::PairKey::new("cse", RollNumber::parse("12345").unwrap(), march);
    let stale = store.load_pair(&key).await.unwrap();

    // a fifth mark lands before the payment is committed
    mark_days(&store, "12345", &[7]).await;

    let (live, archive, paid) =
        storage::services::recorder::apply_payment(&stale, morning(7)).unwrap();
    assert_eq!(paid, 50);
    let err = store
        .commit_pair(&key, &stale, &live, &archive)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let live = store.find_live("cse", key.roll_number).await.unwrap().unwrap();
    let archive = store
        .find_archive("cse", march, key.roll_number)
        .await
        .unwrap()
        .unwrap();
    for record in [&live, &archive] {
        assert_eq!(record.count, 5);
        assert_eq!(record.paid_fine, 0);
        assert_eq!(record.unpaid_fine, 100);
        assert!(record.paid_at.is_none());
    }
}

#[tokio::test]
async fn pending_fines_and_monthly_report() {
    let store = MemoryAttendanceStore::new();
    mark_days(&store, "111", &[3, 4, 5, 6, 7]).await;
    mark_days(&store, "222", &[3, 4, 5, 6]).await;
    mark_days(&store, "333", &[3]).await;

    let pending = late_comers::pending_fines(&store, &cse(), None)
        .await
        .unwrap();
    assert_eq!(pending.total_pending, 150);
    let rolls: Vec<String> = pending
        .students
        .iter()
        .map(|r| r.roll_number.to_string())
        .collect();
    assert_eq!(rolls, vec!["111", "222"]);

    let records = report_match::monthly_records(&store, Period::new(2025, 3).unwrap())
        .await
        .unwrap();
    assert_eq!(records.len(), 3);

    let roster = vec![storage::dto::report::RosterEntry {
        roll_no: "0111".to_string(),
        name: "Ravi".to_string(),
        department: "CSE".to_string(),
        semester: "3".to_string(),
    }];
    let rows = report_match::match_roster(records, &roster);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows.iter().filter(|r| r.matched).count(), 1);
    assert_eq!(rows[0].name, "Ravi");
    assert_eq!(rows[1].name, report_match::UNKNOWN);
}
