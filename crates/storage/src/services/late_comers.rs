use std::cmp::Reverse;

use crate::error::{Result, StorageError};
use crate::models::{AttendanceRecord, RollNumber, StaffContext};
use crate::repository::AttendanceStore;

/// Outstanding fines of one department
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFines {
    pub department: String,
    /// Sum of unpaid fines over every record of the department
    pub total_pending: i64,
    pub students: Vec<AttendanceRecord>,
}

/// Students of the actor's department who still owe a fine
pub async fn pending_fines(
    store: &dyn AttendanceStore,
    actor: &StaffContext,
    search: Option<&str>,
) -> Result<PendingFines> {
    let records = store.list_live(actor.department()).await?;
    let (total_pending, students) = select_pending(records, search);

    Ok(PendingFines {
        department: actor.department().to_string(),
        total_pending,
        students,
    })
}

/// Current state of a single live record
pub async fn get_record(
    store: &dyn AttendanceStore,
    actor: &StaffContext,
    roll_number: &str,
) -> Result<AttendanceRecord> {
    let roll_number = RollNumber::parse(roll_number)?;

    store
        .find_live(actor.department(), roll_number)
        .await?
        .ok_or(StorageError::NotFound)
}

/// Filters records with an unpaid fine, optionally by roll number substring,
/// largest fine first, then most marks, then roll number.
pub fn select_pending(
    records: Vec<AttendanceRecord>,
    search: Option<&str>,
) -> (i64, Vec<AttendanceRecord>) {
    let total: i64 = records.iter().map(|r| r.unpaid_fine).sum();

    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut pending: Vec<AttendanceRecord> = records
        .into_iter()
        .filter(|r| r.unpaid_fine > 0)
        .filter(|r| match &needle {
            Some(needle) => r.roll_number.to_string().contains(needle.as_str()),
            None => true,
        })
        .collect();

    pending.sort_by_key(|r| (Reverse(r.unpaid_fine), Reverse(r.count), r.roll_number));

    (total, pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Period;
    use chrono::Utc;

    fn record(roll: &str, count: u32, unpaid_fine: i64) -> AttendanceRecord {
        let mut r = AttendanceRecord::empty(
            RollNumber::parse(roll).unwrap(),
            "cse",
            Period::new(2025, 3).unwrap(),
            Utc::now(),
        );
        r.count = count;
        r.unpaid_fine = unpaid_fine;
        r
    }

    fn rolls(records: &[AttendanceRecord]) -> Vec<String> {
        records.iter().map(|r| r.roll_number.to_string()).collect()
    }

    #[test]
    fn test_only_unpaid_sorted_by_fine_count_roll() {
        let records = vec![
            record("10", 5, 100),
            record("11", 2, 0),
            record("12", 6, 150),
            record("13", 7, 100),
            record("9", 5, 100),
        ];

        let (total, pending) = select_pending(records, None);

        assert_eq!(total, 450);
        assert_eq!(rolls(&pending), vec!["12", "13", "9", "10"]);
    }

    #[test]
    fn test_search_filters_by_substring_but_not_total() {
        let records = vec![record("12345", 4, 50), record("22222", 4, 50)];

        let (total, pending) = select_pending(records, Some(" 234 "));

        assert_eq!(total, 100);
        assert_eq!(rolls(&pending), vec!["12345"]);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let records = vec![record("1", 4, 50), record("2", 4, 50)];
        let (_, pending) = select_pending(records, Some("   "));
        assert_eq!(pending.len(), 2);
    }
}
