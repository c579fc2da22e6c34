use std::collections::HashMap;

use crate::dto::report::{ReportRow, RosterEntry};
use crate::error::Result;
use crate::models::{AttendanceRecord, Period, RollNumber};
use crate::repository::AttendanceStore;

/// Placeholder for identity fields of records missing from the roster
pub const UNKNOWN: &str = "N/A";

/// Archive records of a month across all departments
pub async fn monthly_records(
    store: &dyn AttendanceStore,
    period: Period,
) -> Result<Vec<AttendanceRecord>> {
    store.list_archive(period).await
}

/// Canonical form of a roll number for matching.
///
/// Numeric values lose their leading zeros so that `"00123"` in a roster
/// matches the stored `123`; anything else is compared trimmed and lowercased.
pub fn normalize_roll(raw: &str) -> String {
    match RollNumber::parse(raw) {
        Ok(roll) => roll.as_key(),
        Err(_) => raw.trim().to_lowercase(),
    }
}

/// Left-joins archive records against a roster.
///
/// Every record yields exactly one row, in input order. Matched rows take
/// name, department and semester from the roster; unmatched rows keep the
/// record's department and use [`UNKNOWN`] for the rest. When the roster lists
/// a roll number twice the first entry wins.
pub fn match_roster(records: Vec<AttendanceRecord>, roster: &[RosterEntry]) -> Vec<ReportRow> {
    let mut by_roll: HashMap<String, &RosterEntry> = HashMap::with_capacity(roster.len());
    for entry in roster {
        by_roll.entry(normalize_roll(&entry.roll_no)).or_insert(entry);
    }

    records
        .into_iter()
        .map(|record| {
            let roll_number = record.roll_number.to_string();

            match by_roll.get(&normalize_roll(&roll_number)) {
                Some(entry) => ReportRow {
                    roll_number,
                    name: entry.name.trim().to_string(),
                    department: entry.department.trim().to_string(),
                    semester: entry.semester.trim().to_string(),
                    matched: true,
                    record,
                },
                None => ReportRow {
                    roll_number,
                    name: UNKNOWN.to_string(),
                    department: record.department.clone(),
                    semester: UNKNOWN.to_string(),
                    matched: false,
                    record,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(roll: &str, department: &str) -> AttendanceRecord {
        AttendanceRecord::empty(
            RollNumber::parse(roll).unwrap(),
            department,
            Period::new(2025, 3).unwrap(),
            Utc::now(),
        )
    }

    fn entry(roll: &str, name: &str, department: &str) -> RosterEntry {
        RosterEntry {
            roll_no: roll.to_string(),
            name: name.to_string(),
            department: department.to_string(),
            semester: "4".to_string(),
        }
    }

    #[test]
    fn test_normalize_roll() {
        assert_eq!(normalize_roll(" 00123 "), "123");
        assert_eq!(normalize_roll("CS-12"), "cs-12");
    }

    #[test]
    fn test_matched_rows_take_roster_identity() {
        let rows = match_roster(
            vec![record("123", "cse")],
            &[entry("00123", " Asha Rao ", "CSE-A")],
        );

        assert_eq!(rows.len(), 1);
        assert!(rows[0].matched);
        assert_eq!(rows[0].name, "Asha Rao");
        assert_eq!(rows[0].department, "CSE-A");
        assert_eq!(rows[0].semester, "4");
    }

    #[test]
    fn test_unmatched_rows_are_kept_with_placeholders() {
        let rows = match_roster(
            vec![record("1", "cse"), record("2", "ece")],
            &[entry("1", "A", "CSE")],
        );

        assert_eq!(rows.len(), 2);
        assert!(!rows[1].matched);
        assert_eq!(rows[1].name, UNKNOWN);
        assert_eq!(rows[1].semester, UNKNOWN);
        assert_eq!(rows[1].department, "ece");
    }

    #[test]
    fn test_first_roster_entry_wins() {
        let rows = match_roster(
            vec![record("7", "cse")],
            &[entry("7", "First", "CSE"), entry("007", "Second", "CSE")],
        );
        assert_eq!(rows[0].name, "First");
    }
}
