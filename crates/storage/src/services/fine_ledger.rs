//! Fine schedule for late marks.
//!
//! The outstanding amount is always recomputed from the mark count and what has
//! already been paid, never accumulated on its own.

/// Marks that carry no fine
pub const FREE_MARKS: u32 = 3;

/// Fine per mark beyond [`FREE_MARKS`], in whole currency units
pub const UNIT_FINE: i64 = 50;

/// Total fine accrued for `count` marks, ignoring payments
pub fn total_accrued(count: u32) -> i64 {
    i64::from(count.saturating_sub(FREE_MARKS)) * UNIT_FINE
}

/// Amount still owed after `already_paid` has been settled; never negative
pub fn outstanding_fine(count: u32, already_paid: i64) -> i64 {
    if count <= FREE_MARKS {
        return 0;
    }

    (total_accrued(count) - already_paid).max(0)
}

/// Whether a mark with this sequence number is fined
pub fn is_fined(count: u32) -> bool {
    count > FREE_MARKS
}
