pub mod fine_ledger;
pub mod late_comers;
pub mod recorder;
pub mod report_match;

pub use recorder::{AttendanceRecorder, MarkOutcome};
