pub mod attendance_record;
pub mod period;
pub mod roll_number;

pub use attendance_record::{AttendanceRecord, StaffContext, mark_label};
pub use period::{Period, local_date};
pub use roll_number::RollNumber;
