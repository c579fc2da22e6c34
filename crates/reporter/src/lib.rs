pub mod error;
pub mod export;
pub mod roster;
pub mod traits;

pub use error::{ReporterError, Result};
pub use export::{AttendanceWorkbook, default_file_name};
pub use roster::{CsvFileSource, SpreadsheetSource, parse_roster};
pub use traits::RosterSource;
