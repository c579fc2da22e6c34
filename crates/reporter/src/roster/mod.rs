mod file;
mod spreadsheet;

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use storage::dto::report::RosterEntry;

use crate::error::{ReporterError, Result};

pub use file::CsvFileSource;
pub use spreadsheet::{SpreadsheetSource, export_url};

const ROLL_NO: &str = "rollno";
const NAME: &str = "name";
const DEPT: &str = "dept";
const SEMESTER: &str = "semister";

struct Columns {
    roll_no: usize,
    name: usize,
    department: usize,
    semester: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        };

        match (find(ROLL_NO), find(NAME), find(DEPT), find(SEMESTER)) {
            (Some(roll_no), Some(name), Some(department), Some(semester)) => Ok(Self {
                roll_no,
                name,
                department,
                semester,
            }),
            _ => Err(ReporterError::MissingColumns(
                headers.iter().map(str::to_string).collect(),
            )),
        }
    }

    fn entry(&self, row: &StringRecord) -> Option<RosterEntry> {
        let field = |index: usize| {
            row.get(index)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Some(RosterEntry {
            roll_no: field(self.roll_no)?,
            name: field(self.name)?,
            department: field(self.department)?,
            semester: field(self.semester)?,
        })
    }
}

/// Parses a roster exported as CSV.
///
/// The first row holds the headers `RollNo`, `Name`, `Dept` and `Semister` in any
/// order and case. Rows with any of those cells empty are skipped.
pub fn parse_roster<R: Read>(reader: R) -> Result<Vec<RosterEntry>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = rdr.records();
    let headers = match records.next() {
        Some(headers) => headers?,
        None => return Err(ReporterError::EmptyRoster),
    };
    let columns = Columns::locate(&headers)?;

    let mut entries = Vec::new();
    for (line, result) in records.enumerate() {
        let row = result?;
        match columns.entry(&row) {
            Some(entry) => entries.push(entry),
            None => tracing::debug!("Skipping roster row {} with missing data", line + 2),
        }
    }

    if entries.is_empty() {
        return Err(ReporterError::EmptyRoster);
    }

    tracing::debug!("Parsed {} roster rows", entries.len());
    Ok(entries)
}
