use std::path::Path;

use chrono::{DateTime, FixedOffset, Utc};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook};
use storage::{
    dto::report::ReportRow,
    models::{Period, mark_label},
};

use crate::error::{ReporterError, Result};

pub const SHEET_NAME: &str = "Attendance";

/// The sheet always shows at least this many mark columns
pub const MIN_MARK_COLUMNS: u32 = 8;

const COLUMN_WIDTH: f64 = 15.0;
const MISSING: &str = "-";
const TIMESTAMP_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

pub fn default_file_name(period: Period) -> String {
    format!("Attendance_{}-{}.xlsx", period.month(), period.year())
}

pub fn format_money(amount: i64) -> String {
    format!("₹{}", amount)
}

pub fn format_timestamp(at: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
    match at {
        Some(at) => at.with_timezone(&offset).format(TIMESTAMP_FORMAT).to_string(),
        None => MISSING.to_string(),
    }
}

/// One month of matched records laid out as the `Attendance` sheet.
///
/// Columns are `RollNo, Name, Dept, Semister`, one column per mark label up to
/// the largest count in the month, then `Paid Fine, Unpaid Fine, Paid at`.
pub struct AttendanceWorkbook<'a> {
    rows: &'a [ReportRow],
    offset: FixedOffset,
    mark_columns: u32,
}

impl<'a> AttendanceWorkbook<'a> {
    /// `offset` is used to render timestamps in local time
    pub fn new(rows: &'a [ReportRow], offset: FixedOffset) -> Self {
        let mark_columns = rows
            .iter()
            .map(|row| row.record.count)
            .max()
            .unwrap_or(0)
            .max(MIN_MARK_COLUMNS);

        Self {
            rows,
            offset,
            mark_columns,
        }
    }

    pub fn mark_columns(&self) -> u32 {
        self.mark_columns
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = ["RollNo", "Name", "Dept", "Semister"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        headers.extend((1..=self.mark_columns).map(mark_label));
        headers.extend(
            ["Paid Fine", "Unpaid Fine", "Paid at"]
                .iter()
                .map(|h| h.to_string()),
        );
        headers
    }

    pub fn cells(&self, row: &ReportRow) -> Vec<String> {
        let record = &row.record;

        let mut cells = vec![
            row.roll_number.clone(),
            row.name.clone(),
            row.department.clone(),
            row.semester.clone(),
        ];
        cells.extend(
            (1..=self.mark_columns).map(|n| format_timestamp(record.timestamp_of(n), self.offset)),
        );
        cells.push(format_money(record.paid_fine));
        cells.push(format_money(record.unpaid_fine));
        cells.push(format_timestamp(record.paid_at, self.offset));
        cells
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let headers = self.headers();
        if u16::try_from(headers.len()).is_err() {
            return Err(ReporterError::TooManyColumns(self.mark_columns));
        }

        let header_format = Format::new()
            .set_bold()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center);
        let cell_format = Format::new().set_border(FormatBorder::Thin);

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (col, header) in headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
            worksheet.set_column_width(col as u16, COLUMN_WIDTH)?;
        }

        for (index, row) in self.rows.iter().enumerate() {
            let sheet_row = index as u32 + 1;
            for (col, value) in self.cells(row).iter().enumerate() {
                worksheet.write_string_with_format(sheet_row, col as u16, value, &cell_format)?;
            }
        }

        workbook.save(path)?;

        tracing::info!(
            "Wrote {} rows with {} mark columns to {}",
            self.rows.len(),
            self.mark_columns,
            path.display()
        );
        Ok(())
    }
}
