use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Invalid roll number: {0}")]
    InvalidRollNumber(String),

    #[error("Attendance already marked for roll number {roll_number} on {date}")]
    AlreadyMarkedToday { roll_number: String, date: NaiveDate },

    #[error("Record was modified concurrently, please retry")]
    Conflict,

    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// Serialization failures reported by PostgreSQL are conflicts as well
    pub fn is_conflict(&self) -> bool {
        match self {
            StorageError::Conflict => true,
            StorageError::Database(sqlx::Error::Database(e)) => {
                matches!(e.code().as_deref(), Some("40001") | Some("40P01"))
            }
            _ => false,
        }
    }
}
