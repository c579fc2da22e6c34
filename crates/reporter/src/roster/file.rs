use std::path::PathBuf;

use async_trait::async_trait;
use storage::dto::report::RosterEntry;

use super::parse_roster;
use crate::Result;
use crate::traits::RosterSource;

/// Roster stored in a local CSV file
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RosterSource for CsvFileSource {
    async fn load(&self) -> Result<Vec<RosterEntry>> {
        let content = tokio::fs::read(&self.path).await?;
        parse_roster(content.as_slice())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
