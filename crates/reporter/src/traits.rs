use storage::dto::report::RosterEntry;

use crate::Result;

/// Where the student roster of a report comes from
#[async_trait::async_trait]
pub trait RosterSource: Send + Sync {
    async fn load(&self) -> Result<Vec<RosterEntry>>;

    /// Human readable origin, used in logs
    fn describe(&self) -> String;
}
