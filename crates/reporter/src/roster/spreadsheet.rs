use async_trait::async_trait;
use storage::dto::report::RosterEntry;

use super::parse_roster;
use crate::error::{ReporterError, Result};
use crate::traits::RosterSource;

const SHEETS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

/// Turns a spreadsheet share link into its CSV export URL. The link must
/// contain a `/d/<id>` document segment.
pub fn export_url(share_link: &str) -> Result<String> {
    let invalid = || ReporterError::InvalidSpreadsheetUrl(share_link.to_string());

    let (_, rest) = share_link.trim().split_once("/d/").ok_or_else(invalid)?;
    let id = rest
        .split(['/', '?', '#'])
        .next()
        .filter(|id| !id.is_empty())
        .ok_or_else(invalid)?;

    Ok(format!("{}/{}/export?format=csv", SHEETS_BASE_URL, id))
}

/// Roster published as an online spreadsheet
pub struct SpreadsheetSource {
    url: String,
    client: reqwest::Client,
}

impl SpreadsheetSource {
    pub fn new(share_link: &str) -> Result<Self> {
        Ok(Self {
            url: export_url(share_link)?,
            client: reqwest::Client::builder()
                .user_agent(concat!("latecomers-report/", env!("CARGO_PKG_VERSION")))
                .build()?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RosterSource for SpreadsheetSource {
    async fn load(&self) -> Result<Vec<RosterEntry>> {
        tracing::info!("Fetching roster from: {}", self.url);

        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let body = response.bytes().await?;

        parse_roster(body.as_ref())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_link_becomes_export_url() {
        let link = "https://docs.google.com/spreadsheets/d/1ALQWqADE8E3DBw/edit?usp=sharing&rtpof=true";
        assert_eq!(
            export_url(link).unwrap(),
            "https://docs.google.com/spreadsheets/d/1ALQWqADE8E3DBw/export?format=csv"
        );

        assert_eq!(
            export_url("https://docs.google.com/spreadsheets/d/abc").unwrap(),
            "https://docs.google.com/spreadsheets/d/abc/export?format=csv"
        );
    }

    #[test]
    fn test_source_fetches_the_export_url() {
        let source =
            SpreadsheetSource::new("https://docs.google.com/spreadsheets/d/abc/edit").unwrap();
        assert_eq!(
            source.url(),
            "https://docs.google.com/spreadsheets/d/abc/export?format=csv"
        );
        assert_eq!(source.describe(), source.url());

        assert!(SpreadsheetSource::new("not a link").is_err());
    }

    #[test]
    fn test_link_without_document_id_is_rejected() {
        for link in [
            "https://example.com/roster.csv",
            "https://docs.google.com/spreadsheets/d/",
            "https://docs.google.com/spreadsheets/d/?usp=sharing",
        ] {
            assert!(
                matches!(export_url(link), Err(ReporterError::InvalidSpreadsheetUrl(_))),
                "expected '{}' to be rejected",
                link
            );
        }
    }
}
