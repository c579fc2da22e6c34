use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::RollNumber;
use crate::services::MarkOutcome;
use crate::services::fine_ledger::is_fined;

/// Request payload for marking a student late
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct MarkRequest {
    #[validate(
        length(min = 1, max = 20, message = "Roll number is required"),
        custom(function = "validate_roll_number")
    )]
    #[schema(example = "12345")]
    pub roll_number: String,
}

/// Response after a late mark was recorded
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkResponse {
    pub roll_number: String,
    pub department: String,
    pub count: u32,
    /// Label of this mark, e.g. `L4`
    pub label: String,
    pub unpaid_fine: i64,
    /// The student is past the free marks and must hand in their ID
    pub collect_id: bool,
    pub message: String,
    pub marked_at: DateTime<Utc>,
}

fn validate_roll_number(roll_number: &str) -> Result<(), validator::ValidationError> {
    RollNumber::parse(roll_number)
        .map(|_| ())
        .map_err(|_| validator::ValidationError::new("invalid_roll_number"))
}

impl From<MarkOutcome> for MarkResponse {
    fn from(outcome: MarkOutcome) -> Self {
        let collect_id = is_fined(outcome.count);
        let message = if collect_id {
            format!(
                "Collect ID! Roll number {} has been late {} times. Fine amount: ₹{}",
                outcome.roll_number, outcome.count, outcome.unpaid_fine
            )
        } else {
            format!(
                "Roll number {} marked as late ({}/3)",
                outcome.roll_number, outcome.count
            )
        };

        Self {
            roll_number: outcome.roll_number.to_string(),
            department: outcome.department,
            count: outcome.count,
            label: outcome.label,
            unpaid_fine: outcome.unpaid_fine,
            collect_id,
            message,
            marked_at: outcome.marked_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let ok = MarkRequest {
            roll_number: "12345".to_string(),
        };
        assert!(ok.validate().is_ok());

        for bad in ["", "0", "12ab", "123456789012345678901"] {
            let req = MarkRequest {
                roll_number: bad.to_string(),
            };
            assert!(req.validate().is_err(), "expected '{}' to fail", bad);
        }
    }

    #[test]
    fn test_response_message() {
        let outcome = |count, unpaid_fine| MarkOutcome {
            roll_number: RollNumber::parse("12345").unwrap(),
            department: "cse".to_string(),
            count,
            label: format!("L{}", count),
            unpaid_fine,
            marked_at: Utc::now(),
        };

        let free = MarkResponse::from(outcome(2, 0));
        assert!(!free.collect_id);
        assert_eq!(free.message, "Roll number 12345 marked as late (2/3)");

        let fined = MarkResponse::from(outcome(4, 50));
        assert!(fined.collect_id);
        assert!(fined.message.contains("₹50"));
    }
}
