use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Receipt for a settled fine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentReceipt {
    pub receipt_id: Uuid,
    pub roll_number: String,
    pub department: String,
    pub amount_paid: i64,
    /// Total paid after this payment
    pub paid_fine: i64,
    pub unpaid_fine: i64,
    pub paid_at: DateTime<Utc>,
}
