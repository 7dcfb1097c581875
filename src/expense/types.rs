use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{ExpenseChanges, ExpenseModel};

/// Request payload for adding an expense
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub amount: f64,
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Request payload for updating an expense; omitted fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExpenseRequest {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<UpdateExpenseRequest> for ExpenseChanges {
    fn from(request: UpdateExpenseRequest) -> Self {
        Self {
            amount: request.amount,
            description: request.description,
            occurred_at: request.timestamp,
        }
    }
}

/// Query string for listing and summarising: `?range=custom&start=...&end=...`
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Response for a single expense
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ExpenseResponse {
    pub id: i64,
    pub amount: f64,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<ExpenseModel> for ExpenseResponse {
    fn from(expense: ExpenseModel) -> Self {
        Self {
            id: expense.id,
            amount: expense.amount,
            description: expense.description,
            timestamp: expense.occurred_at,
            created_at: expense.created_at,
        }
    }
}
