use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Database model for expenses table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseModel {
    pub id: i64,       // Assigned by the store on insert
    pub owner_id: i64, // Owning user's id
    pub amount: f64,
    pub description: String,
    pub occurred_at: DateTime<Utc>, // When the money was spent; filtering uses this
    pub created_at: DateTime<Utc>,
}

/// An expense that has not been stored yet
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub owner_id: i64,
    pub amount: f64,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl NewExpense {
    /// Timestamps are kept at microsecond precision so every store round-trips them
    pub fn new(
        owner_id: i64,
        amount: f64,
        description: String,
        occurred_at: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now().trunc_subsecs(6);
        Self {
            owner_id,
            amount,
            description,
            occurred_at: occurred_at.map_or(now, |ts| ts.trunc_subsecs(6)),
            created_at: now,
        }
    }

    /// Attaches the store-assigned id
    pub fn into_model(self, id: i64) -> ExpenseModel {
        ExpenseModel {
            id,
            owner_id: self.owner_id,
            amount: self.amount,
            description: self.description,
            occurred_at: self.occurred_at,
            created_at: self.created_at,
        }
    }
}

/// Partial update; `None` fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl ExpenseChanges {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.description.is_none() && self.occurred_at.is_none()
    }

    pub fn apply_to(&self, expense: &mut ExpenseModel) {
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(description) = &self.description {
            expense.description = description.clone();
        }
        if let Some(occurred_at) = self.occurred_at {
            expense.occurred_at = occurred_at.trunc_subsecs(6);
        }
    }
}
