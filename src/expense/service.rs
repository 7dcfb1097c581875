use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{ExpenseChanges, ExpenseModel, NewExpense},
    range::ExpenseRange,
    repository::ExpenseRepository,
};
use crate::{auth::AuthenticatedUser, shared::AppError};

/// Count and sum over a filtered set of expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSummary {
    pub count: usize,
    pub total_amount: f64,
}

/// Service for handling expense business logic.
/// Every operation is scoped to the calling user.
pub struct ExpenseService {
    repository: Arc<dyn ExpenseRepository + Send + Sync>,
}

fn validate_amount(amount: f64) -> Result<(), AppError> {
    if !amount.is_finite() {
        return Err(AppError::InvalidAmount(format!(
            "amount must be a finite number, got {}",
            amount
        )));
    }
    if amount < 0.0 {
        return Err(AppError::InvalidAmount(format!(
            "amount must not be negative, got {}",
            amount
        )));
    }
    Ok(())
}

fn not_found(expense_id: i64) -> AppError {
    AppError::NotFound(format!("Expense {} not found", expense_id))
}

impl ExpenseService {
    pub fn new(repository: Arc<dyn ExpenseRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Records a new expense for `user`; the timestamp defaults to now
    #[instrument(skip(self, user, description), fields(user_id = user.id))]
    pub async fn add(
        &self,
        user: &AuthenticatedUser,
        amount: f64,
        description: String,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<ExpenseModel, AppError> {
        validate_amount(amount)?;

        let expense = self
            .repository
            .insert(NewExpense::new(user.id, amount, description, timestamp))
            .await?;

        info!(expense_id = expense.id, "Expense added");
        Ok(expense)
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn get(&self, user: &AuthenticatedUser, expense_id: i64) -> Result<ExpenseModel, AppError> {
        match self.repository.find_by_id(expense_id).await? {
            Some(expense) if expense.owner_id == user.id => Ok(expense),
            Some(_) => {
                warn!(expense_id, "Expense belongs to another user");
                Err(not_found(expense_id))
            }
            None => Err(not_found(expense_id)),
        }
    }

    /// Replaces only the supplied fields of one of `user`'s expenses
    #[instrument(skip(self, user, changes), fields(user_id = user.id))]
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        expense_id: i64,
        changes: ExpenseChanges,
    ) -> Result<ExpenseModel, AppError> {
        if let Some(amount) = changes.amount {
            validate_amount(amount)?;
        }

        let updated = self
            .repository
            .update_fields(user.id, expense_id, &changes)
            .await?
            .ok_or_else(|| not_found(expense_id))?;

        info!(expense_id, "Expense updated");
        Ok(updated)
    }

    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn delete(&self, user: &AuthenticatedUser, expense_id: i64) -> Result<(), AppError> {
        if !self.repository.delete_by_id(user.id, expense_id).await? {
            return Err(not_found(expense_id));
        }

        info!(expense_id, "Expense deleted");
        Ok(())
    }

    /// `user`'s expenses inside `range`, oldest first
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        range: &ExpenseRange,
    ) -> Result<Vec<ExpenseModel>, AppError> {
        let window = range.resolve(Utc::now())?;
        let expenses = self
            .repository
            .find_by_owner_and_range(user.id, &window)
            .await?;

        debug!(count = expenses.len(), "Expenses listed");
        Ok(expenses)
    }

    /// Count and total over the same set `list` returns
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn aggregate(
        &self,
        user: &AuthenticatedUser,
        range: &ExpenseRange,
    ) -> Result<ExpenseSummary, AppError> {
        let expenses = self.list(user, range).await?;

        Ok(ExpenseSummary {
            count: expenses.len(),
            total_amount: expenses.iter().map(|e| e.amount).sum(),
        })
    }
}
