use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::{
    models::{ExpenseChanges, ExpenseModel, NewExpense},
    range::TimeWindow,
};
use crate::db::{from_micros, to_micros};
use crate::shared::AppError;

/// Trait for expense repository operations.
/// Mutations take the owner id so the ownership check and the write are one step.
#[async_trait]
pub trait ExpenseRepository {
    async fn insert(&self, expense: NewExpense) -> Result<ExpenseModel, AppError>;
    async fn find_by_id(&self, expense_id: i64) -> Result<Option<ExpenseModel>, AppError>;

    /// Owner's expenses inside `window`, ascending by timestamp then id
    async fn find_by_owner_and_range(
        &self,
        owner_id: i64,
        window: &TimeWindow,
    ) -> Result<Vec<ExpenseModel>, AppError>;

    /// Returns `None` when no expense with that id belongs to `owner_id`
    async fn update_fields(
        &self,
        owner_id: i64,
        expense_id: i64,
        changes: &ExpenseChanges,
    ) -> Result<Option<ExpenseModel>, AppError>;

    /// Returns `false` when no expense with that id belongs to `owner_id`
    async fn delete_by_id(&self, owner_id: i64, expense_id: i64) -> Result<bool, AppError>;
}

#[derive(Default)]
struct ExpenseTable {
    next_id: i64,
    rows: BTreeMap<i64, ExpenseModel>,
}

/// In-memory implementation of ExpenseRepository for development and testing
pub struct InMemoryExpenseRepository {
    expenses: RwLock<ExpenseTable>,
}

impl Default for InMemoryExpenseRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryExpenseRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            expenses: RwLock::new(ExpenseTable::default()),
        }
    }

    /// Returns the current number of expenses across all users
    pub async fn expense_count(&self) -> usize {
        self.expenses.read().await.rows.len()
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryExpenseRepository {
    #[instrument(skip(self, expense), fields(owner_id = expense.owner_id))]
    async fn insert(&self, expense: NewExpense) -> Result<ExpenseModel, AppError> {
        debug!("Creating expense in memory");

        let mut expenses = self.expenses.write().await;
        expenses.next_id += 1;
        let model = expense.into_model(expenses.next_id);
        expenses.rows.insert(model.id, model.clone());

        debug!(expense_id = model.id, "Expense created successfully in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, expense_id: i64) -> Result<Option<ExpenseModel>, AppError> {
        debug!("Fetching expense from memory");

        let expenses = self.expenses.read().await;
        Ok(expenses.rows.get(&expense_id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_owner_and_range(
        &self,
        owner_id: i64,
        window: &TimeWindow,
    ) -> Result<Vec<ExpenseModel>, AppError> {
        debug!("Listing expenses in memory");

        let expenses = self.expenses.read().await;
        let mut matching: Vec<ExpenseModel> = expenses
            .rows
            .values()
            .filter(|e| e.owner_id == owner_id && window.contains(&e.occurred_at))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then(a.id.cmp(&b.id)));

        debug!(count = matching.len(), "Expenses listed from memory");
        Ok(matching)
    }

    #[instrument(skip(self, changes))]
    async fn update_fields(
        &self,
        owner_id: i64,
        expense_id: i64,
        changes: &ExpenseChanges,
    ) -> Result<Option<ExpenseModel>, AppError> {
        debug!("Updating expense in memory");

        let mut expenses = self.expenses.write().await;
        let expense = match expenses.rows.get_mut(&expense_id) {
            Some(expense) if expense.owner_id == owner_id => expense,
            _ => {
                debug!("Expense not found for owner in memory");
                return Ok(None);
            }
        };

        changes.apply_to(expense);

        debug!("Expense updated successfully in memory");
        Ok(Some(expense.clone()))
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, owner_id: i64, expense_id: i64) -> Result<bool, AppError> {
        debug!("Deleting expense from memory");

        let mut expenses = self.expenses.write().await;
        let owned = matches!(
            expenses.rows.get(&expense_id),
            Some(expense) if expense.owner_id == owner_id
        );
        if !owned {
            debug!("Expense not found for owner in memory");
            return Ok(false);
        }

        expenses.rows.remove(&expense_id);
        debug!("Expense deleted successfully from memory");
        Ok(true)
    }
}

/// SQLite implementation of expense repository
pub struct SqliteExpenseRepository {
    pool: SqlitePool,
}

impl SqliteExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const EXPENSE_COLUMNS: &str = "id, owner_id, amount, description, occurred_at, created_at";

fn expense_from_row(row: &SqliteRow) -> Result<ExpenseModel, AppError> {
    Ok(ExpenseModel {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        amount: row.try_get("amount")?,
        description: row.try_get("description")?,
        occurred_at: from_micros(row.try_get("occurred_at")?)?,
        created_at: from_micros(row.try_get("created_at")?)?,
    })
}

fn db_error(e: sqlx::Error) -> AppError {
    warn!(error = %e, "Expense query failed");
    AppError::DatabaseError(e.to_string())
}

#[async_trait]
impl ExpenseRepository for SqliteExpenseRepository {
    #[instrument(skip(self, expense), fields(owner_id = expense.owner_id))]
    async fn insert(&self, expense: NewExpense) -> Result<ExpenseModel, AppError> {
        debug!("Creating expense in database");

        let result = sqlx::query(
            "INSERT INTO expenses (owner_id, amount, description, occurred_at, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(expense.owner_id)
        .bind(expense.amount)
        .bind(&expense.description)
        .bind(to_micros(&expense.occurred_at))
        .bind(to_micros(&expense.created_at))
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let model = expense.into_model(result.last_insert_rowid());
        debug!(expense_id = model.id, "Expense created successfully in database");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, expense_id: i64) -> Result<Option<ExpenseModel>, AppError> {
        debug!("Fetching expense from database");

        let query = format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS);
        let row = sqlx::query(&query)
            .bind(expense_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.as_ref().map(expense_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_owner_and_range(
        &self,
        owner_id: i64,
        window: &TimeWindow,
    ) -> Result<Vec<ExpenseModel>, AppError> {
        debug!("Listing expenses from database");

        let start = window.start.as_ref().map_or(i64::MIN, to_micros);
        let end = window.end.as_ref().map_or(i64::MAX, to_micros);

        let query = format!(
            "SELECT {} FROM expenses \
             WHERE owner_id = ? AND occurred_at >= ? AND occurred_at <= ? \
             ORDER BY occurred_at ASC, id ASC",
            EXPENSE_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(owner_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let expenses = rows
            .iter()
            .map(expense_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = expenses.len(), "Expenses listed from database");
        Ok(expenses)
    }

    #[instrument(skip(self, changes))]
    async fn update_fields(
        &self,
        owner_id: i64,
        expense_id: i64,
        changes: &ExpenseChanges,
    ) -> Result<Option<ExpenseModel>, AppError> {
        debug!("Updating expense in database");

        let query = format!(
            "UPDATE expenses SET \
             amount = COALESCE(?, amount), \
             description = COALESCE(?, description), \
             occurred_at = COALESCE(?, occurred_at) \
             WHERE id = ? AND owner_id = ? \
             RETURNING {}",
            EXPENSE_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(changes.amount)
            .bind(changes.description.as_deref())
            .bind(changes.occurred_at.as_ref().map(to_micros))
            .bind(expense_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        if row.is_none() {
            debug!("Expense not found for owner in database");
        }

        row.as_ref().map(expense_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, owner_id: i64, expense_id: i64) -> Result<bool, AppError> {
        debug!("Deleting expense from database");

        let result = sqlx::query("DELETE FROM expenses WHERE id = ? AND owner_id = ?")
            .bind(expense_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
