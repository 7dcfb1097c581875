// Public API - what other modules can use
pub use handlers::{
    add_expense, delete_expense, expense_summary, get_expense, list_expenses, update_expense,
};
pub use range::{ExpenseRange, TimeWindow};
pub use service::{ExpenseService, ExpenseSummary};
pub use types::{CreateExpenseRequest, ExpenseResponse, RangeQuery, UpdateExpenseRequest};

// Internal modules
mod handlers;
pub mod models;
pub mod range;
pub mod repository;
mod service;
mod types;
