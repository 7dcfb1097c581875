use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    range::ExpenseRange,
    service::{ExpenseService, ExpenseSummary},
    types::{CreateExpenseRequest, ExpenseResponse, RangeQuery, UpdateExpenseRequest},
};
use crate::{
    auth::AuthenticatedUser,
    shared::{AppError, AppJson, AppState},
};

fn service(state: &AppState) -> ExpenseService {
    ExpenseService::new(Arc::clone(&state.expense_repository))
}

fn parse_range(query: &RangeQuery) -> Result<ExpenseRange, AppError> {
    ExpenseRange::parse(
        query.range.as_deref(),
        query.start.as_deref(),
        query.end.as_deref(),
    )
}

/// HTTP handler for adding an expense
///
/// POST /expenses
#[instrument(name = "add_expense", skip(state, user), fields(user_id = user.id))]
pub async fn add_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    AppJson(request): AppJson<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ExpenseResponse>), AppError> {
    let expense = service(&state)
        .add(&user, request.amount, request.description, request.timestamp)
        .await?;

    Ok((StatusCode::CREATED, Json(ExpenseResponse::from(expense))))
}

/// HTTP handler for fetching one expense
///
/// GET /expenses/:id
#[instrument(name = "get_expense", skip(state, user), fields(user_id = user.id))]
pub async fn get_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(expense_id): Path<i64>,
) -> Result<Json<ExpenseResponse>, AppError> {
    let expense = service(&state).get(&user, expense_id).await?;
    Ok(Json(ExpenseResponse::from(expense)))
}

/// HTTP handler for updating an expense
///
/// PUT /expenses/:id
#[instrument(name = "update_expense", skip(state, user), fields(user_id = user.id))]
pub async fn update_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(expense_id): Path<i64>,
    AppJson(request): AppJson<UpdateExpenseRequest>,
) -> Result<Json<ExpenseResponse>, AppError> {
    let expense = service(&state)
        .update(&user, expense_id, request.into())
        .await?;

    Ok(Json(ExpenseResponse::from(expense)))
}

/// HTTP handler for deleting an expense
///
/// DELETE /expenses/:id
#[instrument(name = "delete_expense", skip(state, user), fields(user_id = user.id))]
pub async fn delete_expense(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(expense_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    service(&state).delete(&user, expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// HTTP handler for listing expenses
///
/// GET /expenses?range=last_week
#[instrument(name = "list_expenses", skip(state, user), fields(user_id = user.id))]
pub async fn list_expenses(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<ExpenseResponse>>, AppError> {
    let range = parse_range(&query)?;
    let expenses = service(&state).list(&user, &range).await?;

    info!(expense_count = expenses.len(), "Expenses listed successfully");

    Ok(Json(
        expenses.into_iter().map(ExpenseResponse::from).collect(),
    ))
}

/// HTTP handler for the count/total summary
///
/// GET /expenses/summary?range=last_month
#[instrument(name = "expense_summary", skip(state, user), fields(user_id = user.id))]
pub async fn expense_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ExpenseSummary>, AppError> {
    let range = parse_range(&query)?;
    let summary = service(&state).aggregate(&user, &range).await?;
    Ok(Json(summary))
}
