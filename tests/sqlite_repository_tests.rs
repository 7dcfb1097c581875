use axum::http::StatusCode;
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

use expense_tracker::{
    auth::models::NewUser,
    expense::{
        models::{ExpenseChanges, NewExpense},
        TimeWindow,
    },
    AppError, Database, ExpenseRepository, SqliteExpenseRepository, SqliteUserRepository,
    UserRepository,
};

mod utils;

use utils::*;

async fn migrated_database() -> Database {
    let database = Database::in_memory().await.unwrap();
    database.migrate().await.unwrap();
    database
}

async fn stored_user(repo: &SqliteUserRepository, username: &str) -> i64 {
    repo.insert(NewUser::new(username.to_string(), "hash".to_string()))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_user_round_trip_and_duplicate() {
    let database = migrated_database().await;
    let users = SqliteUserRepository::new(database.pool());

    let created = users
        .insert(NewUser::new("alice".to_string(), "phc-hash".to_string()))
        .await
        .unwrap();

    let found = users.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(found, created);
    assert_eq!(found.password_hash, "phc-hash");

    let duplicate = users
        .insert(NewUser::new("alice".to_string(), "other".to_string()))
        .await;
    assert!(matches!(duplicate, Err(AppError::DuplicateHandle)));

    assert!(users.find_by_username("bob").await.unwrap().is_none());
}

#[tokio::test]
async fn test_expense_round_trip_keeps_micros() {
    let database = migrated_database().await;
    let users = SqliteUserRepository::new(database.pool());
    let expenses = SqliteExpenseRepository::new(database.pool());
    let owner = stored_user(&users, "alice").await;

    let occurred_at =
        Utc.with_ymd_and_hms(2024, 4, 2, 8, 15, 0).unwrap() + Duration::microseconds(123_456);
    let created = expenses
        .insert(NewExpense::new(
            owner,
            42.25,
            "train".to_string(),
            Some(occurred_at),
        ))
        .await
        .unwrap();

    let fetched = expenses.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.occurred_at, occurred_at);

    assert!(expenses.find_by_id(created.id + 100).await.unwrap().is_none());
}

#[tokio::test]
async fn test_range_query_scoped_and_ordered() {
    let database = migrated_database().await;
    let users = SqliteUserRepository::new(database.pool());
    let expenses = SqliteExpenseRepository::new(database.pool());
    let alice = stored_user(&users, "alice").await;
    let bob = stored_user(&users, "bob").await;

    let base = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
    for (owner, amount, offset_days) in [
        (alice, 3.0, 2),
        (alice, 1.0, 0),
        (alice, 2.0, 0),
        (alice, 9.0, 30),
        (bob, 5.0, 0),
    ] {
        expenses
            .insert(NewExpense::new(
                owner,
                amount,
                format!("{}", amount),
                Some(base + Duration::days(offset_days)),
            ))
            .await
            .unwrap();
    }

    let window = TimeWindow {
        start: Some(base),
        end: Some(base + Duration::days(2)),
    };
    let listed = expenses
        .find_by_owner_and_range(alice, &window)
        .await
        .unwrap();
    let amounts: Vec<f64> = listed.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![1.0, 2.0, 3.0]);
    assert!(listed.iter().all(|e| e.owner_id == alice));

    let everything = expenses
        .find_by_owner_and_range(alice, &TimeWindow::default())
        .await
        .unwrap();
    assert_eq!(everything.len(), 4);
}

#[tokio::test]
async fn test_update_and_delete_require_owner() {
    let database = migrated_database().await;
    let users = SqliteUserRepository::new(database.pool());
    let expenses = SqliteExpenseRepository::new(database.pool());
    let alice = stored_user(&users, "alice").await;
    let bob = stored_user(&users, "bob").await;

    let expense = expenses
        .insert(NewExpense::new(alice, 10.0, "books".to_string(), None))
        .await
        .unwrap();

    let changes = ExpenseChanges {
        amount: Some(12.0),
        ..ExpenseChanges::default()
    };
    assert!(expenses
        .update_fields(bob, expense.id, &changes)
        .await
        .unwrap()
        .is_none());
    assert!(!expenses.delete_by_id(bob, expense.id).await.unwrap());

    let updated = expenses
        .update_fields(alice, expense.id, &changes)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.amount, 12.0);
    assert_eq!(updated.description, "books");
    assert_eq!(updated.occurred_at, expense.occurred_at);

    assert!(expenses.delete_by_id(alice, expense.id).await.unwrap());
    assert!(!expenses.delete_by_id(alice, expense.id).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_updates_to_same_expense() {
    let database = migrated_database().await;
    let users = SqliteUserRepository::new(database.pool());
    let expenses = Arc::new(SqliteExpenseRepository::new(database.pool()));
    let alice = stored_user(&users, "alice").await;

    let expense = expenses
        .insert(NewExpense::new(alice, 0.0, "start".to_string(), None))
        .await
        .unwrap();
    let amounts: Vec<f64> = (1..=8).map(f64::from).collect();

    let handles: Vec<_> = amounts
        .iter()
        .map(|&amount| {
            let expenses = Arc::clone(&expenses);
            tokio::spawn(async move {
                let changes = ExpenseChanges {
                    amount: Some(amount),
                    description: Some(format!("writer {}", amount)),
                    ..ExpenseChanges::default()
                };
                expenses.update_fields(alice, expense.id, &changes).await
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().unwrap().is_some());
    }

    let last = expenses.find_by_id(expense.id).await.unwrap().unwrap();
    assert!(amounts.contains(&last.amount));
    assert_eq!(last.description, format!("writer {}", last.amount));

    let all = expenses
        .find_by_owner_and_range(alice, &TimeWindow::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_http_workflow_on_sqlite() {
    let app = TestAppBuilder::new().with_sqlite().build().await;
    let alice = app.signed_in("alice").await;
    let bob = app.signed_in("bob").await;

    let id = app
        .add_expense_at(&alice, 20.0, "dinner", "2024-05-01T19:30:00Z")
        .await;
    app.add_expense_at(&alice, 4.5, "coffee", "2024-05-02T08:00:00Z")
        .await;

    assert_eq!(app.get_expense(&bob, id).await.status, StatusCode::NOT_FOUND);

    let summary = app
        .summary(&alice, "range=custom&start=2024-05-01&end=2024-05-01")
        .await;
    assert_eq!(summary.body["count"], 1);
    assert_eq!(summary.body["total_amount"], 20.0);

    assert_eq!(
        app.register("alice", "again").await.status,
        StatusCode::CONFLICT
    );

    if let Some(database) = &app.database {
        database.close().await;
    }
}
