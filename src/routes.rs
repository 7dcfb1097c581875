use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{auth, expense, shared::AppState};

async fn health() -> &'static str {
    "ok"
}

/// Builds the full HTTP surface. Everything under `/expenses` requires a bearer token.
pub fn build_router(app_state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/expenses",
            post(expense::add_expense).get(expense::list_expenses),
        )
        .route("/expenses/summary", get(expense::expense_summary))
        .route(
            "/expenses/:id",
            get(expense::get_expense)
                .put(expense::update_expense)
                .delete(expense::delete_expense),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::jwt_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
