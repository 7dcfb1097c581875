use expense_tracker::{
    build_router, AppConfig, AppState, AuthService, Database, ExpenseRepository,
    InMemoryExpenseRepository, InMemoryUserRepository, SqliteExpenseRepository,
    SqliteUserRepository, UserRepository,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type UserStore = Arc<dyn UserRepository + Send + Sync>;
type ExpenseStore = Arc<dyn ExpenseRepository + Send + Sync>;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expense_tracker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting expense tracker server");

    let config = AppConfig::from_env();

    // SQLite when DATABASE_URL is set, in-memory stores otherwise
    let database = match &config.database_url {
        Some(url) => {
            let database = Database::connect(url).await?;
            database.migrate().await?;
            Some(database)
        }
        None => None,
    };

    let (user_repository, expense_repository): (UserStore, ExpenseStore) = match &database {
        Some(database) => (
            Arc::new(SqliteUserRepository::new(database.pool())),
            Arc::new(SqliteExpenseRepository::new(database.pool())),
        ),
        None => {
            info!("DATABASE_URL not set, data will not survive a restart");
            (
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryExpenseRepository::new()),
            )
        }
    };

    let auth_service = Arc::new(AuthService::new(user_repository, config.token_config()));
    let app = build_router(AppState::new(expense_repository, auth_service));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(database) = database {
        database.close().await;
        info!("Database closed");
    }

    Ok(())
}
