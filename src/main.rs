use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use employee_directory_api::{
    auth::{AccountRepository, InMemoryAccountRepository, PgAccountRepository},
    config::{Config, StoreBackend},
    create_router, db,
    employees::{EmployeeRepository, InMemoryEmployeeRepository, PgEmployeeRepository},
    AppState,
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Employee Directory API - Starting...");

    let config = Config::from_env().expect("Invalid configuration");

    let (accounts, employees): (Arc<dyn AccountRepository>, Arc<dyn EmployeeRepository>) =
        match config.store_backend {
            StoreBackend::Postgres => {
                let database_url = config
                    .database_url
                    .as_deref()
                    .expect("DATABASE_URL must be set in environment");

                tracing::info!("Connecting to database...");
                let pool = db::create_pool(database_url)
                    .await
                    .expect("Failed to create database pool");
                db::run_migrations(&pool)
                    .await
                    .expect("Failed to run database migrations");

                (
                    Arc::new(PgAccountRepository::new(pool.clone())),
                    Arc::new(PgEmployeeRepository::new(pool)),
                )
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                (
                    Arc::new(InMemoryAccountRepository::new()),
                    Arc::new(InMemoryEmployeeRepository::new()),
                )
            }
        };

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .expect("Failed to create upload directory");

    let state = AppState::build(&config, accounts, employees).expect("Invalid password hashing parameters");
    let app = create_router(state, &config.api_prefix, &config.upload_dir);

    // Start the Axum server
    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Employee Directory API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
