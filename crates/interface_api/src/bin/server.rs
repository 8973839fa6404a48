//! RTO Ledger - API Server Binary
//!
//! Starts the HTTP API server for the vehicle compliance tracker.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin rto-ledger-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 DATABASE_URL=postgres://... cargo run --bin rto-ledger-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_JWT_SECRET` - JWT signing secret (required in production)
//! * `API_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_NOTIFY_DAYS_BEFORE` - Reminder horizon in days (default: 10)

use std::net::SocketAddr;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::{CitizenId, DocumentId, DocumentKind, Money, UserId, VehicleId};
use domain_documents::{Citizen, Document, DocumentDetails, DocumentStore, Vehicle};
use domain_ledger::PaymentLedger;
use infra_db::{CitizenRepository, DocumentRepository, PaymentRepository};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting RTO Ledger API Server"
    );

    let pool = create_database_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let state = AppState::new(pool.clone(), config.clone());
    rehydrate(&state).await?;

    let app = create_router(state);
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("invalid server address")?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables, falling back to
/// individual variables and then defaults.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|_| ApiConfig {
        host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
        port: std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080),
        jwt_secret: std::env::var("API_JWT_SECRET")
            .unwrap_or_else(|_| "dev-secret-change-in-production".to_string()),
        jwt_expiration_secs: std::env::var("API_JWT_EXPIRATION_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600),
        database_url: std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("API_DATABASE_URL"))
            .unwrap_or_else(|_| "postgres://localhost/rto_ledger".to_string()),
        log_level: std::env::var("API_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string()),
        notify_days_before: std::env::var("API_NOTIFY_DAYS_BEFORE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10),
    })
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

async fn create_database_pool(database_url: &str) -> anyhow::Result<sqlx::PgPool> {
    tracing::info!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(database_url)
        .await
        .context("connecting to PostgreSQL")?;

    tracing::info!("Database connection established");
    Ok(pool)
}

async fn run_migrations(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("running migrations")?;
    tracing::info!("Database ready");
    Ok(())
}

/// Loads the full record set out of PostgreSQL into the in-memory
/// working set: citizens, vehicles, all seven document kinds, payments.
async fn rehydrate(state: &AppState) -> anyhow::Result<()> {
    let citizens_repo = CitizenRepository::new(state.pool.clone());
    let documents_repo = DocumentRepository::new(state.pool.clone());
    let payments_repo = PaymentRepository::new(state.pool.clone());

    let mut store = DocumentStore::new();
    let mut counts = (0usize, 0usize, 0usize, 0usize);

    for row in citizens_repo.list_all_citizens().await? {
        store.add_citizen(Citizen {
            id: CitizenId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            name: row.name,
            mobile_number: row.mobile_number,
            email: row.email,
            birth_date: row.birth_date,
            relation_type: row.relation_type,
            relation_name: row.relation_name,
            address: row.address,
            state: row.state,
            city_district: row.city_district,
            created_at: row.created_at,
        })?;
        counts.0 += 1;
    }

    for row in citizens_repo.list_all_vehicles().await? {
        store.add_vehicle(Vehicle {
            id: VehicleId::from_uuid(row.id),
            citizen_id: CitizenId::from_uuid(row.citizen_id),
            registration_no: row.registration_no,
            vehicle_type: row.vehicle_type,
            make_model: row.make_model,
            chassis_no: row.chassis_no,
            engine_no: row.engine_no,
            created_at: row.created_at,
        })?;
        counts.1 += 1;
    }

    for kind in DocumentKind::ALL {
        for row in documents_repo.list_all(kind).await? {
            let details =
                DocumentDetails::from_profile(kind, row.reference.clone(), row.start_date, row.expiry_date);
            store.add_document(Document {
                id: DocumentId::from_uuid(row.id),
                vehicle_id: VehicleId::from_uuid(row.vehicle_id),
                bill_amount: row.total_amount.map(Money::new),
                details,
                created_at: row.created_at,
            })?;
            counts.2 += 1;
        }
    }

    let mut ledger = PaymentLedger::new();
    for payment in payments_repo.load_all().await? {
        ledger.load(payment);
        counts.3 += 1;
    }

    tracing::info!(
        citizens = counts.0,
        vehicles = counts.1,
        documents = counts.2,
        payments = counts.3,
        "Working set rehydrated"
    );

    *state.store.write().await = store;
    *state.ledger.write().await = ledger;
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
