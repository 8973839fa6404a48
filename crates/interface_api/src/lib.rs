//! HTTP API Layer
//!
//! REST API for the vehicle compliance tracker using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: citizens/vehicles, documents, payments, back-office
//! - **Middleware**: authentication, audit logging
//! - **DTOs**: request/response data transfer objects
//! - **State**: the in-memory document store and payment ledger are the
//!   working set; every write also lands in PostgreSQL through the
//!   repositories, the working set never runs ahead of the database,
//!   and the server rehydrates the working set at startup
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(pool, config);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_documents::DocumentStore;
use domain_ledger::PaymentLedger;

use crate::config::ApiConfig;
use crate::handlers::{citizens, documents, health, payments, reports};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub store: Arc<RwLock<DocumentStore>>,
    pub ledger: Arc<RwLock<PaymentLedger>>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(pool: PgPool, config: ApiConfig) -> Self {
        Self {
            pool,
            store: Arc::new(RwLock::new(DocumentStore::new())),
            ledger: Arc::new(RwLock::new(PaymentLedger::new())),
            config,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Citizen routes, including the account statement
    let citizen_routes = Router::new()
        .route("/", post(citizens::create_citizen))
        .route("/:id", get(citizens::get_citizen))
        .route("/:id", put(citizens::update_citizen))
        .route("/:id", delete(citizens::delete_citizen))
        .route("/:id/statement", get(citizens::get_statement))
        .route("/:id/vehicles", get(citizens::list_vehicles))
        .route("/:id/vehicles", post(citizens::create_vehicle));

    // Vehicle routes; document collections hang off the vehicle by kind
    let vehicle_routes = Router::new()
        .route("/:id", get(citizens::get_vehicle))
        .route("/:id", delete(citizens::delete_vehicle))
        .route("/:id/documents/:kind", get(documents::list_documents))
        .route("/:id/documents/:kind", post(documents::create_document));

    // Document routes addressed by (kind, id)
    let document_routes = Router::new()
        .route("/:kind/:id", get(documents::get_document))
        .route("/:kind/:id", put(documents::update_document))
        .route("/:kind/:id", delete(documents::delete_document))
        .route("/:kind/:id/balance", get(payments::get_balance))
        .route("/:kind/:id/payments", get(payments::list_payments));

    // Payment routes
    let payment_routes = Router::new()
        .route("/", post(payments::record_payment))
        .route("/:id", put(payments::update_payment))
        .route("/:id", delete(payments::delete_payment));

    // Back-office routes
    let report_routes = Router::new()
        .route("/expiry", get(reports::expiry_report));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/citizens", citizen_routes)
        .nest("/vehicles", vehicle_routes)
        .nest("/documents", document_routes)
        .nest("/payments", payment_routes)
        .nest("/reports", report_routes)
        .route("/exports/:table", get(reports::export_table))
        .route("/notifications/run", post(reports::run_notifications))
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
