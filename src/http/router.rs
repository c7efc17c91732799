//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing).

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS for development; restrict in production.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Auth
        .route("/auth/login", post(handlers::login))
        // Branches
        .route("/branches", post(handlers::create_branch))
        .route("/branches", get(handlers::list_branches))
        .route("/branches/{branch_id}", get(handlers::get_branch))
        .route("/branches/{branch_id}", delete(handlers::delete_branch))
        .route("/branches/{branch_id}/roles", put(handlers::update_roles))
        .route(
            "/branches/{branch_id}/settings",
            patch(handlers::update_settings),
        )
        // Employees
        .route(
            "/branches/{branch_id}/employees",
            post(handlers::add_employee),
        )
        .route(
            "/branches/{branch_id}/employees",
            get(handlers::list_employees),
        )
        .route(
            "/employees/{employee_id}",
            delete(handlers::delete_employee),
        )
        .route(
            "/employees/bulk-update-hours",
            post(handlers::bulk_update_hours),
        )
        // Shifts
        .route("/shifts", post(handlers::create_shift))
        .route("/shifts", get(handlers::list_shifts))
        .route("/shifts/{shift_id}", delete(handlers::delete_shift))
        .route("/shifts/{shift_id}", patch(handlers::update_shift))
        .route("/shifts/{shift_id}/refresh", post(handlers::refresh_shift))
        // Finalized schedules
        .route("/finalized", get(handlers::list_finalized))
        .route("/finalized", post(handlers::set_finalized))
        .route("/finalized", delete(handlers::delete_finalized))
        // Cross-branch requests and the live event stream
        .route("/pending-requests", get(handlers::pending_requests))
        .route("/events", get(handlers::stream_events));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
