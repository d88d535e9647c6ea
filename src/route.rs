//! Route definitions for the SBP gateway API
//!
//! This module wires all HTTP routes to their handlers and nests the admin
//! surface behind the token-check middleware.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::database::AppState;
use crate::handler::{
    create_rule, current_rule, delete_rule, generate_qr, get_working_hours, list_rules,
    payment_link, payment_status, redeem_session, toggle_rule, update_working_hours,
};

use crate::middleware::admin_auth_middleware;
use axum::middleware;

/// Creates and configures the Axum application router
///
/// # Route Definitions
///
/// Payer-facing (public):
/// - `GET /pay/{session_id}` - Redirect to the session's bound bank URL
/// - `GET /api/payment-link` - Issue a link session
/// - `GET /api/generate-qr` - Issue a QR session
/// - `GET /api/payment-status` - Availability probe
///
/// Admin (token required when `ADMIN_TOKEN` is set):
/// - `GET /api/admin/rules` / `POST /api/admin/rules`
/// - `GET /api/admin/rules/current`
/// - `POST /api/admin/rules/{id}/toggle`
/// - `DELETE /api/admin/rules/{id}`
/// - `GET /api/admin/working-hours` / `PUT /api/admin/working-hours`
pub fn create_app(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/rules", get(list_rules).post(create_rule))
        .route("/rules/current", get(current_rule))
        .route("/rules/{id}/toggle", post(toggle_rule))
        .route("/rules/{id}", delete(delete_rule))
        .route(
            "/working-hours",
            get(get_working_hours).put(update_working_hours),
        )
        .layer(middleware::from_fn(admin_auth_middleware));

    Router::new()
        // Public redirect endpoint - sends the payer on to the bank
        .route("/pay/{session_id}", get(redeem_session))
        // Payer-facing issuance
        .route("/api/payment-link", get(payment_link))
        .route("/api/generate-qr", get(generate_qr))
        .route("/api/payment-status", get(payment_status))
        // Admin console surface
        .nest("/api/admin", admin_routes)
        .with_state(state)
}
