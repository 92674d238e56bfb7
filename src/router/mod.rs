//! Team-scoped JSON endpoints for the dashboard front-end.

pub mod handlers;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::observability::request_id_middleware;
use crate::state::AppState;
use handlers::{admin, health, ln, onchain, team};


/// Dashboard routes with request ids attached; no CORS, tracing or metrics layers
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/teams/:team_id", team_routes())
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
        .route("/health", get(health::handle_rest))
}

/// Routes under `/api/teams/:team_id`:
/// - `/config`: Read (password redacted) or replace the daemon connection.
/// - `/connection/test`: Call the daemon and record the connection status.
/// - `/federations`: Federations with gateways, live balances and totals.
/// - `/transactions`: Decoded transactions, paged for a single federation.
/// - `/stats`: Transaction statistics bucketed per day, week or month.
///
/// Proxied daemon calls:
/// - `/onchain/address`: Generate a deposit address.
/// - `/ln/invoice`: Create a lightning invoice.
/// - `/ln/pay`: Pay a lightning invoice, never retried.
/// - `/admin/join`: Join a federation with an invite code, never retried.
fn team_routes() -> Router<AppState> {
    let ln_router = Router::new()
        .route("/invoice", post(ln::invoice::handle_rest))
        .route("/pay", post(ln::pay::handle_rest));

    let onchain_router = Router::new().route("/address", post(onchain::address::handle_rest));

    let admin_router = Router::new().route("/join", post(admin::join::handle_rest));

    Router::new()
        .route(
            "/config",
            get(team::config::handle_get).put(team::config::handle_put),
        )
        .route("/connection/test", post(team::connection::handle_rest))
        .route("/federations", get(team::federations::handle_rest))
        .route("/transactions", get(team::transactions::handle_rest))
        .route("/stats", get(team::stats::handle_rest))
        .nest("/ln", ln_router)
        .nest("/onchain", onchain_router)
        .nest("/admin", admin_router)
}
