use axum::Json;
use serde_json::{json, Value};

/// Liveness only; the daemon is never called
pub async fn handle_rest() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
