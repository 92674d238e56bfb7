use axum::extract::{Extension, Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::client::api::PaymentRequest;
use crate::client::DaemonConfig;
use crate::error::AppError;
use crate::observability::correlation::RequestContext;
use crate::observability::sanitize_invoice;
use crate::router::handlers::InContext;
use crate::state::AppState;
use crate::teams::Permission;

#[instrument(
    skip_all,
    fields(
        federation_id = %req.federation_id,
        gateway_id = %req.gateway_id,
        payment_info = %sanitize_invoice(&req.payment_info),
        payment_status = "initiated",
    )
)]
async fn _pay(state: &AppState, auth: &DaemonConfig, req: PaymentRequest) -> Result<Value, AppError> {
    if req.payment_info.trim().is_empty() {
        return Err(AppError::validation_error("paymentInfo is required"));
    }

    let span = tracing::Span::current();
    match state.client.pay_invoice(auth, &req).await.into_result() {
        Ok(result) => {
            span.record("payment_status", "submitted");
            info!("Payment submitted to daemon");
            Ok(result)
        }
        Err(e) => {
            span.record("payment_status", "failed");
            error!(error = %e, "Payment failed");
            Err(e.into())
        }
    }
}

#[axum_macros::debug_handler]
pub async fn handle_rest(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<Value>, AppError> {
    let auth = state
        .authorized_daemon(&headers, &team_id, Permission::Transact)
        .await
        .in_context(&context)?;
    let result = _pay(&state, &auth, req).await.in_context(&context)?;
    Ok(Json(result))
}
