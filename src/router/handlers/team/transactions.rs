use axum::extract::{Extension, Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::federations::{self, TransactionListing, TransactionQuery, DEFAULT_TRANSACTION_LIMIT};
use crate::observability::correlation::RequestContext;
use crate::router::handlers::{split_federation_ids, InContext};
use crate::state::AppState;
use crate::teams::Permission;

pub const MAX_TRANSACTION_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
    /// One id, several comma separated ids, or none for every federation
    pub federation_id: Option<String>,
    pub limit: Option<usize>,
    pub page: Option<usize>,
}

impl TransactionParams {
    fn into_query(self) -> Result<TransactionQuery, AppError> {
        let limit = self.limit.unwrap_or(DEFAULT_TRANSACTION_LIMIT);
        if !(1..=MAX_TRANSACTION_LIMIT).contains(&limit) {
            return Err(AppError::validation_error(format!(
                "limit must be between 1 and {}",
                MAX_TRANSACTION_LIMIT
            )));
        }

        let page = self.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::validation_error("page starts at 1"));
        }

        Ok(TransactionQuery {
            federation_ids: split_federation_ids(self.federation_id.as_deref()),
            limit,
            page,
            include_address: true,
        })
    }
}

#[axum_macros::debug_handler]
pub async fn handle_rest(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
    Query(params): Query<TransactionParams>,
) -> Result<Json<TransactionListing>, AppError> {
    let query = params.into_query().in_context(&context)?;
    let auth = state
        .authorized_daemon(&headers, &team_id, Permission::View)
        .await
        .in_context(&context)?;

    let listing = federations::transactions_for(&state.client, &auth, &query)
        .await
        .in_context(&context)?;

    info!(
        team_id = %team_id,
        federations = query.federation_ids.len(),
        returned = listing.transactions().len(),
        "Listed transactions"
    );

    Ok(Json(listing))
}
