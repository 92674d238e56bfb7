use axum::extract::{Extension, Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::AppError;
use crate::federations::{self, TransactionQuery};
use crate::observability::correlation::RequestContext;
use crate::router::handlers::{split_federation_ids, InContext};
use crate::state::AppState;
use crate::stats::{self, Periods, StatsReport, Timeframe};
use crate::teams::Permission;

/// Most transactions considered for a report over a fixed window
pub const STATS_TRANSACTION_LIMIT: usize = 500;
/// Most transactions considered when the window reaches back to the earliest one
pub const STATS_HISTORY_TRANSACTION_LIMIT: usize = 5_000;

pub fn transaction_limit(periods: Periods) -> usize {
    match periods {
        Periods::Count(_) => STATS_TRANSACTION_LIMIT,
        Periods::All => STATS_HISTORY_TRANSACTION_LIMIT,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsParams {
    pub timeframe: Option<String>,
    pub periods: Option<String>,
    pub federation_id: Option<String>,
}

impl StatsParams {
    fn parse(&self) -> Result<(Timeframe, Periods), AppError> {
        let timeframe = match self.timeframe.as_deref() {
            Some(timeframe) => timeframe
                .parse::<Timeframe>()
                .map_err(|e| AppError::validation_error(e.to_string()))?,
            None => Timeframe::Day,
        };

        let periods = match self.periods.as_deref() {
            Some(periods) => periods
                .parse::<Periods>()
                .map_err(|e| AppError::validation_error(e.to_string()))?,
            None => Periods::Count(7),
        };

        Ok((timeframe, periods))
    }
}

#[axum_macros::debug_handler]
pub async fn handle_rest(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    Path(team_id): Path<String>,
    headers: HeaderMap,
    Query(params): Query<StatsParams>,
) -> Result<Json<StatsReport>, AppError> {
    let (timeframe, periods) = params.parse().in_context(&context)?;
    let auth = state
        .authorized_daemon(&headers, &team_id, Permission::View)
        .await
        .in_context(&context)?;

    let query = TransactionQuery {
        federation_ids: split_federation_ids(params.federation_id.as_deref()),
        limit: transaction_limit(periods),
        page: 1,
        include_address: false,
    };
    let listing = federations::transactions_for(&state.client, &auth, &query)
        .await
        .in_context(&context)?;

    if listing.transactions().len() >= query.limit {
        warn!(
            team_id = %team_id,
            limit = query.limit,
            "Statistics cover only the most recent transactions"
        );
    }

    let report = stats::build_report(listing.transactions(), timeframe, periods, Utc::now());

    info!(
        team_id = %team_id,
        timeframe = %timeframe,
        buckets = report.buckets.len(),
        transactions = report.summary.total_transactions,
        "Built transaction statistics"
    );

    Ok(Json(report))
}
