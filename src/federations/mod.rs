//! Per-federation fan-out over a single daemon.
//!
//! Every federation known to the daemon is queried concurrently. A failure
//! for one federation degrades that federation's entry to defaults and never
//! fails the aggregate.

use std::collections::BTreeMap;

use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::client::{DaemonConfig, FmcdClient, RequestOutcome};
use crate::daemon::{FederationInfo, GatewayInfo, UNKNOWN_NETWORK};
use crate::metrics;
use crate::teams::ConnectionStatus;
use crate::transactions::{decode_operation, sort_newest_first, Transaction};


/// Lower bound on raw operations requested per federation
pub const MIN_OPERATIONS_FETCH: usize = 100;
/// Over-fetch factor applied to the requested page size
pub const OPERATIONS_FETCH_FACTOR: usize = 10;
pub const DEFAULT_TRANSACTION_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FederationSummary {
    pub federation_id: String,
    pub balance_msat: u64,
    pub name: String,
    pub network: String,
    pub meta: BTreeMap<String, String>,
    pub gateway_count: usize,
    pub gateways: Vec<GatewayInfo>,
}

/// Daemon-wide totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonOverview {
    pub federations: Vec<FederationSummary>,
    pub total_balance_msat: u64,
    pub total_gateways: usize,
    pub federation_count: usize,
    /// Network of the first federation; mixed-network daemons are not modeled
    pub network: String,
}

impl DaemonOverview {
    pub fn from_federations(federations: Vec<FederationSummary>) -> Self {
        let total_balance_msat = federations
            .iter()
            .fold(0u64, |total, federation| total.saturating_add(federation.balance_msat));
        let total_gateways = federations.iter().map(|f| f.gateway_count).sum();
        let network = federations
            .first()
            .map(|federation| federation.network.clone())
            .unwrap_or_else(|| UNKNOWN_NETWORK.to_string());

        Self {
            federation_count: federations.len(),
            total_balance_msat,
            total_gateways,
            network,
            federations,
        }
    }
}

/// Federations with their gateways and live balance
pub async fn list_federations(
    client: &FmcdClient,
    auth: &DaemonConfig,
) -> RequestOutcome<Vec<FederationSummary>> {
    let (infos, status) = match client.info(auth).await {
        RequestOutcome::Success { data, status } => (data, status),
        RequestOutcome::Failure(err) => return RequestOutcome::Failure(err),
    };

    let summaries = join_all(infos.into_iter().map(|info| summarize(client, auth, info))).await;

    info!(
        federations = summaries.len(),
        "Aggregated federation details"
    );

    RequestOutcome::Success {
        data: summaries,
        status,
    }
}

async fn summarize(client: &FmcdClient, auth: &DaemonConfig, info: FederationInfo) -> FederationSummary {
    let (gateways, balance) = tokio::join!(
        client.gateways(auth, &info.federation_id),
        client.balance(auth, &info.federation_id),
    );

    let gateways = match gateways {
        RequestOutcome::Success { data, .. } => data,
        RequestOutcome::Failure(err) => {
            warn!(
                federation_id = %info.federation_id,
                error = %err,
                "Gateway lookup failed, listing federation without gateways"
            );
            metrics::record_degraded_federation("gateways");
            Vec::new()
        }
    };

    let balance_msat = match balance {
        RequestOutcome::Success { data: Some(balance), .. } => balance,
        RequestOutcome::Success { data: None, .. } => info.total_amount_msat,
        RequestOutcome::Failure(err) => {
            warn!(
                federation_id = %info.federation_id,
                error = %err,
                fallback_msat = info.total_amount_msat,
                "Balance lookup failed, using balance from federation info"
            );
            metrics::record_degraded_federation("balance");
            info.total_amount_msat
        }
    };

    FederationSummary {
        federation_id: info.federation_id,
        balance_msat,
        name: info.name,
        network: info.network,
        meta: info.meta,
        gateway_count: gateways.len(),
        gateways,
    }
}

pub async fn daemon_overview(
    client: &FmcdClient,
    auth: &DaemonConfig,
) -> RequestOutcome<DaemonOverview> {
    list_federations(client, auth)
        .await
        .map(DaemonOverview::from_federations)
}

/// Call the info endpoint and record the result as a [`ConnectionStatus`]
pub async fn test_connection(client: &FmcdClient, auth: &DaemonConfig) -> ConnectionStatus {
    let outcome = client.info(auth).await;
    let last_checked_utc = Utc::now();

    match outcome {
        RequestOutcome::Success { data, .. } => {
            info!(federations = data.len(), "Daemon connection test succeeded");
            ConnectionStatus {
                connected: true,
                last_checked_utc,
                version: None,
                error: None,
                federation_count: data.len(),
            }
        }
        RequestOutcome::Failure(err) => {
            warn!(status = err.status, error = %err, "Daemon connection test failed");
            ConnectionStatus {
                connected: false,
                last_checked_utc,
                version: None,
                error: Some(err.message),
                federation_count: 0,
            }
        }
    }
}

/// Raw operations to request for a page of `limit` transactions
pub fn operations_fetch_limit(limit: usize) -> usize {
    limit
        .saturating_mul(OPERATIONS_FETCH_FACTOR)
        .max(MIN_OPERATIONS_FETCH)
}

/// Decoded transactions of every listed federation, newest first.
///
/// A federation whose operations cannot be fetched contributes nothing.
pub async fn fetch_transactions(
    client: &FmcdClient,
    auth: &DaemonConfig,
    federation_ids: &[String],
    limit: usize,
    include_address: bool,
) -> Vec<Transaction> {
    let fetch_limit = operations_fetch_limit(limit);

    let per_federation = join_all(federation_ids.iter().map(|federation_id| async move {
        match client.operations(auth, federation_id, fetch_limit).await {
            RequestOutcome::Success { data, .. } => data
                .iter()
                .map(|raw| decode_operation(raw, federation_id, include_address))
                .collect::<Vec<_>>(),
            RequestOutcome::Failure(err) => {
                warn!(
                    federation_id = %federation_id,
                    error = %err,
                    "Operation lookup failed, skipping federation"
                );
                metrics::record_degraded_federation("operations");
                Vec::new()
            }
        }
    }))
    .await;

    let mut transactions: Vec<Transaction> = per_federation.into_iter().flatten().collect();
    sort_newest_first(&mut transactions);
    transactions
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionQuery {
    /// Empty means every federation the daemon knows
    pub federation_ids: Vec<String>,
    pub limit: usize,
    /// 1-based; only honored for a single federation
    pub page: usize,
    pub include_address: bool,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            federation_ids: Vec::new(),
            limit: DEFAULT_TRANSACTION_LIMIT,
            page: 1,
            include_address: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl TransactionPage {
    /// Slice page `page` (1-based) of `limit` items out of `transactions`
    pub fn paginate(transactions: Vec<Transaction>, page: usize, limit: usize) -> Self {
        let limit = limit.max(1);
        let page = page.max(1);
        let total = transactions.len();
        let total_pages = (total + limit - 1) / limit;

        let items = transactions
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// A single federation is paged; several federations get the newest `limit`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TransactionListing {
    Page(TransactionPage),
    Recent(Vec<Transaction>),
}

impl TransactionListing {
    pub fn transactions(&self) -> &[Transaction] {
        match self {
            TransactionListing::Page(page) => &page.items,
            TransactionListing::Recent(items) => items,
        }
    }
}

pub async fn transactions_for(
    client: &FmcdClient,
    auth: &DaemonConfig,
    query: &TransactionQuery,
) -> RequestOutcome<TransactionListing> {
    let (federation_ids, status) = if query.federation_ids.is_empty() {
        match client.info(auth).await {
            RequestOutcome::Success { data, status } => (
                data.into_iter()
                    .map(|info| info.federation_id)
                    .collect::<Vec<_>>(),
                status,
            ),
            RequestOutcome::Failure(err) => return RequestOutcome::Failure(err),
        }
    } else {
        (query.federation_ids.clone(), 200)
    };

    let transactions = fetch_transactions(
        client,
        auth,
        &federation_ids,
        query.limit,
        query.include_address,
    )
    .await;

    let listing = if query.federation_ids.len() == 1 {
        TransactionListing::Page(TransactionPage::paginate(
            transactions,
            query.page,
            query.limit,
        ))
    } else {
        TransactionListing::Recent(transactions.into_iter().take(query.limit).collect())
    };

    RequestOutcome::Success {
        data: listing,
        status,
    }
}
