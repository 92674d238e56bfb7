//! Typed calls for the daemon endpoints the dashboard relies on.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{DaemonConfig, FmcdClient, RequestOutcome};
use crate::daemon::{self, CreatedInvoice, DepositAddress, FederationInfo, GatewayInfo};

pub const INFO_ENDPOINT: &str = "/v2/admin/info";
pub const GATEWAYS_ENDPOINT: &str = "/v2/ln/gateways";
pub const BALANCE_ENDPOINT: &str = "/v2/fedimint/balance";
pub const OPERATIONS_ENDPOINT: &str = "/v2/admin/operations";
pub const ONCHAIN_ADDRESS_ENDPOINT: &str = "/v2/onchain/address";
pub const LN_INVOICE_ENDPOINT: &str = "/v2/ln/invoice";
pub const LN_PAY_ENDPOINT: &str = "/v2/ln/pay";
pub const JOIN_ENDPOINT: &str = "/v2/admin/join";

pub const DEFAULT_INVOICE_EXPIRY_SECS: u64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub federation_id: String,
    pub gateway_id: String,
    pub amount_msat: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_expiry_time")]
    pub expiry_time: u64,
}

fn default_expiry_time() -> u64 {
    DEFAULT_INVOICE_EXPIRY_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub federation_id: String,
    pub payment_info: String,
    pub gateway_id: String,
}

impl FmcdClient {
    pub async fn info(&self, auth: &DaemonConfig) -> RequestOutcome<Vec<FederationInfo>> {
        self.request::<Value>(INFO_ENDPOINT, Method::GET, None, auth)
            .await
            .map(daemon::decode_info)
    }

    pub async fn gateways(
        &self,
        auth: &DaemonConfig,
        federation_id: &str,
    ) -> RequestOutcome<Vec<GatewayInfo>> {
        let body = json!({ "federationId": federation_id });
        self.request::<Value>(GATEWAYS_ENDPOINT, Method::POST, Some(body), auth)
            .await
            .map(daemon::decode_gateways)
    }

    /// Live balance; `None` inside a success when the body has no usable figure
    pub async fn balance(&self, auth: &DaemonConfig, federation_id: &str) -> RequestOutcome<Option<u64>> {
        let body = json!({ "federationId": federation_id });
        self.request::<Value>(BALANCE_ENDPOINT, Method::POST, Some(body), auth)
            .await
            .map(daemon::decode_balance)
    }

    pub async fn operations(
        &self,
        auth: &DaemonConfig,
        federation_id: &str,
        limit: usize,
    ) -> RequestOutcome<Vec<Value>> {
        let body = json!({ "federationId": federation_id, "limit": limit });
        self.request::<Value>(OPERATIONS_ENDPOINT, Method::POST, Some(body), auth)
            .await
            .map(daemon::decode_operations)
    }

    pub async fn onchain_address(
        &self,
        auth: &DaemonConfig,
        federation_id: Option<&str>,
    ) -> RequestOutcome<DepositAddress> {
        let body = match federation_id {
            Some(federation_id) => json!({ "federationId": federation_id }),
            None => json!({}),
        };
        let policy = self.policy().single_attempt();
        self.request_with_policy::<Value>(
            ONCHAIN_ADDRESS_ENDPOINT,
            Method::POST,
            Some(body),
            auth,
            &policy,
        )
        .await
        .map(daemon::decode_deposit_address)
    }

    /// Single attempt: a retry after a timeout could mint a second invoice
    pub async fn create_invoice(
        &self,
        auth: &DaemonConfig,
        request: &InvoiceRequest,
    ) -> RequestOutcome<CreatedInvoice> {
        let policy = self.policy().single_attempt();
        self.request_with_policy::<Value>(
            LN_INVOICE_ENDPOINT,
            Method::POST,
            Some(json!(request)),
            auth,
            &policy,
        )
        .await
        .map(daemon::decode_invoice)
    }

    /// Never retried: a payment that timed out may still settle
    pub async fn pay_invoice(
        &self,
        auth: &DaemonConfig,
        request: &PaymentRequest,
    ) -> RequestOutcome<Value> {
        let policy = self.policy().single_attempt();
        self.request_with_policy(
            LN_PAY_ENDPOINT,
            Method::POST,
            Some(json!(request)),
            auth,
            &policy,
        )
        .await
    }

    pub async fn join_federation(
        &self,
        auth: &DaemonConfig,
        invite_code: &str,
    ) -> RequestOutcome<Value> {
        let policy = self.policy().single_attempt();
        self.request_with_policy(
            JOIN_ENDPOINT,
            Method::POST,
            Some(json!({ "inviteCode": invite_code })),
            auth,
            &policy,
        )
        .await
    }
}
