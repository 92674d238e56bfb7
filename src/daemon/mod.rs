//! Typed views of the daemon's JSON responses.
//!
//! Each `decode_*` function is the single place a response shape is read.
//! Missing or mistyped fields fall back to defaults instead of failing.

pub mod lenient;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use self::lenient::{bool_field, field, string_field, string_map, u64_field};

#[cfg(test)]
#[path = "tests.rs"]
mod tests;

pub const UNKNOWN_NETWORK: &str = "unknown";
pub const UNNAMED_FEDERATION: &str = "Unnamed federation";

/// One entry of `GET /v2/admin/info`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FederationInfo {
    pub federation_id: String,
    pub total_amount_msat: u64,
    pub name: String,
    pub network: String,
    pub meta: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayFees {
    pub base_msat: u64,
    pub proportional_millionths: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayInfo {
    pub gateway_id: String,
    pub node_pub_key: String,
    pub api: String,
    pub fees: GatewayFees,
    pub lightning_alias: String,
    pub mint_channel_id: u64,
    pub supports_private_payments: bool,
    pub vetted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddress {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedInvoice {
    pub invoice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

/// The info endpoint answers with a map keyed by federation id
pub fn decode_info(value: Value) -> Vec<FederationInfo> {
    let Value::Object(federations) = value else {
        return Vec::new();
    };

    federations
        .into_iter()
        .map(|(federation_id, entry)| {
            let meta = string_map(field(&entry, &["meta"]));
            let name = meta
                .get("federation_name")
                .filter(|name| !name.is_empty())
                .cloned()
                .unwrap_or_else(|| UNNAMED_FEDERATION.to_string());

            FederationInfo {
                total_amount_msat: u64_field(&entry, &["totalAmountMsat", "total_amount_msat"])
                    .unwrap_or(0),
                network: string_field(&entry, &["network"])
                    .unwrap_or_else(|| UNKNOWN_NETWORK.to_string()),
                name,
                meta,
                federation_id,
            }
        })
        .collect()
}

/// Gateway list, either a bare array or wrapped in `{"gateways": [...]}`
pub fn decode_gateways(value: Value) -> Vec<GatewayInfo> {
    let records = match value {
        Value::Array(records) => records,
        Value::Object(mut map) => match map.remove("gateways") {
            Some(Value::Array(records)) => records,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    records.iter().map(decode_gateway).collect()
}

fn decode_gateway(record: &Value) -> GatewayInfo {
    // Older daemons return the info fields at the top level
    let info = field(record, &["info"]).unwrap_or(record);
    let fees = field(info, &["fees"]);

    GatewayInfo {
        gateway_id: string_field(info, &["gateway_id", "gatewayId"]).unwrap_or_default(),
        node_pub_key: string_field(info, &["node_pub_key", "nodePubKey"]).unwrap_or_default(),
        api: string_field(info, &["api"]).unwrap_or_default(),
        fees: GatewayFees {
            base_msat: fees
                .and_then(|fees| u64_field(fees, &["base_msat", "baseMsat"]))
                .unwrap_or(0),
            proportional_millionths: fees
                .and_then(|fees| {
                    u64_field(fees, &["proportional_millionths", "proportionalMillionths"])
                })
                .unwrap_or(0),
        },
        lightning_alias: string_field(info, &["lightning_alias", "lightningAlias"])
            .unwrap_or_default(),
        mint_channel_id: u64_field(info, &["mint_channel_id", "mintChannelId"]).unwrap_or(0),
        supports_private_payments: bool_field(
            info,
            &["supports_private_payments", "supportsPrivatePayments"],
        )
        .unwrap_or(false),
        vetted: bool_field(record, &["vetted"]).unwrap_or(false),
    }
}

/// Balance as a bare number or `{"balance_msat": n}`; `None` when neither
pub fn decode_balance(value: Value) -> Option<u64> {
    match &value {
        Value::Object(_) => u64_field(&value, &["balance_msat", "balanceMsat"]),
        other => lenient::as_u64(other),
    }
}

/// Raw operation records from `{"operations": [...]}` or a bare array
pub fn decode_operations(value: Value) -> Vec<Value> {
    match value {
        Value::Array(operations) => operations,
        Value::Object(mut map) => match map.remove("operations") {
            Some(Value::Array(operations)) => operations,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

pub fn decode_deposit_address(value: Value) -> DepositAddress {
    DepositAddress {
        address: string_field(&value, &["address"]).unwrap_or_default(),
        operation_id: string_field(&value, &["operationId", "operation_id"]),
    }
}

pub fn decode_invoice(value: Value) -> CreatedInvoice {
    CreatedInvoice {
        invoice: string_field(&value, &["invoice"]).unwrap_or_default(),
        operation_id: string_field(&value, &["operationId", "operation_id"]),
    }
}
