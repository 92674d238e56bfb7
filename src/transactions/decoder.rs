//! Turns raw daemon operation records into [`Transaction`]s.
//!
//! Decoding never fails. Anything that cannot be read falls back to a
//! neutral value: amount 0, status pending, timestamp "now".

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

use super::invoice::parse_invoice_amount_msat;
use super::{Transaction, TransactionStatus, TransactionType};
use crate::daemon::lenient::{field, string_field, u64_field};

const COMPLETED_OUTCOME_KEYS: [&str; 6] = [
    "Claimed",
    "Success",
    "Completed",
    "success",
    "completed",
    "claimed",
];
const FAILED_OUTCOME_KEYS: [&str; 6] = [
    "canceled", "failed", "Failed", "Canceled", "refunded", "Refunded",
];

const MSAT_KEYS: [&str; 2] = ["amount_msat", "amountMsat"];
const SAT_KEYS: [&str; 2] = ["amount_sat", "amountSat"];

const TIMESTAMP_KEYS: [&str; 5] = [
    "creationTime",
    "creation_time",
    "timestamp",
    "createdAt",
    "created_at",
];
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Decode `raw` as of the current time
pub fn decode_operation(raw: &Value, federation_id: &str, include_address: bool) -> Transaction {
    decode_operation_at(raw, federation_id, include_address, Utc::now())
}

/// Decode `raw`, using `now` for records without a readable timestamp
pub fn decode_operation_at(
    raw: &Value,
    federation_id: &str,
    include_address: bool,
    now: DateTime<Utc>,
) -> Transaction {
    let kind = string_field(raw, &["operationKind", "operation_kind"]).unwrap_or_default();
    let meta = field(raw, &["operationMeta", "operation_meta", "meta"]);
    let variant = meta.and_then(|meta| field(meta, &["variant"]));
    let outcome = field(raw, &["outcome"]);

    let tx_type = classify(&kind, variant);
    let payload = variant_payload(variant, tx_type);

    let invoice = if tx_type.is_lightning() {
        [payload, meta]
            .into_iter()
            .flatten()
            .find_map(|source| string_field(source, &["invoice", "bolt11", "payment_request"]))
    } else {
        None
    };

    let explicit_sources: Vec<&Value> = [Some(raw), meta, payload, outcome]
        .into_iter()
        .flatten()
        .chain(outcome.and_then(Value::as_object).into_iter().flat_map(|o| o.values()))
        .collect();

    let amount_msat = match tx_type {
        TransactionType::LightningReceive | TransactionType::LightningSend => invoice
            .as_deref()
            .map(parse_invoice_amount_msat)
            .filter(|amount| *amount > 0)
            .or_else(|| explicit_amount_msat(&explicit_sources)),
        TransactionType::OnchainReceive => deposited_amount_msat(outcome),
        TransactionType::OnchainSend => [payload, meta]
            .into_iter()
            .flatten()
            .find_map(|source| u64_field(source, &["amount_sat", "amountSat", "amount"]))
            .map(|sats| sats.saturating_mul(1000)),
        TransactionType::EcashMint | TransactionType::EcashSpend => {
            explicit_amount_msat(&explicit_sources)
                .or_else(|| meta.and_then(|meta| u64_field(meta, &["amount"])))
        }
    }
    .unwrap_or(0);

    let timestamp = field(raw, &TIMESTAMP_KEYS)
        .and_then(parse_timestamp)
        .unwrap_or(now);

    let id = string_field(raw, &["id", "operationId", "operation_id"])
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| placeholder_id(federation_id, &timestamp));

    let description = [payload, meta, meta.and_then(|meta| field(meta, &["extra_meta"]))]
        .into_iter()
        .flatten()
        .find_map(|source| string_field(source, &["description"]))
        .filter(|description| !description.is_empty())
        .unwrap_or_else(|| tx_type.default_description().to_string());

    let address = if include_address && tx_type.is_onchain() {
        payload.and_then(|payload| string_field(payload, &["address"]))
    } else {
        None
    };

    Transaction {
        id,
        tx_type,
        amount_msat,
        timestamp,
        status: resolve_status(outcome),
        federation_id: federation_id.to_string(),
        description,
        address,
        invoice,
    }
}

fn classify(kind: &str, variant: Option<&Value>) -> TransactionType {
    let has = |key: &str| variant_has(variant, key);

    match kind {
        "ln" if has("receive") => TransactionType::LightningReceive,
        "ln" if has("pay") || has("send") => TransactionType::LightningSend,
        "wallet" if has("deposit") => TransactionType::OnchainReceive,
        "wallet" if has("withdraw") => TransactionType::OnchainSend,
        "mint" if has("spend_o_o_b") => TransactionType::EcashSpend,
        "mint" => TransactionType::EcashMint,
        _ => {
            debug!(
                operation_kind = %kind,
                variant = ?variant.map(variant_name),
                "Unrecognized operation, classifying as ecash mint"
            );
            TransactionType::EcashMint
        }
    }
}

fn variant_has(variant: Option<&Value>, key: &str) -> bool {
    match variant {
        Some(Value::Object(map)) => map.contains_key(key),
        Some(Value::String(name)) => name == key,
        _ => false,
    }
}

fn variant_name(variant: &Value) -> String {
    match variant {
        Value::Object(map) => map.keys().cloned().collect::<Vec<_>>().join(","),
        Value::String(name) => name.clone(),
        other => other.to_string(),
    }
}

/// The object under the variant key that decided the type
fn variant_payload(variant: Option<&Value>, tx_type: TransactionType) -> Option<&Value> {
    let keys: &[&str] = match tx_type {
        TransactionType::LightningReceive => &["receive"],
        TransactionType::LightningSend => &["pay", "send"],
        TransactionType::OnchainReceive => &["deposit"],
        TransactionType::OnchainSend => &["withdraw"],
        TransactionType::EcashSpend => &["spend_o_o_b"],
        TransactionType::EcashMint => &["reissuance"],
    };
    field(variant?, keys)
}

fn explicit_amount_msat(sources: &[&Value]) -> Option<u64> {
    sources
        .iter()
        .find_map(|source| {
            u64_field(source, &MSAT_KEYS)
                .or_else(|| u64_field(source, &SAT_KEYS).map(|sats| sats.saturating_mul(1000)))
        })
        .filter(|amount| *amount > 0)
}

fn deposited_amount_msat(outcome: Option<&Value>) -> Option<u64> {
    let claimed = field(outcome?, &["Claimed", "claimed"])?;
    u64_field(claimed, &["btc_deposited"]).map(|sats| sats.saturating_mul(1000))
}

/// Completion state from the operation's `outcome` field
pub fn resolve_status(outcome: Option<&Value>) -> TransactionStatus {
    match outcome {
        None | Some(Value::Null) => TransactionStatus::Pending,
        Some(Value::String(state)) => match state.to_ascii_lowercase().as_str() {
            "claimed" | "success" | "completed" => TransactionStatus::Completed,
            "failed" | "canceled" | "refunded" => TransactionStatus::Failed,
            _ => TransactionStatus::Pending,
        },
        Some(Value::Object(map)) => {
            if COMPLETED_OUTCOME_KEYS.iter().any(|key| map.contains_key(*key)) {
                TransactionStatus::Completed
            } else if FAILED_OUTCOME_KEYS.iter().any(|key| map.contains_key(*key)) {
                TransactionStatus::Failed
            } else {
                TransactionStatus::Pending
            }
        }
        Some(_) => TransactionStatus::Pending,
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NAIVE_TIMESTAMP_FORMATS.iter().find_map(|format| {
                        NaiveDateTime::parse_from_str(text, format)
                            .ok()
                            .map(|naive| Utc.from_utc_datetime(&naive))
                    })
                })
                .or_else(|| text.parse::<i64>().ok().and_then(from_epoch))
        }
        Value::Number(number) => number.as_i64().and_then(from_epoch),
        _ => None,
    }
}

fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    // Seconds stay below 10^10 until the year 2286
    if value.abs() >= 10_000_000_000 {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    }
}

/// Display-only identifier for records without an id; not stable across calls
fn placeholder_id(federation_id: &str, timestamp: &DateTime<Utc>) -> String {
    format!(
        "{}-{}-{:08x}",
        federation_id,
        timestamp.timestamp_millis(),
        rand::random::<u32>()
    )
}
