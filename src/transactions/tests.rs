#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use serde_json::json;

use super::decoder::resolve_status;
use super::*;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

#[test]
fn test_deposit_with_claimed_outcome() {
    let raw = json!({
        "id": "op-1",
        "creationTime": "2024-05-30T08:00:00Z",
        "operationKind": "wallet",
        "operationMeta": {"variant": {"deposit": {"address": "bc1qdeposit"}}},
        "outcome": {"Claimed": {"btc_deposited": 50000}}
    });

    let tx = decode_operation_at(&raw, "fed1", true, now());

    assert_eq!(tx.id, "op-1");
    assert_eq!(tx.tx_type, TransactionType::OnchainReceive);
    assert_eq!(tx.amount_msat, 50_000_000);
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(tx.address.as_deref(), Some("bc1qdeposit"));
    assert_eq!(tx.federation_id, "fed1");
    assert_eq!(
        tx.timestamp,
        Utc.with_ymd_and_hms(2024, 5, 30, 8, 0, 0).unwrap()
    );
    assert_eq!(tx.description, "On-chain deposit");
}

#[test]
fn test_address_omitted_unless_requested() {
    let raw = json!({
        "operationKind": "wallet",
        "operationMeta": {"variant": {"deposit": {"address": "bc1qdeposit"}}}
    });

    let tx = decode_operation_at(&raw, "fed1", false, now());
    assert_eq!(tx.address, None);
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.amount_msat, 0);
}

#[test]
fn test_lightning_receive_amount_from_invoice() {
    let raw = json!({
        "operationId": "ln-1",
        "operationKind": "ln",
        "operationMeta": {"variant": {"receive": {"invoice": "lnbc2500u1pvjluezpp5qqqsyq"}}},
        "outcome": "claimed"
    });

    let tx = decode_operation_at(&raw, "fed1", true, now());

    assert_eq!(tx.id, "ln-1");
    assert_eq!(tx.tx_type, TransactionType::LightningReceive);
    assert_eq!(tx.amount_msat, 250_000_000);
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(tx.invoice.as_deref(), Some("lnbc2500u1pvjluezpp5qqqsyq"));
    assert_eq!(tx.address, None);
}

#[test]
fn test_lightning_send_falls_back_to_explicit_amount() {
    let raw = json!({
        "operationKind": "ln",
        "operationMeta": {"variant": {"pay": {"invoice": "lnbc1pvjluez"}}},
        "outcome": {"success": {"preimage": "00"}},
        "amount_msat": 21_000
    });

    let tx = decode_operation_at(&raw, "fed1", false, now());

    assert_eq!(tx.tx_type, TransactionType::LightningSend);
    assert_eq!(tx.amount_msat, 21_000);
    assert_eq!(tx.status, TransactionStatus::Completed);
}

#[test]
fn test_withdraw_amount_in_sats() {
    let raw = json!({
        "operationKind": "wallet",
        "operationMeta": {"variant": {"withdraw": {"address": "bc1qout", "amount_sat": 1200}}},
        "outcome": {"Failed": "insufficient funds"}
    });

    let tx = decode_operation_at(&raw, "fed1", true, now());

    assert_eq!(tx.tx_type, TransactionType::OnchainSend);
    assert_eq!(tx.amount_msat, 1_200_000);
    assert_eq!(tx.status, TransactionStatus::Failed);
    assert_eq!(tx.address.as_deref(), Some("bc1qout"));
}

#[test]
fn test_mint_variants() {
    let spend = json!({
        "operationKind": "mint",
        "operationMeta": {"variant": {"spend_o_o_b": {}}, "amount": 5_000}
    });
    let tx = decode_operation_at(&spend, "fed1", false, now());
    assert_eq!(tx.tx_type, TransactionType::EcashSpend);
    assert_eq!(tx.amount_msat, 5_000);

    let reissue = json!({
        "operationKind": "mint",
        "operationMeta": {"variant": {"reissuance": {}}, "amount": 7_000}
    });
    let tx = decode_operation_at(&reissue, "fed1", false, now());
    assert_eq!(tx.tx_type, TransactionType::EcashMint);
    assert_eq!(tx.amount_msat, 7_000);
}

#[test]
fn test_unknown_kind_defaults_to_ecash_mint() {
    let raw = json!({"operationKind": "stability_pool", "operationMeta": {"variant": "deposit"}});

    let tx = decode_operation_at(&raw, "fed1", false, now());

    assert_eq!(tx.tx_type, TransactionType::EcashMint);
    assert_eq!(tx.amount_msat, 0);
    assert_eq!(tx.status, TransactionStatus::Pending);
}

#[test]
fn test_string_variant_is_classified() {
    let raw = json!({"operation_kind": "ln", "operation_meta": {"variant": "receive"}});

    let tx = decode_operation_at(&raw, "fed1", false, now());
    assert_eq!(tx.tx_type, TransactionType::LightningReceive);
}

#[test]
fn test_missing_id_and_timestamp() {
    let raw = json!({"operationKind": "mint"});

    let tx = decode_operation_at(&raw, "fed1", false, now());

    assert_eq!(tx.timestamp, now());
    assert!(tx.id.starts_with(&format!("fed1-{}-", now().timestamp_millis())));
}

#[test]
fn test_timestamp_formats() {
    let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

    for value in [
        json!("2024-01-02T03:04:05Z"),
        json!("2024-01-02T05:04:05+02:00"),
        json!("2024-01-02 03:04:05"),
        json!("2024-01-02T03:04:05.000"),
        json!(expected.timestamp()),
        json!(expected.timestamp_millis()),
        json!(expected.timestamp().to_string()),
    ] {
        let raw = json!({"operationKind": "mint", "creation_time": value.clone()});
        let tx = decode_operation_at(&raw, "fed1", false, now());
        assert_eq!(tx.timestamp, expected, "failed to parse {}", value);
    }

    let raw = json!({"operationKind": "mint", "timestamp": "yesterday"});
    assert_eq!(decode_operation_at(&raw, "fed1", false, now()).timestamp, now());
}

#[test]
fn test_resolve_status() {
    assert_eq!(resolve_status(None), TransactionStatus::Pending);
    assert_eq!(resolve_status(Some(&json!(null))), TransactionStatus::Pending);
    assert_eq!(resolve_status(Some(&json!("Success"))), TransactionStatus::Completed);
    assert_eq!(resolve_status(Some(&json!("REFUNDED"))), TransactionStatus::Failed);
    assert_eq!(resolve_status(Some(&json!("waiting"))), TransactionStatus::Pending);
    assert_eq!(
        resolve_status(Some(&json!({"Canceled": null}))),
        TransactionStatus::Failed
    );
    assert_eq!(
        resolve_status(Some(&json!({"WaitingForPayment": {}}))),
        TransactionStatus::Pending
    );
    assert_eq!(resolve_status(Some(&json!(42))), TransactionStatus::Pending);
}

#[test]
fn test_explicit_description_wins() {
    let raw = json!({
        "operationKind": "ln",
        "operationMeta": {
            "variant": {"receive": {"invoice": "lnbc10u1p"}},
            "extra_meta": {"description": "coffee"}
        }
    });

    let tx = decode_operation_at(&raw, "fed1", false, now());
    assert_eq!(tx.description, "coffee");
}

#[test]
fn test_transaction_serializes_camel_case() {
    let tx = decode_operation_at(
        &json!({"id": "op", "operationKind": "mint", "outcome": "completed"}),
        "fed1",
        false,
        now(),
    );
    let value = serde_json::to_value(&tx).unwrap();

    assert_eq!(value["type"], "ecash_mint");
    assert_eq!(value["status"], "completed");
    assert_eq!(value["federationId"], "fed1");
    assert!(value.get("address").is_none());
}

#[test]
fn test_sort_newest_first_and_settled_amount() {
    let older = decode_operation_at(
        &json!({"operationKind": "mint", "timestamp": 1_000, "amount_msat": 10}),
        "fed1",
        false,
        now(),
    );
    let newer = decode_operation_at(
        &json!({"operationKind": "mint", "timestamp": 2_000, "amount_msat": 20, "outcome": "success"}),
        "fed1",
        false,
        now(),
    );
    let mut txs = vec![older.clone(), newer.clone()];
    sort_newest_first(&mut txs);

    assert_eq!(txs[0], newer);
    assert_eq!(older.settled_amount_msat(), 0);
    assert_eq!(newer.settled_amount_msat(), 20);
}

#[test]
fn test_transaction_type_names_match_serialized_form() {
    for tx_type in TransactionType::ALL {
        assert_eq!(serde_json::to_value(tx_type).unwrap(), tx_type.as_str());
    }
}
