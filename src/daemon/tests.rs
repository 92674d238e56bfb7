use serde_json::json;

use super::*;

#[test]
fn test_decode_info_map_to_list() {
    let info = decode_info(json!({
        "fed-a": {
            "totalAmountMsat": 150000,
            "meta": {"federation_name": "Alpha", "meta_external_url": "https://alpha.example"},
            "network": "signet"
        },
        "fed-b": {
            "totalAmountMsat": "not a number"
        }
    }));

    assert_eq!(info.len(), 2);

    let alpha = &info[0];
    assert_eq!(alpha.federation_id, "fed-a");
    assert_eq!(alpha.total_amount_msat, 150000);
    assert_eq!(alpha.name, "Alpha");
    assert_eq!(alpha.network, "signet");
    assert_eq!(
        alpha.meta.get("meta_external_url").map(String::as_str),
        Some("https://alpha.example")
    );

    let beta = &info[1];
    assert_eq!(beta.federation_id, "fed-b");
    assert_eq!(beta.total_amount_msat, 0);
    assert_eq!(beta.name, UNNAMED_FEDERATION);
    assert_eq!(beta.network, UNKNOWN_NETWORK);
    assert!(beta.meta.is_empty());
}

#[test]
fn test_decode_info_rejects_non_object() {
    assert!(decode_info(json!([1, 2, 3])).is_empty());
    assert!(decode_info(json!(null)).is_empty());
}

#[test]
fn test_decode_gateways() {
    let gateways = decode_gateways(json!([
        {
            "info": {
                "gateway_id": "gw1",
                "node_pub_key": "02abc",
                "api": "https://gw.example",
                "fees": {"base_msat": 1000, "proportional_millionths": 100},
                "lightning_alias": "Gateway One",
                "mint_channel_id": 7,
                "supports_private_payments": true
            },
            "vetted": true
        },
        {"vetted": "false"}
    ]));

    assert_eq!(gateways.len(), 2);
    assert_eq!(gateways[0].gateway_id, "gw1");
    assert_eq!(gateways[0].fees.base_msat, 1000);
    assert_eq!(gateways[0].fees.proportional_millionths, 100);
    assert_eq!(gateways[0].mint_channel_id, 7);
    assert!(gateways[0].supports_private_payments);
    assert!(gateways[0].vetted);

    assert_eq!(gateways[1], GatewayInfo::default());
}

#[test]
fn test_decode_gateways_wrapped_and_garbage() {
    let wrapped = decode_gateways(json!({"gateways": [{"info": {"gateway_id": "gw2"}}]}));
    assert_eq!(wrapped.len(), 1);
    assert_eq!(wrapped[0].gateway_id, "gw2");

    assert!(decode_gateways(json!("nope")).is_empty());
}

#[test]
fn test_decode_balance_shapes() {
    assert_eq!(decode_balance(json!(2500)), Some(2500));
    assert_eq!(decode_balance(json!({"balance_msat": 42})), Some(42));
    assert_eq!(decode_balance(json!({"other": 1})), None);
    assert_eq!(decode_balance(json!(true)), None);
}

#[test]
fn test_decode_operations_shapes() {
    assert_eq!(decode_operations(json!({"operations": [{"id": "a"}]})).len(), 1);
    assert_eq!(decode_operations(json!([{"id": "a"}, {"id": "b"}])).len(), 2);
    assert!(decode_operations(json!({"operations": "nope"})).is_empty());
}

#[test]
fn test_decode_address_and_invoice() {
    let address = decode_deposit_address(json!({"address": "bc1qxyz", "operationId": "op1"}));
    assert_eq!(address.address, "bc1qxyz");
    assert_eq!(address.operation_id.as_deref(), Some("op1"));

    let invoice = decode_invoice(json!({"invoice": "lnbc10u1p"}));
    assert_eq!(invoice.invoice, "lnbc10u1p");
    assert!(invoice.operation_id.is_none());
}
