//! Property-based tests using proptest
//!
//! These tests verify collection decoding fidelity and the request URL
//! layout using randomized inputs.

use digo::api::http::build_url;
use digo::api::{Credentials, RegionsResponse, SshKeysResponse};
use proptest::prelude::*;
use serde_json::{json, Value};

/// Generate an arbitrary (id, name) record
fn arb_record() -> impl Strategy<Value = (u64, String)> {
    (1u64..10_000_000, "[A-Za-z0-9 ._-]{0,40}")
}

fn arb_record_list() -> impl Strategy<Value = Vec<(u64, String)>> {
    prop::collection::vec(arb_record(), 0..50)
}

fn to_json(records: &[(u64, String)]) -> Vec<Value> {
    records
        .iter()
        .map(|(id, name)| json!({"id": id, "name": name}))
        .collect()
}

proptest! {
    /// Decoded collection length and fields match the source array
    #[test]
    fn ssh_keys_decode_faithfully(records in arb_record_list()) {
        let body = json!({"status": "OK", "ssh_keys": to_json(&records)}).to_string();
        let rsp: SshKeysResponse = serde_json::from_str(&body).unwrap();

        prop_assert_eq!(rsp.ssh_keys.len(), records.len());
        for (key, (id, name)) in rsp.ssh_keys.iter().zip(&records) {
            prop_assert_eq!(key.id, *id);
            prop_assert_eq!(&key.name, name);
        }
    }

    /// Unknown fields on records are ignored
    #[test]
    fn regions_ignore_extra_fields(records in arb_record_list()) {
        let regions: Vec<Value> = records
            .iter()
            .map(|(id, name)| json!({"id": id, "name": name, "available": true}))
            .collect();
        let body = json!({"status": "OK", "regions": regions}).to_string();
        let rsp: RegionsResponse = serde_json::from_str(&body).unwrap();

        prop_assert_eq!(rsp.regions.len(), records.len());
        prop_assert!(rsp.regions.iter().zip(&records).all(|(r, (id, _))| r.id == *id));
    }

    /// Exactly one '?' appears, credentials always come last
    #[test]
    fn url_has_single_query_separator(
        segment in "[a-z_]{1,12}",
        id in 1u64..100_000,
        with_query in any::<bool>(),
        client_id in "[a-z0-9]{1,16}",
        api_key in "[A-Za-z0-9]{1,32}",
    ) {
        let path = if with_query {
            format!("/{}/{}?image_id={}", segment, id, id)
        } else {
            format!("/{}/{}", segment, id)
        };
        let url = build_url("https://api.example.com", &path, &Credentials::new(client_id.clone(), api_key.clone()));

        prop_assert_eq!(url.matches('?').count(), 1);
        let expected_suffix = format!("client_id={}&api_key={}", client_id, api_key);
        prop_assert!(url.ends_with(&expected_suffix));
        let expected_prefix = format!("https://api.example.com{}", path);
        prop_assert!(url.starts_with(&expected_prefix));
    }
}
