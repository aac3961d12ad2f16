use proptest::prelude::*;
use rpc_common_core::{CodecConfig, FingerprintMode, Id, Params, Request};
use serde_json::{json, Map, Number, Value};

// ============================================================================
// Strategies
// ============================================================================

fn arb_method() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_.]{0,24}"
}

fn arb_scalar() -> BoxedStrategy<Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[ -~]{0,12}".prop_map(Value::from),
    ]
    .boxed()
}

fn arb_entries() -> impl Strategy<Value = Vec<(String, Value)>> {
    prop::collection::btree_map("[a-z]{1,8}", arb_scalar(), 0..8).prop_map(|map| map.into_iter().collect())
}

fn arb_id() -> BoxedStrategy<Id> {
    prop_oneof![
        any::<i64>().prop_map(Id::from),
        any::<u64>().prop_map(Id::from),
        (-1.0e9f64..1.0e9).prop_filter_map("finite", |f| Number::from_f64(f).map(Id::Number)),
        "[a-zA-Z0-9-]{1,16}".prop_map(Id::String),
        Just(Id::Null),
    ]
    .boxed()
}

fn named(entries: &[(String, Value)]) -> Params {
    let mut map = Map::new();
    for (key, value) in entries {
        map.insert(key.clone(), value.clone());
    }
    Params::from(map)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_fingerprint_is_stable(method in arb_method(), entries in arb_entries()) {
        let request = Request::new(method, named(&entries), None);
        let first = request.fingerprint();

        prop_assert_eq!(first.len(), 32);
        prop_assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        prop_assert_eq!(request.fingerprint(), first);
    }

    #[test]
    fn prop_fingerprint_ignores_id(
        method in arb_method(),
        entries in arb_entries(),
        left in arb_id(),
        right in arb_id(),
    ) {
        let a = Request::new(method.clone(), named(&entries), Some(left));
        let b = Request::new(method, named(&entries), Some(right));

        prop_assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn prop_sorted_fingerprint_ignores_insertion_order(method in arb_method(), entries in arb_entries()) {
        let mut reversed = entries.clone();
        reversed.reverse();

        let config = CodecConfig::new().with_fingerprint(FingerprintMode::SortedKeys);
        let a = Request::new(method.clone(), named(&entries), None);
        let b = Request::new(method, named(&reversed), None);

        prop_assert_eq!(a.fingerprint_with(&config), b.fingerprint_with(&config));
    }

    #[test]
    fn prop_wire_round_trip_keeps_fingerprint(method in arb_method(), entries in arb_entries(), id in arb_id()) {
        let request = Request::new(method, named(&entries), Some(id));
        let decoded = Request::from_wire(request.to_wire()).unwrap();

        prop_assert_eq!(decoded.method(), request.method());
        prop_assert_eq!(decoded.fingerprint(), request.fingerprint());
    }

    #[test]
    fn prop_list_params_append_in_order(values in prop::collection::vec(arb_scalar(), 0..10)) {
        let request = Request::notification("push", Params::default());
        for (index, value) in values.iter().enumerate() {
            request.set(&index.to_string(), value.clone());
        }

        prop_assert_eq!(request.params().into_value(), json!(values));
    }
}
