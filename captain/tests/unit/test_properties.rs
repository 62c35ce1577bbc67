//! Property tests for the release codec and value merging

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use proptest::prelude::*;
use serde_json::Value;

use captain::release::{
    decode_release, encode_release, Chart, ChartFile, ChartMetadata, Hook, PackageRecord,
    ReleaseInfo,
};
use captain::values::merge_values;
use helm_crds::Values;

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite floats only", |f| f.is_finite())
            .prop_map(Value::from),
        "\\PC{0,16}".prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z_.-]{1,8}", inner, 0..5)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn arb_values() -> impl Strategy<Value = Values> {
    prop::collection::btree_map("[a-zA-Z_.-]{1,8}", arb_value(), 0..6)
        .prop_map(|map| map.into_iter().collect())
}

fn arb_hook() -> impl Strategy<Value = Hook> {
    (
        "[a-z][a-z0-9-]{0,12}",
        prop::sample::select(vec!["Job", "Pod", "ConfigMap"]),
        "\\PC{0,64}",
        prop::collection::vec(
            prop::sample::select(vec!["pre-install", "post-install", "pre-upgrade", "post-upgrade"])
                .prop_map(String::from),
            0..3,
        ),
        -10i32..10,
    )
        .prop_map(|(name, kind, manifest, events, weight)| Hook {
            name,
            kind: kind.to_string(),
            manifest,
            events,
            weight,
            ..Default::default()
        })
}

fn arb_chart() -> impl Strategy<Value = Chart> {
    (
        "[a-z][a-z0-9-]{0,12}",
        "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}",
        prop::collection::vec(
            ("templates/[a-z]{1,8}\\.yaml", prop::collection::vec(any::<u8>(), 0..64))
                .prop_map(|(name, data)| ChartFile { name, data }),
            0..3,
        ),
        arb_values(),
        prop::collection::vec(any::<u8>(), 0..32),
    )
        .prop_map(|(name, version, templates, values, schema)| Chart {
            metadata: ChartMetadata {
                name,
                version,
                ..Default::default()
            },
            templates,
            values,
            schema,
            ..Default::default()
        })
}

fn arb_record() -> impl Strategy<Value = PackageRecord> {
    (
        "[a-z][a-z0-9-]{0,12}",
        "[a-z][a-z0-9-]{0,12}",
        1i32..1000,
        prop::sample::select(vec!["", "deployed", "superseded", "failed"]),
        arb_chart(),
        arb_values(),
        prop::collection::vec(arb_hook(), 0..4),
        "\\PC{0,256}",
    )
        .prop_map(
            |(name, namespace, version, status, chart, config, hooks, manifest)| PackageRecord {
                name,
                namespace,
                version,
                info: ReleaseInfo {
                    status: status.to_string(),
                    ..Default::default()
                },
                chart,
                config,
                hooks,
                manifest,
            },
        )
}

proptest! {
    #[test]
    fn test_release_round_trips(record in arb_record()) {
        let release = encode_release(&record).unwrap();
        prop_assert_eq!(decode_release(&release).unwrap(), record);
    }

    #[test]
    fn test_legacy_fields_decode_like_compressed(record in arb_record()) {
        let compressed = encode_release(&record).unwrap();
        let mut legacy = compressed.clone();
        legacy.spec.chart_data = STANDARD.encode(serde_json::to_vec(&record.chart).unwrap());
        legacy.spec.config_data = STANDARD.encode(serde_json::to_vec(&record.config).unwrap());
        legacy.spec.hooks_data = STANDARD.encode(serde_json::to_vec(&record.hooks).unwrap());
        legacy.spec.manifest_data = STANDARD.encode(serde_json::to_vec(&record.manifest).unwrap());

        prop_assert_eq!(
            decode_release(&legacy).unwrap(),
            decode_release(&compressed).unwrap()
        );
    }

    #[test]
    fn test_merge_with_empty_is_identity(x in arb_values()) {
        prop_assert_eq!(merge_values(&x, &Values::new()), x.clone());
        prop_assert_eq!(merge_values(&Values::new(), &x), x);
    }

    #[test]
    fn test_merge_is_idempotent(x in arb_values()) {
        prop_assert_eq!(merge_values(&x, &x), x);
    }

    #[test]
    fn test_merge_keeps_every_override_key(base in arb_values(), overrides in arb_values()) {
        let merged = merge_values(&base, &overrides);
        for (key, value) in &overrides {
            match (base.get(key), value) {
                (Some(Value::Object(_)), Value::Object(_)) => {
                    prop_assert!(merged[key].is_object());
                }
                _ => prop_assert_eq!(&merged[key], value),
            }
        }
        for key in base.keys() {
            prop_assert!(merged.contains_key(key));
        }
    }
}
