//! Release codec tests

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{TimeZone, Utc};
use serde_json::json;

use captain::release::codec::{decode_data, DecodeErrorKind};
use captain::release::{
    decode_release, encode_release, Chart, ChartFile, ChartMetadata, Hook, PackageRecord,
    ReleaseField, ReleaseInfo,
};

fn values(value: serde_json::Value) -> helm_crds::Values {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not a mapping: {other}"),
    }
}

fn record() -> PackageRecord {
    PackageRecord {
        name: "web".to_string(),
        namespace: "apps".to_string(),
        version: 4,
        info: ReleaseInfo {
            first_deployed: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()),
            last_deployed: Some(Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 0).unwrap()),
            deleted: None,
            description: "Upgrade complete".to_string(),
            status: "deployed".to_string(),
            notes: "visit http://web.apps".to_string(),
        },
        chart: Chart {
            metadata: ChartMetadata {
                name: "nginx".to_string(),
                version: "1.5.0".to_string(),
                app_version: "1.25".to_string(),
                api_version: "v2".to_string(),
                ..Default::default()
            },
            templates: vec![ChartFile {
                name: "templates/deployment.yaml".to_string(),
                data: b"kind: Deployment\n".to_vec(),
            }],
            values: values(json!({"replicas": 1, "image": {"tag": "1.25"}})),
            ..Default::default()
        },
        config: values(json!({"replicas": 3})),
        hooks: vec![Hook {
            name: "web-migrate".to_string(),
            kind: "Job".to_string(),
            events: vec!["pre-upgrade".to_string()],
            weight: -5,
            ..Default::default()
        }],
        manifest: "---\nkind: Deployment\nmetadata:\n  name: web\n".to_string(),
    }
}

#[test]
fn test_release_round_trip() {
    let record = record();
    let release = encode_release(&record).unwrap();

    assert_eq!(release.metadata.name, "web.v4");
    assert_eq!(release.metadata.labels.get("status").map(String::as_str), Some("deployed"));
    assert_eq!(decode_release(&release).unwrap(), record);
}

#[test]
fn test_floats_decode_exactly() {
    let mut record = record();
    record.config = values(json!({
        "ratio": -1.1193133179981887e-17,
        "limits": {"cpu": 0.1, "scale": 2.2250738585072014e-308, "big": 1.7976931348623157e308},
        "weights": [0.30000000000000004, 1e-7, 3.0],
    }));

    let decoded = decode_release(&encode_release(&record).unwrap()).unwrap();
    assert_eq!(decoded.config["ratio"].as_f64(), Some(-1.1193133179981887e-17));
    assert_eq!(decoded, record);
}

#[test]
fn test_release_survives_json_transport() {
    let release = encode_release(&record()).unwrap();
    let wire = serde_json::to_string(&release).unwrap();
    let parsed: helm_crds::Release = serde_json::from_str(&wire).unwrap();
    assert_eq!(decode_release(&parsed).unwrap(), record());
}

#[test]
fn test_legacy_release_decodes_like_compressed() {
    let record = record();
    let mut legacy = encode_release(&record).unwrap();
    legacy.spec.chart_data = STANDARD.encode(serde_json::to_vec(&record.chart).unwrap());
    legacy.spec.config_data = STANDARD.encode(serde_json::to_vec(&record.config).unwrap());
    legacy.spec.hooks_data = STANDARD.encode(serde_json::to_vec(&record.hooks).unwrap());
    legacy.spec.manifest_data = STANDARD.encode(serde_json::to_vec(&record.manifest).unwrap());

    assert_eq!(decode_release(&legacy).unwrap(), record);
}

#[test]
fn test_corrupt_manifest_names_manifest() {
    let mut release = encode_release(&record()).unwrap();
    release.spec.manifest_data = "not*base64!".to_string();

    let err = decode_release(&release).unwrap_err();
    assert_eq!(err.field, ReleaseField::Manifest);
    assert!(matches!(err.kind, DecodeErrorKind::Base64(_)));
    assert!(err.to_string().contains("manifest"));
}

#[test]
fn test_null_fields_decode_to_empty() {
    let null = STANDARD.encode(b"null");
    let mut release = encode_release(&record()).unwrap();
    release.spec.config_data = null.clone();
    release.spec.hooks_data = null;

    let decoded = decode_release(&release).unwrap();
    assert!(decoded.config.is_empty());
    assert!(decoded.hooks.is_empty());
}

#[test]
fn test_go_style_chart_nulls() {
    let chart = json!({
        "metadata": {"name": "nginx", "version": "1.5.0", "maintainers": [{"name": "ops"}]},
        "templates": null,
        "values": null,
        "schema": null,
        "files": null
    });
    let encoded = STANDARD.encode(serde_json::to_vec(&chart).unwrap());

    let decoded: Chart = decode_data(ReleaseField::Chart, &encoded).unwrap();
    assert_eq!(decoded.metadata.name, "nginx");
    assert!(decoded.metadata.extra.contains_key("maintainers"));
    assert!(decoded.templates.is_empty());
    assert!(decoded.values.is_empty());
    assert!(decoded.schema.is_empty());
}
