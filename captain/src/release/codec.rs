//! Release codec
//!
//! Each data field of a stored release is JSON, gzip compressed at the best
//! level and base64 encoded. Releases written before compression was
//! introduced hold base64 of the raw JSON; both forms decode.

use std::fmt;
use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use helm_crds::{ObjectMeta, Release, ReleaseSpec, ReleaseStatus, APP_API_VERSION};

use crate::errors::CaptainError;
use crate::release::record::{PackageRecord, ReleaseInfo};

/// gzip member header: magic bytes plus the deflate method
pub const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Encoded data fields of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseField {
    Chart,
    Config,
    Hooks,
    Manifest,
}

impl fmt::Display for ReleaseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseField::Chart => "chart",
            ReleaseField::Config => "config",
            ReleaseField::Hooks => "hooks",
            ReleaseField::Manifest => "manifest",
        };
        f.write_str(name)
    }
}

/// Stage of decoding that failed
#[derive(Error, Debug)]
pub enum DecodeErrorKind {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("corrupt gzip stream: {0}")]
    Decompress(#[from] std::io::Error),

    #[error("malformed payload: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Failure to decode one field of a release
#[derive(Error, Debug)]
#[error("failed to decode {field} data: {kind}")]
pub struct DecodeError {
    pub field: ReleaseField,
    #[source]
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    fn new(field: ReleaseField, kind: impl Into<DecodeErrorKind>) -> Self {
        Self {
            field,
            kind: kind.into(),
        }
    }
}

/// A base64-decoded field, classified once by its leading bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Compressed(Vec<u8>),
    /// Written before compression was introduced
    Legacy(Vec<u8>),
}

impl Payload {
    pub fn sniff(bytes: Vec<u8>) -> Self {
        if bytes.starts_with(&GZIP_MAGIC) {
            Payload::Compressed(bytes)
        } else {
            Payload::Legacy(bytes)
        }
    }

    /// The JSON bytes carried by this payload
    pub fn into_json(self) -> Result<Vec<u8>, std::io::Error> {
        match self {
            Payload::Compressed(bytes) => {
                let mut out = Vec::new();
                GzDecoder::new(bytes.as_slice()).read_to_end(&mut out)?;
                Ok(out)
            }
            Payload::Legacy(bytes) => Ok(bytes),
        }
    }
}

/// Encode a value the way release data fields are stored
pub fn encode_data<T: Serialize + ?Sized>(value: &T) -> Result<String, CaptainError> {
    let json = serde_json::to_vec(value)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;
    Ok(STANDARD.encode(compressed))
}

/// Decode one data field into `T`
///
/// `null` decodes to `T::default()`, matching how nil slices and maps are
/// written.
pub fn decode_data<T>(field: ReleaseField, data: &str) -> Result<T, DecodeError>
where
    T: DeserializeOwned + Default,
{
    let raw = STANDARD
        .decode(data)
        .map_err(|e| DecodeError::new(field, e))?;
    let json = Payload::sniff(raw)
        .into_json()
        .map_err(|e| DecodeError::new(field, e))?;

    let value: Option<T> = serde_json::from_slice(&json).map_err(|e| {
        if field == ReleaseField::Hooks {
            error!("decode hooks data error: {}", String::from_utf8_lossy(&json));
        }
        DecodeError::new(field, e)
    })?;
    Ok(value.unwrap_or_default())
}

/// Decode a stored release into a package record
pub fn decode_release(release: &Release) -> Result<PackageRecord, DecodeError> {
    debug!(
        "Decoding release {} (version {})",
        release.spec.name, release.spec.version
    );

    let spec = &release.spec;
    Ok(PackageRecord {
        name: spec.name.clone(),
        namespace: release.metadata.namespace.clone(),
        version: spec.version,
        info: ReleaseInfo::from(&release.status),
        chart: decode_data(ReleaseField::Chart, &spec.chart_data)?,
        config: decode_data(ReleaseField::Config, &spec.config_data)?,
        hooks: decode_data(ReleaseField::Hooks, &spec.hooks_data)?,
        manifest: decode_data(ReleaseField::Manifest, &spec.manifest_data)?,
    })
}

/// Encode a package record into the stored release shape
pub fn encode_release(record: &PackageRecord) -> Result<Release, CaptainError> {
    let mut metadata = ObjectMeta::named(
        release_key(&record.name, record.version),
        record.namespace.clone(),
    );
    metadata
        .labels
        .insert("name".to_string(), record.name.clone());
    if !record.info.status.is_empty() {
        metadata
            .labels
            .insert("status".to_string(), record.info.status.clone());
    }

    Ok(Release {
        api_version: APP_API_VERSION.to_string(),
        kind: "Release".to_string(),
        metadata,
        spec: ReleaseSpec {
            name: record.name.clone(),
            version: record.version,
            chart_data: encode_data(&record.chart)?,
            config_data: encode_data(&record.config)?,
            hooks_data: encode_data(&record.hooks)?,
            manifest_data: encode_data(&record.manifest)?,
        },
        status: ReleaseStatus::from(&record.info),
    })
}

/// Object name of a stored release, `<name>.v<version>`
pub fn release_key(name: &str, version: i32) -> String {
    format!("{}.v{}", name, version)
}
