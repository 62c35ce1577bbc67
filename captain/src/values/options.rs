//! Layered value sources given on the command line

use std::path::Path;

use serde_json::{Map, Number, Value};
use tracing::debug;
use url::Url;

use helm_crds::Values;

use crate::errors::CaptainError;
use crate::values::merge::merge_values;
use crate::values::strvals;

/// Values passed with `-f/--values` and `--set`
#[derive(Debug, Clone, Default)]
pub struct ValueOptions {
    /// Local paths or http(s) URLs of YAML files
    pub value_files: Vec<String>,

    /// `key=value` overrides
    pub values: Vec<String>,
}

impl ValueOptions {
    /// Merge every layer: value files in order, then `--set` arguments
    pub async fn merge_values(&self) -> Result<Values, CaptainError> {
        let mut base = Values::new();

        for location in &self.value_files {
            let current = read_values_file(location).await?;
            base = merge_values(&base, &current);
        }

        for value in &self.values {
            strvals::parse_into(value, &mut base)?;
        }

        Ok(base)
    }
}

/// Read a values file from disk or over HTTP
pub async fn read_values_file(location: &str) -> Result<Values, CaptainError> {
    let contents = match Url::parse(location) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            debug!("Fetching values from {}", url);
            reqwest::get(url)
                .await?
                .error_for_status()?
                .text()
                .await?
        }
        _ => {
            debug!("Reading values from {}", location);
            tokio::fs::read_to_string(Path::new(location))
                .await
                .map_err(|e| {
                    CaptainError::ValuesError(format!("cannot read values file {location}: {e}"))
                })?
        }
    };

    parse_values_yaml(&contents)
        .map_err(|e| CaptainError::ValuesError(format!("failed to parse {location}: {e}")))
}

/// Parse a YAML document into a value tree
///
/// An empty document yields an empty tree; anything other than a mapping is
/// rejected. Scalar mapping keys such as `80` or `true` become strings.
pub fn parse_values_yaml(contents: &str) -> Result<Values, CaptainError> {
    let doc: serde_yaml::Value = serde_yaml::from_str(contents)?;
    match yaml_to_json(doc)? {
        Value::Null => Ok(Values::new()),
        Value::Object(map) => Ok(map),
        _ => Err(CaptainError::ValuesError(
            "document is not a mapping".to_string(),
        )),
    }
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<Value, CaptainError> {
    Ok(match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => Value::Number(yaml_number(&n)?),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = Map::new();
            for (key, value) in mapping {
                map.insert(yaml_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Result<Number, CaptainError> {
    if let Some(i) = n.as_i64() {
        return Ok(Number::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Number::from(u));
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .ok_or_else(|| CaptainError::ValuesError(format!("unsupported number {n}")))
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, CaptainError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(CaptainError::ValuesError(format!(
            "unsupported mapping key {other:?}"
        ))),
    }
}
