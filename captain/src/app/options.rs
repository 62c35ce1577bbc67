//! Command options shared by create and upgrade

use std::time::Duration;

use tracing::warn;

use helm_crds::{
    ChartSource, ChartSourceHttp, ChartSourceOci, ConfigMapKeySelector, HelmRequestSpec,
    ResourceId, ValuesFromSource,
};

use crate::errors::CaptainError;
use crate::kube::api::ValueSourceStore;
use crate::values::ValueOptions;
use crate::watch::{WatchOptions, DEFAULT_FAILURE_TOLERANCE};

/// Key a referenced ConfigMap must hold the values under
pub const VALUES_CONFIG_MAP_KEY: &str = "values.yaml";

/// Options of `create`
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Chart reference, `<repo>/<chart>`
    pub chart: String,
    pub version: String,
    pub values: ValueOptions,
    /// ConfigMap to obtain values from
    pub config_map: Option<String>,
    pub source: SourceOptions,
    pub wait: WaitOptions,
}

/// Options of `upgrade`
#[derive(Debug, Clone, Default)]
pub struct UpgradeOptions {
    pub version: Option<String>,
    /// Chart repo replacing the current one
    pub repo: Option<String>,
    pub values: ValueOptions,
    /// Replace the stored values instead of merging into them
    pub replace_values: bool,
    pub config_map: Option<String>,
    pub source: SourceOptions,
    pub wait: WaitOptions,
}

/// Chart source given with `--source-*`
#[derive(Debug, Clone, Default)]
pub struct SourceOptions {
    /// `chart`, `http` or `oci`; empty means a chart repo
    pub source_type: String,
    pub address: String,
    pub secret_ref: String,
}

impl SourceOptions {
    /// Chart source for the spec, `None` for plain chart repos
    pub fn to_chart_source(&self) -> Result<Option<ChartSource>, CaptainError> {
        match self.source_type.to_lowercase().as_str() {
            "" | "chart" => Ok(None),
            "http" => Ok(Some(ChartSource {
                http: Some(ChartSourceHttp {
                    url: self.address.clone(),
                    secret_ref: self.secret_ref.clone(),
                }),
                oci: None,
            })),
            "oci" => Ok(Some(ChartSource {
                http: None,
                oci: Some(ChartSourceOci {
                    repo: self.address.clone(),
                    secret_ref: self.secret_ref.clone(),
                }),
            })),
            other => Err(CaptainError::ConfigError(format!(
                "unknown source type {other}, expected one of CHART, HTTP, OCI"
            ))),
        }
    }

    /// Set the source on `spec`, leaving it alone for chart repos
    pub fn apply(&self, spec: &mut HelmRequestSpec) -> Result<(), CaptainError> {
        if let Some(source) = self.to_chart_source()? {
            if self.address.is_empty() {
                warn!("--source-type given without --source-address");
            }
            spec.source = Some(source);
        }
        Ok(())
    }
}

/// `--wait`, `--timeout` and `--failure-tolerance`
#[derive(Debug, Clone, Default)]
pub struct WaitOptions {
    pub wait: bool,
    /// Seconds, 0 waits forever
    pub timeout_secs: u64,
    pub failure_tolerance: Option<u32>,
}

impl WaitOptions {
    /// Watch settings; without an explicit tolerance, the timeout in seconds
    /// doubles as the tolerance
    pub fn watch_options(&self) -> WatchOptions {
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        let failure_tolerance = self.failure_tolerance.unwrap_or(if self.timeout_secs > 0 {
            u32::try_from(self.timeout_secs).unwrap_or(u32::MAX)
        } else {
            DEFAULT_FAILURE_TOLERANCE
        });

        WatchOptions {
            timeout,
            failure_tolerance,
            ..Default::default()
        }
    }
}

/// Point `spec` at a ConfigMap holding values, after checking it exists
pub async fn apply_config_map<S: ValueSourceStore + ?Sized>(
    sources: &S,
    namespace: &str,
    name: &str,
    spec: &mut HelmRequestSpec,
) -> Result<(), CaptainError> {
    sources
        .get_config_map(&ResourceId::new(namespace, name))
        .await
        .map_err(|e| CaptainError::NotFound(format!("ref configmap {name} not exist: {e}")))?;

    spec.values_from = vec![ValuesFromSource {
        config_map_key_ref: Some(ConfigMapKeySelector {
            name: name.to_string(),
            key: VALUES_CONFIG_MAP_KEY.to_string(),
            optional: Some(false),
        }),
    }];
    Ok(())
}
