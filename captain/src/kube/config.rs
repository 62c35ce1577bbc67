//! Kubeconfig loading

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::errors::CaptainError;

/// Namespace used when neither the flag nor the context sets one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Kubeconfig file as found on disk
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Kubeconfig {
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,

    #[serde(default)]
    pub contexts: Vec<NamedContext>,

    #[serde(default)]
    pub users: Vec<NamedUser>,

    #[serde(default)]
    pub current_context: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: Cluster,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Cluster {
    pub server: String,

    #[serde(default)]
    pub certificate_authority: Option<PathBuf>,

    #[serde(default)]
    pub certificate_authority_data: Option<String>,

    #[serde(default)]
    pub insecure_skip_tls_verify: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: Context,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Context {
    pub cluster: String,

    pub user: String,

    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedUser {
    pub name: String,

    #[serde(default)]
    pub user: AuthInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthInfo {
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default, rename = "tokenFile")]
    pub token_file: Option<PathBuf>,

    #[serde(default, rename = "client-certificate-data")]
    pub client_certificate_data: Option<String>,

    #[serde(default, rename = "client-key-data")]
    pub client_key_data: Option<String>,
}

/// Where to look for the kubeconfig and which context to use
#[derive(Debug, Clone, Default)]
pub struct KubeconfigOptions {
    /// Explicit path, wins over `$KUBECONFIG`
    pub path: Option<PathBuf>,

    /// Context name, defaults to the current context
    pub context: Option<String>,
}

/// Connection settings resolved from a kubeconfig context
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub server: Url,
    pub namespace: Option<String>,
    pub token: Option<SecretString>,
    /// PEM encoded CA bundle
    pub ca_pem: Option<Vec<u8>>,
    /// PEM encoded client certificate followed by its key
    pub identity_pem: Option<Vec<u8>>,
    pub insecure_skip_tls_verify: bool,
}

impl KubeconfigOptions {
    /// Kubeconfig path: the explicit one, then `$KUBECONFIG`, then `~/.kube/config`
    pub fn resolve_path(&self) -> Result<PathBuf, CaptainError> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        if let Some(env) = std::env::var_os("KUBECONFIG") {
            if let Some(first) = std::env::split_paths(&env).find(|p| !p.as_os_str().is_empty()) {
                return Ok(first);
            }
        }
        dirs::home_dir()
            .map(|home| home.join(".kube").join("config"))
            .ok_or_else(|| {
                CaptainError::KubeconfigError("cannot determine home directory".to_string())
            })
    }

    /// Load the kubeconfig and resolve the selected context
    pub async fn load(&self) -> Result<ClusterConfig, CaptainError> {
        let path = self.resolve_path()?;
        debug!("Loading kubeconfig from {}", path.display());

        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            CaptainError::KubeconfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let kubeconfig: Kubeconfig = serde_yaml::from_str(&contents)?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        kubeconfig.resolve(self.context.as_deref(), base_dir).await
    }
}

impl Kubeconfig {
    /// Resolve a context; relative file references are taken from `base_dir`
    pub async fn resolve(
        &self,
        context: Option<&str>,
        base_dir: &Path,
    ) -> Result<ClusterConfig, CaptainError> {
        let context_name = context
            .map(str::to_string)
            .or_else(|| self.current_context.clone())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CaptainError::KubeconfigError("no context selected".to_string()))?;

        let context = self
            .contexts
            .iter()
            .find(|c| c.name == context_name)
            .map(|c| &c.context)
            .ok_or_else(|| {
                CaptainError::KubeconfigError(format!("context {context_name} not found"))
            })?;

        let cluster = self
            .clusters
            .iter()
            .find(|c| c.name == context.cluster)
            .map(|c| &c.cluster)
            .ok_or_else(|| {
                CaptainError::KubeconfigError(format!("cluster {} not found", context.cluster))
            })?;

        let user = self
            .users
            .iter()
            .find(|u| u.name == context.user)
            .map(|u| u.user.clone())
            .unwrap_or_default();

        let server = Url::parse(&cluster.server).map_err(|e| {
            CaptainError::KubeconfigError(format!("invalid server {}: {}", cluster.server, e))
        })?;

        let ca_pem = match (&cluster.certificate_authority_data, &cluster.certificate_authority) {
            (Some(data), _) => Some(decode_pem_data("certificate-authority-data", data)?),
            (None, Some(file)) => Some(tokio::fs::read(base_dir.join(file)).await?),
            (None, None) => None,
        };

        let token = match (&user.token, &user.token_file) {
            (Some(token), _) => Some(token.clone()),
            (None, Some(file)) => Some(
                tokio::fs::read_to_string(base_dir.join(file))
                    .await?
                    .trim()
                    .to_string(),
            ),
            (None, None) => None,
        };

        let identity_pem = match (&user.client_certificate_data, &user.client_key_data) {
            (Some(cert), Some(key)) => {
                let mut pem = decode_pem_data("client-certificate-data", cert)?;
                pem.push(b'\n');
                pem.extend(decode_pem_data("client-key-data", key)?);
                Some(pem)
            }
            _ => None,
        };

        Ok(ClusterConfig {
            server,
            namespace: context.namespace.clone().filter(|ns| !ns.is_empty()),
            token: token.map(SecretString::from),
            ca_pem,
            identity_pem,
            insecure_skip_tls_verify: cluster.insecure_skip_tls_verify,
        })
    }
}

fn decode_pem_data(field: &str, data: &str) -> Result<Vec<u8>, CaptainError> {
    STANDARD
        .decode(data.trim())
        .map_err(|e| CaptainError::KubeconfigError(format!("invalid {field}: {e}")))
}
