//! API server client

use std::time::Duration;

use reqwest::{header, Certificate, Client, Identity, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use crate::errors::CaptainError;
use crate::kube::config::ClusterConfig;

/// HTTP client for the cluster API server
pub struct KubeClient {
    client: Client,
    base_url: String,
    token: Option<SecretString>,
}

impl KubeClient {
    /// Create a client for the resolved cluster
    pub fn new(config: &ClusterConfig) -> Result<Self, CaptainError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(30))
            .danger_accept_invalid_certs(config.insecure_skip_tls_verify);

        if let Some(pem) = &config.ca_pem {
            for cert in Certificate::from_pem_bundle(pem)? {
                builder = builder.add_root_certificate(cert);
            }
        }
        if let Some(pem) = &config.identity_pem {
            builder = builder.identity(Identity::from_pem(pem)?);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.server.as_str().trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            ),
            None => request,
        }
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CaptainError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let request = self.authorize(self.client.get(&url).query(query));
        let response = check_status("GET", request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CaptainError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let request = self.authorize(self.client.post(&url).json(body));
        let response = check_status("POST", request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Make a PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CaptainError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("PUT {}", url);

        let request = self.authorize(self.client.put(&url).json(body));
        let response = check_status("PUT", request.send().await?).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(method: &str, response: Response) -> Result<Response, CaptainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::NOT_FOUND {
        debug!("{} {} not found", method, url);
        return Err(CaptainError::NotFound(url));
    }

    error!("HTTP {} failed: {} - {}", method, status, body);
    Err(CaptainError::ApiError {
        status: status.as_u16(),
        body,
    })
}

/// Path of a namespaced collection
pub(crate) fn collection_path(group_version: &str, namespace: &str, plural: &str) -> String {
    if group_version == "v1" {
        format!("/api/v1/namespaces/{}/{}", namespace, plural)
    } else {
        format!("/apis/{}/namespaces/{}/{}", group_version, namespace, plural)
    }
}
