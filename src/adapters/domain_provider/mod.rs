use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::domain_settings::DnsRecord,
    use_cases::domain_settings::{
        DomainProvider, ProviderDomainStatus, ProviderRegistration,
    },
};

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// HTTP client for the external domain registration and verification API.
#[derive(Clone)]
pub struct HttpDomainProvider {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl HttpDomainProvider {
    pub fn new(base_url: String, api_key: SecretString) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("failed to build reqwest client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[derive(Deserialize)]
struct RegisterDomainResponse {
    id: String,
    #[serde(default)]
    dns_records: Vec<DnsRecordPayload>,
}

#[derive(Deserialize)]
struct DnsRecordPayload {
    #[serde(rename = "type")]
    record_type: String,
    host: String,
    value: String,
}

#[derive(Deserialize)]
struct DomainStatusResponse {
    dns_verified: bool,
    ssl_issued: bool,
}

#[derive(Deserialize, Default)]
struct ProviderErrorBody {
    #[serde(default)]
    message: String,
}

#[async_trait]
impl DomainProvider for HttpDomainProvider {
    async fn register_domain(&self, hostname: &str) -> AppResult<ProviderRegistration> {
        let url = format!("{}/v1/domains", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&serde_json::json!({ "hostname": hostname }))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(classify_failure(response).await);
        }

        let body: RegisterDomainResponse = response.json().await.map_err(transport_error)?;
        Ok(ProviderRegistration {
            provider_id: body.id,
            dns_records: body
                .dns_records
                .into_iter()
                .map(|r| DnsRecord {
                    record_type: r.record_type,
                    host: r.host,
                    value: r.value,
                })
                .collect(),
        })
    }

    async fn domain_status(&self, provider_domain_id: &str) -> AppResult<ProviderDomainStatus> {
        let url = format!("{}/v1/domains/{}", self.base_url, provider_domain_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(classify_failure(response).await);
        }

        let body: DomainStatusResponse = response.json().await.map_err(transport_error)?;
        Ok(ProviderDomainStatus {
            dns_verified: body.dns_verified,
            ssl_issued: body.ssl_issued,
        })
    }
}

/// Network and timeout failures are retryable on the next poll tick.
fn transport_error(err: reqwest::Error) -> AppError {
    AppError::ProviderTransport(err.to_string())
}

/// 5xx responses are treated as transient provider trouble; everything else
/// is a permanent rejection (e.g., the hostname is claimed elsewhere).
async fn classify_failure(response: reqwest::Response) -> AppError {
    let status = response.status();
    if status.is_server_error() {
        return AppError::ProviderTransport(format!("provider returned {status}"));
    }

    let message = response
        .json::<ProviderErrorBody>()
        .await
        .unwrap_or_default()
        .message;
    if message.is_empty() {
        AppError::ProviderRejected(format!("provider returned {status}"))
    } else {
        AppError::ProviderRejected(message)
    }
}
