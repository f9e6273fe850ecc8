//! HTTP client for the InfraPulse server API.

use crate::CliResult;
use infrapulse_core::{Client, DeviceCategory, DeviceForm, InfraReport};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Server used when neither `--server-url` nor `INFRAPULSE_API_URL` is set.
pub(crate) const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Client row returned by the listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClientSummary {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_at: String,
    pub infra_percent: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct ClientListResponse {
    clients: Vec<ClientSummary>,
}

#[derive(Debug, Serialize)]
struct CreateClientRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateClientResponse {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Device form together with the owning client and score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeviceResponse {
    pub client: Client,
    pub category: DeviceCategory,
    pub form: DeviceForm,
    pub infra_percent: Option<u8>,
}

/// Normalize the server URL for consistent API requests.
pub(crate) fn normalize_server_url(server_url: &str) -> CliResult<String> {
    let trimmed = server_url.trim();
    if trimmed.is_empty() {
        return Err("server url is required".into());
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Build an API URL by appending escaped path segments to the server URL.
fn endpoint(server_url: &str, segments: &[&str]) -> CliResult<Url> {
    let mut url = Url::parse(server_url)?;
    url.path_segments_mut()
        .map_err(|_| "server url cannot carry a path")?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Decode a JSON body, surfacing the server's error message on client errors.
async fn decode<T: DeserializeOwned>(response: Response) -> CliResult<T> {
    let status = response.status();
    if status.is_client_error() {
        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.message)
            .unwrap_or_else(|_| status.to_string());
        return Err(format!("server rejected request ({status}): {message}").into());
    }
    Ok(response.error_for_status()?.json::<T>().await?)
}

/// HTTP client abstraction over the InfraPulse API.
pub(crate) trait InventoryApi {
    fn list_clients<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = CliResult<Vec<ClientSummary>>> + Send + 'a>>;

    fn create_client<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<Client>> + Send + 'a>>;

    fn fetch_device<'a>(
        &'a self,
        slug: &'a str,
        category: DeviceCategory,
    ) -> Pin<Box<dyn Future<Output = CliResult<DeviceResponse>> + Send + 'a>>;

    fn save_device<'a>(
        &'a self,
        slug: &'a str,
        category: DeviceCategory,
        form: &'a DeviceForm,
    ) -> Pin<Box<dyn Future<Output = CliResult<DeviceResponse>> + Send + 'a>>;

    fn fetch_report<'a>(
        &'a self,
        slug: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<InfraReport>> + Send + 'a>>;
}

/// Reqwest-backed API client.
#[cfg_attr(test, allow(dead_code))]
pub(crate) struct ReqwestInventoryApi {
    client: reqwest::Client,
    server_url: String,
}

impl ReqwestInventoryApi {
    /// Build a client for the given server.
    #[cfg_attr(test, allow(dead_code))]
    pub(crate) fn new(server_url: &str) -> CliResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent("infrapulse-cli")
            .build()?;
        Ok(Self {
            client,
            server_url: normalize_server_url(server_url)?,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> CliResult<T> {
        let url = endpoint(&self.server_url, segments)?;
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    async fn list_clients_impl(&self) -> CliResult<Vec<ClientSummary>> {
        let listing: ClientListResponse = self.get_json(&["api", "clients"]).await?;
        Ok(listing.clients)
    }

    async fn create_client_impl(&self, name: &str) -> CliResult<Client> {
        let url = endpoint(&self.server_url, &["api", "clients"])?;
        let response = self
            .client
            .post(url)
            .json(&CreateClientRequest { name })
            .send()
            .await?;
        let created: CreateClientResponse = decode(response).await?;
        Ok(created.client)
    }

    async fn save_device_impl(
        &self,
        slug: &str,
        category: DeviceCategory,
        form: &DeviceForm,
    ) -> CliResult<DeviceResponse> {
        let url = endpoint(
            &self.server_url,
            &["api", "clients", slug, "infrastructure", category.as_str()],
        )?;
        let response = self.client.put(url).json(form).send().await?;
        decode(response).await
    }
}

impl InventoryApi for ReqwestInventoryApi {
    fn list_clients<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = CliResult<Vec<ClientSummary>>> + Send + 'a>> {
        Box::pin(self.list_clients_impl())
    }

    fn create_client<'a>(
        &'a self,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<Client>> + Send + 'a>> {
        Box::pin(self.create_client_impl(name))
    }

    fn fetch_device<'a>(
        &'a self,
        slug: &'a str,
        category: DeviceCategory,
    ) -> Pin<Box<dyn Future<Output = CliResult<DeviceResponse>> + Send + 'a>> {
        Box::pin(async move {
            self.get_json(&["api", "clients", slug, "infrastructure", category.as_str()])
                .await
        })
    }

    fn save_device<'a>(
        &'a self,
        slug: &'a str,
        category: DeviceCategory,
        form: &'a DeviceForm,
    ) -> Pin<Box<dyn Future<Output = CliResult<DeviceResponse>> + Send + 'a>> {
        Box::pin(self.save_device_impl(slug, category, form))
    }

    fn fetch_report<'a>(
        &'a self,
        slug: &'a str,
    ) -> Pin<Box<dyn Future<Output = CliResult<InfraReport>> + Send + 'a>> {
        Box::pin(async move { self.get_json(&["api", "clients", slug, "report"]).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_server_url_trims_trailing_slash() {
        let url = normalize_server_url("http://localhost:8080/").expect("url");
        assert_eq!(url, "http://localhost:8080");
    }

    #[test]
    fn normalize_server_url_rejects_empty() {
        let err = normalize_server_url("   ").unwrap_err();
        assert!(err.to_string().contains("server url"));
    }

    #[test]
    fn endpoint_escapes_segments() {
        let url = endpoint("http://localhost:8080", &["api", "clients", "acme corp"]).expect("url");
        assert_eq!(url.as_str(), "http://localhost:8080/api/clients/acme%20corp");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let url = endpoint("https://ops.example.com/pulse", &["api", "clients"]).expect("url");
        assert_eq!(url.as_str(), "https://ops.example.com/pulse/api/clients");
    }

    #[test]
    fn endpoint_rejects_invalid_urls() {
        assert!(endpoint("not a url", &["api"]).is_err());
        assert!(endpoint("mailto:ops@example.com", &["api"]).is_err());
    }

    #[test]
    fn device_response_reads_server_payload() {
        let payload = r#"{
            "client": {"id": "c1", "name": "Acme", "slug": "acme", "createdAt": "2024-05-01T00:00:00+00:00"},
            "category": "firewall",
            "form": {"sanityIcon": "good", "weight": 9},
            "infraPercent": 100
        }"#;
        let parsed: DeviceResponse = serde_json::from_str(payload).expect("parse");
        assert_eq!(parsed.category, DeviceCategory::Firewall);
        assert_eq!(parsed.form.weight, 9.0);
        assert_eq!(parsed.form.make, "");
        assert_eq!(parsed.infra_percent, Some(100));
    }
}
