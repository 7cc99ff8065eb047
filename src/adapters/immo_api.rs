use crate::config::ApiConfig;
use crate::domain::ports::ListingSource;
use crate::utils::error::{EtlError, Result};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;

/// Client for the property-management API: site token + product search.
pub struct ImmoApiClient {
    client: Client,
    base_url: String,
    site_id: String,
    client_id: String,
    client_secret: String,
    fetch_resources: String,
    page_size: usize,
}

impl ImmoApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            site_id: config.site_id.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            fetch_resources: config.fetch_resources.join(","),
            page_size: config.page_size,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

/// Turns a non-2xx answer into a fatal [`EtlError::HttpStatus`].
pub(crate) async fn ensure_success(endpoint: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!("❌ {} answered {}", endpoint, status);
    Err(EtlError::HttpStatus {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        body,
    })
}

impl ListingSource for ImmoApiClient {
    async fn fetch_token(&self) -> Result<String> {
        let url = self.endpoint("client/token/site");
        tracing::debug!("Requesting site token from {} (site {})", url, self.site_id);

        let response = self
            .client
            .post(&url)
            .query(&[("site_id", self.site_id.as_str())])
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .send()
            .await?;
        let response = ensure_success(&url, response).await?;

        let body: Value = response.json().await?;
        match body.get("access_token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => {
                tracing::info!("✅ Token retrieved");
                Ok(token.to_string())
            }
            _ => Err(EtlError::AuthError {
                message: format!("{} returned no access_token", url),
            }),
        }
    }

    async fn fetch_products(&self, token: &str) -> Result<Vec<Value>> {
        let url = self.endpoint("site/products/search");
        let count = self.page_size.to_string();
        tracing::debug!("Searching products at {} (count={})", url, count);

        // Empty filter body: every product of the site.
        let response = self
            .client
            .post(&url)
            .query(&[("fetch", self.fetch_resources.as_str()), ("count", count.as_str())])
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let response = ensure_success(&url, response).await?;

        match response.json::<Value>().await? {
            Value::Array(products) => {
                tracing::info!("✅ {} products retrieved", products.len());
                Ok(products)
            }
            other => Err(EtlError::ProcessingError {
                message: format!(
                    "Product search returned {} instead of an array",
                    json_kind(&other)
                ),
            }),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
