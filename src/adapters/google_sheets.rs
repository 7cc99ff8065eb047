//! Google Sheets REST v4 destination.
//!
//! The data tab is fully replaced on every run (clear, resize to the table,
//! write from `A1`). The export time goes to a separate tab that is created
//! on first use.

use crate::adapters::immo_api::ensure_success;
use crate::config::{ClearMode, SheetConfig};
use crate::domain::model::NormalizedTable;
use crate::domain::ports::{AccessTokenProvider, TableSink};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use google_cloud_auth::credentials::CredentialsFile;
use google_cloud_auth::project::Config;
use google_cloud_auth::token::DefaultTokenSourceProvider;
use google_cloud_token::{TokenSource, TokenSourceProvider};
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

pub const SHEETS_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

const META_TAB_ROWS: usize = 10;
const META_TAB_COLUMNS: usize = 2;

/// Bearer tokens minted from a service-account key file.
pub struct ServiceAccountTokens {
    credential_path: String,
    source: OnceCell<Arc<dyn TokenSource>>,
}

impl ServiceAccountTokens {
    pub fn new(credential_path: impl Into<String>) -> Self {
        Self {
            credential_path: credential_path.into(),
            source: OnceCell::new(),
        }
    }

    async fn token_source(&self) -> Result<&Arc<dyn TokenSource>> {
        self.source
            .get_or_try_init(|| async {
                let credentials = CredentialsFile::new_from_file(self.credential_path.clone())
                    .await
                    .map_err(|e| EtlError::AuthError {
                        message: format!(
                            "cannot load service account from {}: {}",
                            self.credential_path, e
                        ),
                    })?;
                let provider = DefaultTokenSourceProvider::new_with_credentials(
                    Config::default().with_scopes(SHEETS_SCOPES),
                    Box::new(credentials),
                )
                .await
                .map_err(|e| EtlError::AuthError {
                    message: format!("cannot build token source: {}", e),
                })?;
                tracing::debug!("Service account loaded from {}", self.credential_path);
                Ok::<_, EtlError>(provider.token_source())
            })
            .await
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountTokens {
    async fn access_token(&self) -> Result<String> {
        let bearer = self
            .token_source()
            .await?
            .token()
            .await
            .map_err(|e| EtlError::AuthError {
                message: format!("token request failed: {}", e),
            })?;
        Ok(bearer
            .strip_prefix("Bearer ")
            .unwrap_or(&bearer)
            .to_string())
    }
}

/// Fixed token, for tests and for tokens minted outside this process.
pub struct StaticToken(pub String);

#[async_trait]
impl AccessTokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Clone, Deserialize)]
struct SheetProperties {
    #[serde(rename = "sheetId", default)]
    sheet_id: i64,
    title: String,
}

pub struct GoogleSheetsSink<T: AccessTokenProvider> {
    client: Client,
    base_url: Url,
    spreadsheet_id: String,
    data_tab: String,
    meta_tab: String,
    meta_label: String,
    clear_mode: ClearMode,
    tokens: T,
}

impl<T: AccessTokenProvider> GoogleSheetsSink<T> {
    pub fn new(config: &SheetConfig, tokens: T) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }
        let base_url = Url::parse(&config.sheets_base_url).map_err(|e| {
            EtlError::InvalidConfigValueError {
                field: "sheet.sheets_base_url".to_string(),
                value: config.sheets_base_url.clone(),
                reason: e.to_string(),
            }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(EtlError::InvalidConfigValueError {
                field: "sheet.sheets_base_url".to_string(),
                value: config.sheets_base_url.clone(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            spreadsheet_id: config.sheet_id.clone(),
            data_tab: config.sheet_tab.clone(),
            meta_tab: config.meta_tab.clone(),
            meta_label: config.meta_label.clone(),
            clear_mode: config.clear_mode,
            tokens,
        })
    }

    /// `{base}/spreadsheets/{id}{suffix}` followed by `segments`.
    fn spreadsheet_url(&self, suffix: &str, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("spreadsheets")
                .push(&format!("{}{}", self.spreadsheet_id, suffix))
                .extend(segments);
        }
        url
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Value> {
        let response = request.send().await?;
        let response = ensure_success(what, response).await?;
        Ok(response.json::<Value>().await?)
    }

    async fn sheet_properties(&self) -> Result<Vec<SheetProperties>> {
        let mut url = self.spreadsheet_url("", &[]);
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(sheetId,title)");
        let body = self
            .send(self.request(Method::GET, url).await?, "spreadsheet metadata")
            .await?;
        let metadata: SpreadsheetMetadata = serde_json::from_value(body)?;
        Ok(metadata.sheets.into_iter().map(|s| s.properties).collect())
    }

    async fn batch_update(&self, requests: Value, what: &str) -> Result<()> {
        let url = self.spreadsheet_url(":batchUpdate", &[]);
        let request = self
            .request(Method::POST, url)
            .await?
            .json(&json!({ "requests": requests }));
        self.send(request, what).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let range = match self.clear_mode {
            ClearMode::All => quoted_tab(&self.data_tab),
            ClearMode::KeepHeader => format!("{}!A2:ZZZ", quoted_tab(&self.data_tab)),
        };
        let url = self.spreadsheet_url("", &["values", &format!("{}:clear", range)]);
        let request = self.request(Method::POST, url).await?.json(&json!({}));
        self.send(request, "values clear").await?;
        tracing::debug!("Cleared {}", range);
        Ok(())
    }

    async fn resize(&self, sheet_id: i64, rows: usize, columns: usize) -> Result<()> {
        self.batch_update(
            json!([{
                "updateSheetProperties": {
                    "properties": {
                        "sheetId": sheet_id,
                        "gridProperties": {"rowCount": rows.max(1), "columnCount": columns.max(1)}
                    },
                    "fields": "gridProperties(rowCount,columnCount)"
                }
            }]),
            "grid resize",
        )
        .await
    }

    async fn write_values(&self, tab: &str, values: Vec<Vec<Value>>) -> Result<()> {
        let range = format!("{}!A1", quoted_tab(tab));
        let mut url = self.spreadsheet_url("", &["values", &range]);
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let request = self.request(Method::PUT, url).await?.json(&json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        }));
        self.send(request, "values update").await?;
        Ok(())
    }

    async fn ensure_meta_tab(&self) -> Result<()> {
        let exists = self
            .sheet_properties()
            .await?
            .iter()
            .any(|p| p.title == self.meta_tab);
        if exists {
            return Ok(());
        }

        tracing::info!("Creating tab '{}'", self.meta_tab);
        self.batch_update(
            json!([{
                "addSheet": {
                    "properties": {
                        "title": self.meta_tab,
                        "gridProperties": {"rowCount": META_TAB_ROWS, "columnCount": META_TAB_COLUMNS}
                    }
                }
            }]),
            "add meta tab",
        )
        .await
    }
}

fn quoted_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

impl<T: AccessTokenProvider> TableSink for GoogleSheetsSink<T> {
    async fn write_table(&self, table: &NormalizedTable) -> Result<String> {
        tracing::info!("📤 Uploading to Google Sheets...");
        let properties = self.sheet_properties().await?;
        let data_tab = properties
            .iter()
            .find(|p| p.title == self.data_tab)
            .ok_or_else(|| EtlError::SheetNotFound {
                tab: self.data_tab.clone(),
            })?;

        self.clear().await?;
        self.resize(data_tab.sheet_id, table.height() + 1, table.width())
            .await?;
        self.write_values(&self.data_tab, table.to_sheet_values())
            .await?;

        tracing::info!(
            "✅ {} rows x {} columns written to '{}'",
            table.height(),
            table.width(),
            self.data_tab
        );
        Ok(format!("{}#{}", self.spreadsheet_id, self.data_tab))
    }

    async fn write_export_stamp(&self, exported_at: &str) -> Result<()> {
        self.ensure_meta_tab().await?;
        self.write_values(
            &self.meta_tab,
            vec![
                vec![Value::String(self.meta_label.clone())],
                vec![Value::String(exported_at.to_string())],
            ],
        )
        .await?;
        tracing::info!("🕒 Export recorded in tab '{}': {}", self.meta_tab, exported_at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorCategory;

    fn sink(base: &str) -> GoogleSheetsSink<StaticToken> {
        let config = SheetConfig {
            sheet_id: "SHEET123".to_string(),
            sheets_base_url: base.to_string(),
            ..SheetConfig::default()
        };
        GoogleSheetsSink::new(&config, StaticToken("t".to_string())).unwrap()
    }

    #[test]
    fn test_spreadsheet_url_layout() {
        let sink = sink("https://sheets.googleapis.com/v4");
        assert_eq!(
            sink.spreadsheet_url("", &[]).as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/SHEET123"
        );
        assert_eq!(
            sink.spreadsheet_url(":batchUpdate", &[]).as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/SHEET123:batchUpdate"
        );
        assert!(sink
            .spreadsheet_url("", &["values", "'Biens'!A1"])
            .path()
            .ends_with("/values/'Biens'!A1"));
    }

    #[test]
    fn test_quoted_tab_escapes_quotes() {
        assert_eq!(quoted_tab("Biens"), "'Biens'");
        assert_eq!(quoted_tab("Biens d'Alice"), "'Biens d''Alice'");
    }

    #[tokio::test]
    async fn test_missing_key_file_is_auth_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let tokens = ServiceAccountTokens::new(dir.path().join("absent.json").display().to_string());

        let err = tokens.access_token().await.unwrap_err();

        assert!(matches!(err, EtlError::AuthError { .. }));
        assert_eq!(err.category(), ErrorCategory::Authentication);
    }

    #[tokio::test]
    async fn test_malformed_key_file_is_auth_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();
        let tokens = ServiceAccountTokens::new(path.display().to_string());

        let err = tokens.access_token().await.unwrap_err();

        assert!(matches!(err, EtlError::AuthError { .. }));
        assert_eq!(err.category(), ErrorCategory::Authentication);
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        let config = SheetConfig {
            sheets_base_url: "mailto:ops@example.com".to_string(),
            ..SheetConfig::default()
        };
        assert!(GoogleSheetsSink::new(&config, StaticToken("t".to_string())).is_err());
    }
}
