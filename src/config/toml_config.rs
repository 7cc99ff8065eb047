use crate::domain::services::ColumnNormalizer;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_required_string,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://v2.immo-facile.com/api";
pub const DEFAULT_SITE_ID: &str = "148899";
pub const DEFAULT_SHEET_ID: &str = "1TJQ7WZGelLXzLqq6RGbZbD5BIyTaIX4XkCG9Wv_JmFM";
pub const DEFAULT_SHEET_TAB: &str = "Biens";
pub const DEFAULT_META_TAB: &str = "Meta";
pub const DEFAULT_META_LABEL: &str = "Dernière date d'export";
pub const DEFAULT_CREDENTIAL_PATH: &str = "/etc/secrets/credentials.json";
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4";
pub const DEFAULT_PAGE_SIZE: usize = 100;

pub const CLIENT_ID_ENV: &str = "IMMO_API_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "IMMO_API_CLIENT_SECRET";

/// Nested resources requested with every product.
pub const DEFAULT_FETCH_RESOURCES: &[&str] = &[
    "criteres_text",
    "suivi_par",
    "cree_par",
    "criteres_number",
    "criteres_fulltext",
    "criteres_flag",
    "publications",
    "products_photos",
    "customer",
    "actions_history",
    "criteres_publication_errors",
    "compromis",
    "descriptions",
    "rooms",
    "statistic",
    "insee",
    "scopes",
    "category",
    "themes",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub api: ApiConfig,
    pub sheet: SheetConfig,
    pub columns: ColumnsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub site_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub fetch_resources: Vec<String>,
    pub page_size: usize,
    pub timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            site_id: DEFAULT_SITE_ID.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            fetch_resources: DEFAULT_FETCH_RESOURCES.iter().map(|s| s.to_string()).collect(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearMode {
    /// Wipe the whole tab before writing.
    #[default]
    All,
    /// Wipe from row 2 down; the header row is overwritten in place.
    KeepHeader,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    pub sheet_id: String,
    pub sheet_tab: String,
    pub meta_tab: String,
    pub meta_label: String,
    pub credential_path: String,
    pub sheets_base_url: String,
    pub clear_mode: ClearMode,
    pub timeout_seconds: Option<u64>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            sheet_id: DEFAULT_SHEET_ID.to_string(),
            sheet_tab: DEFAULT_SHEET_TAB.to_string(),
            meta_tab: DEFAULT_META_TAB.to_string(),
            meta_label: DEFAULT_META_LABEL.to_string(),
            credential_path: DEFAULT_CREDENTIAL_PATH.to_string(),
            sheets_base_url: DEFAULT_SHEETS_BASE_URL.to_string(),
            clear_mode: ClearMode::All,
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    /// Replaces the built-in preferred column order when set.
    pub preferred_order: Option<Vec<String>>,
}

impl ColumnsConfig {
    pub fn normalizer(&self) -> ColumnNormalizer {
        match &self.preferred_order {
            Some(order) => ColumnNormalizer::new(order.iter().cloned()),
            None => ColumnNormalizer::default(),
        }
    }
}

impl ExportConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${IMMO_API_CLIENT_SECRET})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Fills blank API credentials from `IMMO_API_CLIENT_ID` / `IMMO_API_CLIENT_SECRET`.
    pub fn with_env_credentials(mut self) -> Self {
        if self.api.client_id.trim().is_empty() {
            if let Ok(id) = std::env::var(CLIENT_ID_ENV) {
                self.api.client_id = id;
            }
        }
        if self.api.client_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var(CLIENT_SECRET_ENV) {
                self.api.client_secret = secret;
            }
        }
        self
    }

    /// Copy safe to print: the client secret is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.api.client_secret.is_empty() {
            copy.api.client_secret = "***".to_string();
        }
        copy
    }
}

impl Validate for ApiConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api.base_url", &self.base_url)?;
        validate_non_empty_string("api.site_id", &self.site_id)?;
        validate_required_string("api.client_id", &self.client_id)?;
        validate_required_string("api.client_secret", &self.client_secret)?;
        validate_positive_number("api.page_size", self.page_size, 1)?;
        if self.fetch_resources.iter().any(|r| r.trim().is_empty()) {
            return Err(EtlError::InvalidConfigValueError {
                field: "api.fetch_resources".to_string(),
                value: self.fetch_resources.join(","),
                reason: "Resource names cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl Validate for SheetConfig {
    fn validate(&self) -> Result<()> {
        validate_url("sheet.sheets_base_url", &self.sheets_base_url)?;
        validate_non_empty_string("sheet.sheet_id", &self.sheet_id)?;
        validate_non_empty_string("sheet.sheet_tab", &self.sheet_tab)?;
        validate_non_empty_string("sheet.meta_tab", &self.meta_tab)?;
        validate_path("sheet.credential_path", &self.credential_path)?;
        if self.sheet_tab == self.meta_tab {
            return Err(EtlError::InvalidConfigValueError {
                field: "sheet.meta_tab".to_string(),
                value: self.meta_tab.clone(),
                reason: "Meta tab must differ from the data tab".to_string(),
            });
        }
        Ok(())
    }
}

impl Validate for ExportConfig {
    fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.sheet.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_production_export() {
        let config = ExportConfig::default();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.site_id, "148899");
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.api.fetch_resources.len(), 19);
        assert_eq!(config.sheet.sheet_tab, "Biens");
        assert_eq!(config.sheet.meta_tab, "Meta");
        assert_eq!(config.sheet.clear_mode, ClearMode::All);
        assert!(config.columns.preferred_order.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let toml_content = r#"
[api]
site_id = "42"
client_id = "abc"

[sheet]
sheet_tab = "Listings"
clear_mode = "keep_header"
"#;

        let config = ExportConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api.site_id, "42");
        assert_eq!(config.api.client_id, "abc");
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.sheet.sheet_tab, "Listings");
        assert_eq!(config.sheet.meta_tab, "Meta");
        assert_eq!(config.sheet.clear_mode, ClearMode::KeepHeader);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_IMMO_SECRET_SUBST", "s3cret");

        let toml_content = r#"
[api]
client_id = "client"
client_secret = "${TEST_IMMO_SECRET_SUBST}"
"#;

        let config = ExportConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.client_secret, "s3cret");

        std::env::remove_var("TEST_IMMO_SECRET_SUBST");
    }

    #[test]
    fn test_missing_secret_fails_validation() {
        let config = ExportConfig::from_toml_str("[api]\nclient_id = \"client\"\n").unwrap();
        let err = config.api.validate().unwrap_err();
        assert!(matches!(err, EtlError::MissingConfigError { field } if field == "api.client_secret"));
    }

    #[test]
    fn test_invalid_base_url_fails_validation() {
        let toml_content = r#"
[api]
base_url = "not-a-url"
client_id = "client"
client_secret = "secret"
"#;
        let config = ExportConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_meta_tab_must_differ() {
        let mut config = ExportConfig::default();
        config.sheet.meta_tab = config.sheet.sheet_tab.clone();
        assert!(config.sheet.validate().is_err());
    }

    #[test]
    fn test_redacted_masks_secret() {
        let mut config = ExportConfig::default();
        config.api.client_secret = "hunter2".to_string();
        assert_eq!(config.redacted().api.client_secret, "***");
        assert_eq!(config.api.client_secret, "hunter2");
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[columns]\npreferred_order = [\"id\", \"price\"]\n")
            .unwrap();

        let config = ExportConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(
            config.columns.preferred_order,
            Some(vec!["id".to_string(), "price".to_string()])
        );
        assert_eq!(config.columns.normalizer().preferred().len(), 2);
    }
}
