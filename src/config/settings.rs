use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub api: ApiSettings,
    #[serde(default)]
    pub reports: ReportSettings,
    #[serde(default)]
    pub bulk_edit: BulkEditSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReportSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BulkEditSettings {
    /// Maximum number of update requests in flight during a bulk save
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for BulkEditSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> usize {
    50
}

fn default_concurrency() -> usize {
    8
}

fn default_currency_symbol() -> String {
    "$".to_string()
}
