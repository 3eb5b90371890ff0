mod session;
mod settings;

pub use session::{Session, User};
pub use settings::{ApiSettings, BulkEditSettings, Config, DisplaySettings, ReportSettings};

use crate::error::{FareflowError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `api.base_url`
pub const API_URL_ENV: &str = "FAREFLOW_API_URL";

/// Get the config directory path (~/.fareflow/)
pub fn config_dir() -> Result<PathBuf> {
    // First try XDG-style directories
    if let Some(proj_dirs) = ProjectDirs::from("", "", "fareflow") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    // Fallback to ~/.fareflow/
    let home = std::env::var_os("HOME").map(PathBuf::from).ok_or_else(|| {
        FareflowError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".fareflow"))
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.exists() {
        return Err(FareflowError::ConfigNotFound(config_dir.to_path_buf()));
    }
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(FareflowError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    let mut config: Config =
        toml::from_str(&content).map_err(|e| FareflowError::ConfigParse { path, source: e })?;

    if let Ok(url) = std::env::var(API_URL_ENV) {
        if !url.trim().is_empty() {
            config.api.base_url = url;
        }
    }

    Ok(config)
}

/// Load session.toml, if a user is logged in
pub fn load_session(config_dir: &Path) -> Result<Option<Session>> {
    let path = config_dir.join("session.toml");
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content)
        .map(Some)
        .map_err(|e| FareflowError::ConfigParse { path, source: e })
}

/// Save session.toml
pub fn save_session(config_dir: &Path, session: &Session) -> Result<()> {
    let path = config_dir.join("session.toml");
    let content = toml::to_string_pretty(session).map_err(|e| {
        FareflowError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Remove session.toml. Returns whether a session existed.
pub fn clear_session(config_dir: &Path) -> Result<bool> {
    let path = config_dir.join("session.toml");
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)?;
    Ok(true)
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[api]
base_url = "http://localhost:8080/api"   # overridden by FAREFLOW_API_URL
timeout_secs = 30

[reports]
page_size = 50   # drivers per driver-summary page

[bulk_edit]
concurrency = 8  # parallel update requests during a bulk save

[display]
currency_symbol = "$"
"#;
