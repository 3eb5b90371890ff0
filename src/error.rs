use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FareflowError {
    #[error("Config directory not found at {0}. Run 'fareflow init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Not logged in. Run 'fareflow login' first.")]
    NotLoggedIn,

    #[error("Session expired. Run 'fareflow login' again.")]
    SessionExpired,

    #[error("Unable to connect to {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Authentication failed (401). You have been logged out.")]
    Unauthorized,

    #[error("Permission denied (403): {0}")]
    Forbidden(String),

    #[error("Request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// `row` is the 0-based index; messages count rows from 1
    #[error("Invalid {field} '{value}' on row {}: must be a number", .row + 1)]
    InvalidAmount {
        row: usize,
        field: String,
        value: String,
    },

    #[error("Unknown charge field '{0}'")]
    UnknownField(String),

    #[error("Bulk edit is not active")]
    NotEditing,

    #[error("Row {} is out of range (page has {count} row(s))", .row + 1)]
    RowOutOfRange { row: usize, count: usize },

    #[error("Cannot jump to page {requested}: pages must be visited in order (next unvisited page is {next})")]
    PageOutOfSequence { requested: usize, next: usize },

    #[error("{failed} of {submitted} charge update(s) failed; edits kept for retry")]
    PartialFailure { failed: usize, submitted: usize },

    #[error("No report generated yet. Choose a date range first.")]
    NoReport,

    #[error("{kind} records cannot be deleted: they are kept for audit. {hint}")]
    DeletionNotAllowed { kind: String, hint: String },

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FareflowError>;
