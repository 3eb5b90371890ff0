pub mod api;
pub mod charges;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod report;

pub use api::ApiClient;
pub use config::{Config, Session, User};
pub use error::{FareflowError, Result};
