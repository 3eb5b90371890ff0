use serde::{Deserialize, Serialize};

use super::{require, EntityType};
use crate::error::Result;

/// An expense or revenue category
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub applies_to: Option<EntityType>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub applies_to: Option<EntityType>,
}

impl CategoryInput {
    pub fn validate(&self) -> Result<()> {
        require("category name", &self.name)
    }
}
