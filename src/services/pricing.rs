//! Price lookup
//!
//! Pricing is owned by the surrounding application; the engine only calls
//! `PriceLookup::price`. `PriceTable` is the JSON-backed implementation
//! used by the binary.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::ServiceType;

/// Client and employee amounts for one job
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub client: f64,
    pub employee: f64,
}

/// Pure, synchronous price lookup
pub trait PriceLookup: Send + Sync {
    fn price(&self, property: &str, size: &str, service_type: &ServiceType) -> Price;
}

/// One row of the price table. `property` may be `*` to match any property.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRule {
    pub property: String,
    pub size: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub client: f64,
    pub employee: f64,
}

/// Price table with case-insensitive matching and a property wildcard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceTable {
    pub rules: Vec<PriceRule>,
}

impl PriceTable {
    pub fn new(rules: Vec<PriceRule>) -> Self {
        Self { rules }
    }

    /// Load a table from a JSON file (`{"rules": [...]}`)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read price table {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse price table {}", path.display()))
    }

    fn find(&self, property: &str, size: &str, service_type: &ServiceType) -> Option<&PriceRule> {
        let type_label = service_type.label();
        let matches = |rule: &&PriceRule, property: &str| {
            rule.property.eq_ignore_ascii_case(property)
                && rule.size.eq_ignore_ascii_case(size)
                && rule.service_type.label().eq_ignore_ascii_case(type_label)
        };
        self.rules
            .iter()
            .find(|rule| matches(rule, property))
            .or_else(|| self.rules.iter().find(|rule| matches(rule, "*")))
    }
}

impl PriceLookup for PriceTable {
    fn price(&self, property: &str, size: &str, service_type: &ServiceType) -> Price {
        self.find(property.trim(), size.trim(), service_type)
            .map(|rule| Price {
                client: rule.client,
                employee: rule.employee,
            })
            .unwrap_or_default()
    }
}
