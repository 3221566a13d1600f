use serde::{Deserialize, Serialize};

use coffees_core::{DomainError, DomainResult};

use crate::flavor::{FlavorName, normalize_flavor_names};

/// Longest accepted name/brand, in characters.
pub const MAX_TEXT_LEN: usize = 255;

/// Command: CreateCoffee (raw, as received).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCoffee {
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub description: Option<String>,
    pub flavors: Vec<String>,
}

/// Command: UpdateCoffee (raw partial update; absent fields are left alone).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCoffee {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub flavors: Option<Vec<String>>,
}

/// A validated coffee ready to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoffee {
    pub name: String,
    pub brand: String,
    pub description: Option<String>,
    pub flavors: Vec<FlavorName>,
}

/// A validated partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoffeePatch {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    /// When present, replaces the coffee's flavor set.
    pub flavors: Option<Vec<FlavorName>>,
}

impl CoffeePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brand.is_none()
            && self.description.is_none()
            && self.flavors.is_none()
    }
}

impl CreateCoffee {
    pub fn validate(self) -> DomainResult<NewCoffee> {
        Ok(NewCoffee {
            name: required_text("name", &self.name)?,
            brand: required_text("brand", &self.brand)?,
            description: optional_text(self.description),
            flavors: normalize_flavor_names(&self.flavors)?,
        })
    }
}

impl UpdateCoffee {
    pub fn validate(self) -> DomainResult<CoffeePatch> {
        Ok(CoffeePatch {
            name: self.name.map(|n| required_text("name", &n)).transpose()?,
            brand: self.brand.map(|b| required_text("brand", &b)).transpose()?,
            description: optional_text(self.description),
            flavors: self.flavors.map(normalize_flavor_names).transpose()?,
        })
    }
}

fn required_text(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(DomainError::validation(format!(
            "{field} cannot exceed {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
