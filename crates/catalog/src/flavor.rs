use serde::{Deserialize, Serialize};

use coffees_core::{DomainError, Entity, FlavorId, ValueObject};

/// Longest accepted flavor name, in characters.
pub const MAX_FLAVOR_NAME_LEN: usize = 64;

/// A normalized flavor name (trimmed, non-empty).
///
/// Flavor rows are unique by this value, so it is the key used when a coffee
/// references a flavor that may or may not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FlavorName(String);

impl FlavorName {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("flavor name cannot be empty"));
        }
        if trimmed.chars().count() > MAX_FLAVOR_NAME_LEN {
            return Err(DomainError::validation(format!(
                "flavor name cannot exceed {MAX_FLAVOR_NAME_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for FlavorName {}

impl core::fmt::Display for FlavorName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for FlavorName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FlavorName> for String {
    fn from(value: FlavorName) -> Self {
        value.0
    }
}

/// Flavor tag, shared between coffees (many-to-many).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flavor {
    pub id: FlavorId,
    pub name: FlavorName,
}

impl Flavor {
    pub fn new(name: FlavorName) -> Self {
        Self {
            id: FlavorId::new(),
            name,
        }
    }
}

impl Entity for Flavor {
    type Id = FlavorId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Parse and de-duplicate a list of raw flavor names.
///
/// Order of first occurrence is kept; repeats (after trimming) are dropped.
pub fn normalize_flavor_names<I, S>(raw: I) -> Result<Vec<FlavorName>, DomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut names: Vec<FlavorName> = Vec::new();
    for r in raw {
        let name = FlavorName::parse(r.as_ref())?;
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}
