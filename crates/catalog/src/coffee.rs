use chrono::{DateTime, Utc};
use serde::Serialize;

use coffees_core::{CoffeeId, DomainError, DomainResult, Entity};

use crate::command::{CoffeePatch, NewCoffee};
use crate::event::CoffeeRecommended;
use crate::flavor::{Flavor, FlavorName};

/// Catalog item: Coffee.
///
/// Fields are private so that the recommendation counter can only move through
/// [`Coffee::recommend`] and the flavor set never holds duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coffee {
    id: CoffeeId,
    name: String,
    brand: String,
    description: Option<String>,
    recommendations: u32,
    flavors: Vec<Flavor>,
}

impl Coffee {
    /// Create a brand-new coffee from a validated command and its resolved flavors.
    ///
    /// `flavors` are the rows the store found or created for `new.flavors`.
    pub fn create(id: CoffeeId, new: NewCoffee, flavors: Vec<Flavor>) -> Self {
        let mut coffee = Self {
            id,
            name: new.name,
            brand: new.brand,
            description: new.description,
            recommendations: 0,
            flavors: Vec::with_capacity(flavors.len()),
        };
        coffee.replace_flavors(flavors);
        coffee
    }

    /// Rebuild a coffee from persisted state.
    pub fn rehydrate(
        id: CoffeeId,
        name: String,
        brand: String,
        description: Option<String>,
        recommendations: u32,
        flavors: Vec<Flavor>,
    ) -> Self {
        let mut coffee = Self {
            id,
            name,
            brand,
            description,
            recommendations,
            flavors: Vec::with_capacity(flavors.len()),
        };
        coffee.replace_flavors(flavors);
        coffee
    }

    pub fn id_typed(&self) -> CoffeeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn recommendations(&self) -> u32 {
        self.recommendations
    }

    pub fn flavors(&self) -> &[Flavor] {
        &self.flavors
    }

    pub fn flavor_names(&self) -> impl Iterator<Item = &FlavorName> {
        self.flavors.iter().map(|f| &f.name)
    }

    /// Merge the scalar fields of a patch. Flavors are resolved by the store and
    /// applied separately through [`Coffee::replace_flavors`].
    pub fn apply_patch(&mut self, patch: &CoffeePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(brand) = &patch.brand {
            self.brand = brand.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
    }

    /// Replace the flavor set, dropping repeated ids or names.
    pub fn replace_flavors(&mut self, flavors: Vec<Flavor>) {
        self.flavors.clear();
        for flavor in flavors {
            let seen = self
                .flavors
                .iter()
                .any(|f| f.same_identity_as(&flavor) || f.name == flavor.name);
            if !seen {
                self.flavors.push(flavor);
            }
        }
    }

    /// Count one more recommendation and describe it as an event.
    ///
    /// The caller persists the mutated coffee and the event together.
    pub fn recommend(&mut self, occurred_at: DateTime<Utc>) -> DomainResult<CoffeeRecommended> {
        self.recommendations = self
            .recommendations
            .checked_add(1)
            .ok_or_else(|| DomainError::invariant("recommendation counter overflow"))?;

        Ok(CoffeeRecommended {
            coffee_id: self.id,
            occurred_at,
        })
    }
}

impl Entity for Coffee {
    type Id = CoffeeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
