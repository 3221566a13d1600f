//! Coffees catalog domain module.
//!
//! Business rules for catalog items and their flavor tags, implemented as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod coffee;
pub mod command;
pub mod event;
pub mod flavor;

pub use coffee::Coffee;
pub use command::{CoffeePatch, CreateCoffee, NewCoffee, UpdateCoffee};
pub use event::{COFFEE_EVENT_TYPE, CoffeeRecommended, RECOMMEND_COFFEE};
pub use flavor::{Flavor, FlavorName, normalize_flavor_names};
