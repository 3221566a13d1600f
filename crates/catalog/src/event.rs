use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coffees_core::CoffeeId;
use coffees_events::Event;

/// Event category for everything emitted by the catalog.
pub const COFFEE_EVENT_TYPE: &str = "coffee";

/// Name of the event recorded when a coffee is recommended.
pub const RECOMMEND_COFFEE: &str = "recommend_coffee";

/// Event: a coffee received one more recommendation.
///
/// Serializes to the stored payload `{ "coffeeId": "<id>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoffeeRecommended {
    #[serde(rename = "coffeeId")]
    pub coffee_id: CoffeeId,
    #[serde(skip, default = "Utc::now")]
    pub occurred_at: DateTime<Utc>,
}

impl Event for CoffeeRecommended {
    fn event_type(&self) -> &'static str {
        COFFEE_EVENT_TYPE
    }

    fn name(&self) -> &'static str {
        RECOMMEND_COFFEE
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
