//! Single-item order
//!
//! The "order now" flow for one coffee at one size, separate from the cart.

use std::fmt;
use std::str::FromStr;
use crate::domain::aggregates::product::Coffee;
use crate::domain::value_objects::{Money, Quantity, Size};

/// Coffee shown when the order flow is opened without an id.
pub const DEFAULT_COFFEE_ID: i64 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Transport {
    #[default]
    Deliver,
    PickUp,
}

impl Transport {
    pub fn address_label(self) -> &'static str {
        match self { Transport::Deliver => "Delivery Address", Transport::PickUp => "Pick Up Location" }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Transport::Deliver => "Deliver", Transport::PickUp => "Pick Up" })
    }
}

impl FromStr for Transport {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-', '_'], "").as_str() {
            "deliver" | "delivery" => Ok(Transport::Deliver),
            "pickup" => Ok(Transport::PickUp),
            other => Err(format!("Unknown transport '{other}', expected deliver or pickup")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrderDraft {
    coffee: Coffee,
    size: Size,
    quantity: Quantity,
    transport: Transport,
}

impl OrderDraft {
    pub fn new(coffee: Coffee, size: Size) -> Self {
        Self { coffee, size, quantity: Quantity::ONE, transport: Transport::default() }
    }

    pub fn coffee(&self) -> &Coffee { &self.coffee }
    pub fn size(&self) -> Size { self.size }
    pub fn quantity(&self) -> Quantity { self.quantity }
    pub fn transport(&self) -> Transport { self.transport }
    pub fn can_decrement(&self) -> bool { self.quantity.value() > 1 }

    pub fn increment(&mut self) { self.quantity = self.quantity.increment(); }
    pub fn decrement(&mut self) { self.quantity = self.quantity.decrement(); }
    pub fn set_transport(&mut self, transport: Transport) { self.transport = transport; }

    pub fn total(&self) -> Money { self.coffee.price_for(self.size, self.quantity.value()) }
}

/// Parses the coffee id handed to the order flow, falling back to the default coffee.
pub fn resolve_coffee_id(raw: Option<&str>) -> Option<i64> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Some(DEFAULT_COFFEE_ID),
        Some(s) => s.parse().ok(),
    }
}
