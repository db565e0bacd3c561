//! Coffee product record

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::value_objects::{Money, Size};

/// A catalog entry. Read-only on the client; every field comes from the remote store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coffee {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub price: Decimal,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub purchases: i64,
    #[serde(default)]
    pub image_url: String,
}

impl Coffee {
    pub fn base_price(&self) -> Money { Money::ngn(self.price) }

    pub fn price_for(&self, size: Size, quantity: u32) -> Money { size.price_for(&self.base_price(), quantity) }

    pub fn has_tag(&self, tag: &str) -> bool { self.tags.iter().any(|t| t == tag) }

    /// Case-insensitive substring match on the name.
    pub fn name_matches(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(&term.to_lowercase())
    }

    /// Short label for list rows: `Hot/Milk`, with `...` when more tags exist.
    pub fn tag_label(&self) -> String {
        match self.tags.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [first, second] => format!("{first}/{second}"),
            [first, second, ..] => format!("{first}/{second}..."),
        }
    }
}
