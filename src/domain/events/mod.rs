//! Domain events
use crate::domain::value_objects::{Quantity, Size};
use rust_decimal::Decimal;

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Cart(CartEvent),
    Favorites(FavoriteEvent),
    Order(OrderEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    ItemAdded { coffee_id: i64, size: Size, quantity: Quantity },
    QuantityChanged { coffee_id: i64, quantity: Quantity },
    ItemRemoved { coffee_id: i64 },
    Cleared,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FavoriteEvent {
    Added { coffee_id: i64 },
    Removed { coffee_id: i64 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum OrderEvent {
    PromoApplied { code: String },
    Placed { reference: String, total: Decimal },
}
