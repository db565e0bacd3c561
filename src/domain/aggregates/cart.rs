//! Cart Aggregate

use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::aggregates::product::Coffee;
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::{Money, Quantity, Size, DEFAULT_CURRENCY};

#[derive(Clone, Debug)]
pub struct Cart {
    id: String,
    items: Vec<CartItem>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

/// One (coffee, size) line.
#[derive(Clone, Debug, PartialEq)]
pub struct CartItem {
    pub coffee: Coffee,
    pub size: Size,
    pub quantity: Quantity,
}

impl CartItem {
    pub fn line_total(&self) -> Money { self.coffee.price_for(self.size, self.quantity.value()) }
    fn is_for(&self, coffee_id: i64) -> bool { self.coffee.id == coffee_id }
}

impl Default for Cart { fn default() -> Self { Self::new() } }

impl Cart {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(), items: vec![],
            created_at: Utc::now(), updated_at: Utc::now(), events: vec![],
        }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn line_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Merges into the existing (coffee, size) line or appends a new one.
    pub fn add_to_cart(&mut self, coffee: Coffee, size: Size, quantity: Quantity) {
        let coffee_id = coffee.id;
        if let Some(existing) = self.items.iter_mut().find(|i| i.is_for(coffee_id) && i.size == size) {
            existing.quantity = existing.quantity.add(quantity);
        } else {
            self.items.push(CartItem { coffee, size, quantity });
        }
        self.touch();
        self.raise_event(DomainEvent::Cart(CartEvent::ItemAdded { coffee_id, size, quantity }));
    }

    /// Medium, quantity one.
    pub fn add_coffee(&mut self, coffee: Coffee) { self.add_to_cart(coffee, Size::default(), Quantity::ONE) }

    /// Drops every line for the coffee, whatever the size.
    pub fn remove_from_cart(&mut self, coffee_id: i64) {
        let before = self.items.len();
        self.items.retain(|i| !i.is_for(coffee_id));
        if self.items.len() != before {
            self.touch();
            self.raise_event(DomainEvent::Cart(CartEvent::ItemRemoved { coffee_id }));
        }
    }

    /// Zero or negative removes the coffee entirely. Anything past `u32::MAX` saturates.
    pub fn update_quantity(&mut self, coffee_id: i64, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(coffee_id);
            return;
        }
        let quantity = Quantity::saturating(u32::try_from(quantity).unwrap_or(u32::MAX));
        self.set_each(coffee_id, |_| quantity);
    }

    pub fn increment_quantity(&mut self, coffee_id: i64) { self.set_each(coffee_id, |q| q.increment()); }

    /// Lines already at one stay at one.
    pub fn decrement_quantity(&mut self, coffee_id: i64) { self.set_each(coffee_id, |q| q.decrement()); }

    pub fn cart_total(&self) -> Money {
        self.items.iter().fold(Money::zero(DEFAULT_CURRENCY), |acc, i| acc.add(&i.line_total()).unwrap_or(acc))
    }

    pub fn cart_count(&self) -> u32 { self.items.iter().map(|i| i.quantity.value()).sum() }

    pub fn is_in_cart(&self, coffee_id: i64) -> bool { self.items.iter().any(|i| i.is_for(coffee_id)) }

    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.touch();
        self.raise_event(DomainEvent::Cart(CartEvent::Cleared));
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn set_each(&mut self, coffee_id: i64, next: impl Fn(Quantity) -> Quantity) {
        let mut changed = Vec::new();
        for item in self.items.iter_mut().filter(|i| i.is_for(coffee_id)) {
            let updated = next(item.quantity);
            if updated != item.quantity {
                item.quantity = updated;
                changed.push(updated);
            }
        }
        if changed.is_empty() { return; }
        self.touch();
        for quantity in changed {
            self.raise_event(DomainEvent::Cart(CartEvent::QuantityChanged { coffee_id, quantity }));
        }
    }

    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
    fn touch(&mut self) { self.updated_at = Utc::now(); }
}
