//! Favorites Aggregate

use crate::domain::aggregates::product::Coffee;
use crate::domain::events::{DomainEvent, FavoriteEvent};

/// Favorited coffees keyed by id. Order is whatever the customer tapped first.
#[derive(Clone, Debug, Default)]
pub struct Favorites {
    items: Vec<Coffee>,
    events: Vec<DomainEvent>,
}

impl Favorites {
    pub fn new() -> Self { Self::default() }

    pub fn favorites(&self) -> &[Coffee] { &self.items }
    pub fn favorites_count(&self) -> usize { self.items.len() }
    pub fn is_favorite(&self, coffee_id: i64) -> bool { self.items.iter().any(|c| c.id == coffee_id) }

    pub fn add_to_favorites(&mut self, coffee: Coffee) {
        if self.is_favorite(coffee.id) { return; }
        self.raise_event(DomainEvent::Favorites(FavoriteEvent::Added { coffee_id: coffee.id }));
        self.items.push(coffee);
    }

    pub fn remove_from_favorites(&mut self, coffee_id: i64) {
        let before = self.items.len();
        self.items.retain(|c| c.id != coffee_id);
        if self.items.len() != before {
            self.raise_event(DomainEvent::Favorites(FavoriteEvent::Removed { coffee_id }));
        }
    }

    /// Returns whether the coffee is a favorite afterwards.
    pub fn toggle_favorite(&mut self, coffee: Coffee) -> bool {
        if self.is_favorite(coffee.id) {
            self.remove_from_favorites(coffee.id);
            false
        } else {
            self.add_to_favorites(coffee);
            true
        }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}
