//! The customer's session state: cart, favorites and checkout.
//!
//! One `Storefront` is created at startup and passed by `&mut` to whatever
//! view needs it. Every mutation goes through the methods below, which drain
//! the aggregates' domain events into the log.

use tracing::debug;

use crate::domain::aggregates::{Cart, CartItem, Checkout, CheckoutError, CheckoutSummary, Coffee, Favorites, PaymentMethod, PlacedOrder};
use crate::domain::events::DomainEvent;
use crate::domain::value_objects::{Money, Quantity, Size};

#[derive(Debug, Default)]
pub struct Storefront {
    cart: Cart,
    favorites: Favorites,
    checkout: Checkout,
}

impl Storefront {
    pub fn new(delivery_fee: Money) -> Self {
        Self { cart: Cart::new(), favorites: Favorites::new(), checkout: Checkout::new(delivery_fee) }
    }

    pub fn cart(&self) -> &Cart { &self.cart }
    pub fn favorites(&self) -> &Favorites { &self.favorites }
    pub fn checkout(&self) -> &Checkout { &self.checkout }

    // --- cart ---------------------------------------------------------------

    pub fn add_to_cart(&mut self, coffee: Coffee, size: Size, quantity: Quantity) {
        self.cart.add_to_cart(coffee, size, quantity);
        self.flush();
    }
    pub fn remove_from_cart(&mut self, coffee_id: i64) { self.cart.remove_from_cart(coffee_id); self.flush(); }
    pub fn update_quantity(&mut self, coffee_id: i64, quantity: i64) { self.cart.update_quantity(coffee_id, quantity); self.flush(); }
    pub fn increment_quantity(&mut self, coffee_id: i64) { self.cart.increment_quantity(coffee_id); self.flush(); }
    pub fn decrement_quantity(&mut self, coffee_id: i64) { self.cart.decrement_quantity(coffee_id); self.flush(); }
    pub fn clear_cart(&mut self) { self.cart.clear_cart(); self.flush(); }
    pub fn cart_items(&self) -> &[CartItem] { self.cart.items() }
    pub fn cart_total(&self) -> Money { self.cart.cart_total() }
    pub fn cart_count(&self) -> u32 { self.cart.cart_count() }
    pub fn is_in_cart(&self, coffee_id: i64) -> bool { self.cart.is_in_cart(coffee_id) }

    // --- favorites ----------------------------------------------------------

    pub fn add_to_favorites(&mut self, coffee: Coffee) { self.favorites.add_to_favorites(coffee); self.flush(); }
    pub fn remove_from_favorites(&mut self, coffee_id: i64) { self.favorites.remove_from_favorites(coffee_id); self.flush(); }
    pub fn toggle_favorite(&mut self, coffee: Coffee) -> bool {
        let now_favorite = self.favorites.toggle_favorite(coffee);
        self.flush();
        now_favorite
    }
    pub fn is_favorite(&self, coffee_id: i64) -> bool { self.favorites.is_favorite(coffee_id) }
    pub fn favorites_count(&self) -> usize { self.favorites.favorites_count() }

    // --- checkout -----------------------------------------------------------

    pub fn apply_promo(&mut self, code: &str) -> Result<(), CheckoutError> {
        let applied = self.checkout.apply_promo(code);
        self.flush();
        applied
    }
    pub fn select_payment(&mut self, method: PaymentMethod) { self.checkout.select_payment(method); }
    pub fn checkout_summary(&self) -> CheckoutSummary { self.checkout.summary(&self.cart) }

    /// Simulated payment; empties the cart on success.
    pub fn place_order(&mut self) -> Result<PlacedOrder, CheckoutError> {
        debug!(
            cart_id = self.cart.id(), opened_at = %self.cart.created_at(), last_change = %self.cart.updated_at(),
            "placing order"
        );
        let placed = self.checkout.place_order(&mut self.cart);
        self.flush();
        placed
    }

    fn flush(&mut self) {
        let events = self.cart.take_events().into_iter()
            .chain(self.favorites.take_events())
            .chain(self.checkout.take_events());
        for event in events {
            log_event(&event);
        }
    }
}

fn log_event(event: &DomainEvent) {
    match event {
        DomainEvent::Cart(e) => debug!(?e, "cart"),
        DomainEvent::Favorites(e) => debug!(?e, "favorites"),
        DomainEvent::Order(e) => debug!(?e, "order"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use crate::domain::aggregates::checkout::default_delivery_fee;

    fn coffee(id: i64, price: i64) -> Coffee {
        Coffee {
            id, name: format!("Coffee {id}"), description: String::new(), tags: vec![],
            price: Decimal::new(price, 0), rating: 4.0, purchases: 0, image_url: String::new(),
        }
    }

    #[test]
    fn test_checkout_flow() {
        let mut store = Storefront::new(default_delivery_fee());
        store.add_to_cart(coffee(1, 1500), Size::Medium, Quantity::new(2).unwrap());
        store.add_to_cart(coffee(2, 1250), Size::Small, Quantity::new(1).unwrap());
        store.add_to_cart(coffee(2, 1250), Size::Small, Quantity::new(1).unwrap());
        // 3000 + 1000 * 2
        assert_eq!(store.cart_total().amount(), Decimal::new(5000, 0));
        assert_eq!(store.cart_count(), 4);

        store.apply_promo("coffee10").unwrap();
        assert_eq!(store.checkout_summary().total.amount(), Decimal::new(5500, 0));

        store.select_payment(PaymentMethod::CashOnDelivery);
        let order = store.place_order().unwrap();
        assert_eq!(order.payment, PaymentMethod::CashOnDelivery);
        assert_eq!(order.summary.total.amount(), Decimal::new(5500, 0));
        assert_eq!(store.cart_count(), 0);
        assert!(!store.checkout().promo_applied());
    }

    #[test]
    fn test_favorites_through_store() {
        let mut store = Storefront::default();
        assert!(store.toggle_favorite(coffee(3, 100)));
        assert!(store.is_favorite(3));
        store.add_to_favorites(coffee(3, 100));
        assert_eq!(store.favorites_count(), 1);
        store.remove_from_favorites(3);
        assert_eq!(store.favorites_count(), 0);
    }

    #[test]
    fn test_cart_edits_through_store() {
        let mut store = Storefront::default();
        store.add_to_cart(coffee(1, 1000), Size::Large, Quantity::ONE);
        store.increment_quantity(1);
        store.decrement_quantity(1);
        store.decrement_quantity(1);
        assert_eq!(store.cart_items()[0].quantity.value(), 1);
        store.update_quantity(1, 4);
        assert_eq!(store.cart_total().amount(), Decimal::new(4800, 0));
        assert!(store.is_in_cart(1));
        store.remove_from_cart(1);
        assert!(!store.is_in_cart(1));
        store.add_to_cart(coffee(1, 1000), Size::Large, Quantity::ONE);
        store.clear_cart();
        assert!(store.cart().is_empty());
    }
}
