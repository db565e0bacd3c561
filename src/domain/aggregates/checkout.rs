//! Checkout Aggregate
//!
//! Payment is simulated: placing an order always succeeds for a non-empty cart.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use crate::domain::aggregates::cart::{Cart, CartItem};
use crate::domain::events::{DomainEvent, OrderEvent};
use crate::domain::value_objects::{Money, PromoCode, PromoCodeError};

/// The only promo the shop honors.
pub const PROMO_CODE: &str = "COFFEE10";

pub fn default_delivery_fee() -> Money { Money::ngn(Decimal::new(1000, 0)) }
pub fn promo_discount() -> Money { Money::ngn(Decimal::new(500, 0)) }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Wallet,
    Card,
    CashOnDelivery,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Wallet, PaymentMethod::Card, PaymentMethod::CashOnDelivery];

    pub fn detail(self) -> &'static str {
        match self {
            PaymentMethod::Wallet => "₦ 50,000,000.00",
            PaymentMethod::Card => "**** 4532",
            PaymentMethod::CashOnDelivery => "Pay when you receive",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentMethod::Wallet => "Wallet",
            PaymentMethod::Card => "Credit Card",
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
        })
    }
}

impl FromStr for PaymentMethod {
    type Err = CheckoutError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wallet" => Ok(PaymentMethod::Wallet),
            "card" => Ok(PaymentMethod::Card),
            "cash" => Ok(PaymentMethod::CashOnDelivery),
            other => Err(CheckoutError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Totals shown on the checkout screen.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckoutSummary {
    pub line_count: usize,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub discount: Money,
    pub total: Money,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlacedOrder {
    pub id: Uuid,
    /// `#CF` followed by six digits, shown to the customer.
    pub reference: String,
    pub payment: PaymentMethod,
    pub summary: CheckoutSummary,
    #[serde(skip)]
    pub items: Vec<CartItem>,
    pub placed_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct Checkout {
    delivery_fee: Money,
    promo: Option<PromoCode>,
    payment: PaymentMethod,
    events: Vec<DomainEvent>,
}

impl Default for Checkout { fn default() -> Self { Self::new(default_delivery_fee()) } }

impl Checkout {
    pub fn new(delivery_fee: Money) -> Self {
        Self { delivery_fee, promo: None, payment: PaymentMethod::default(), events: vec![] }
    }

    pub fn payment(&self) -> PaymentMethod { self.payment }
    pub fn promo(&self) -> Option<&PromoCode> { self.promo.as_ref() }
    pub fn promo_applied(&self) -> bool { self.promo.is_some() }

    pub fn select_payment(&mut self, method: PaymentMethod) { self.payment = method; }

    pub fn apply_promo(&mut self, input: &str) -> Result<(), CheckoutError> {
        if self.promo.is_some() { return Err(CheckoutError::PromoAlreadyApplied); }
        let code = PromoCode::new(input).map_err(|e| match e {
            PromoCodeError::Empty => CheckoutError::EmptyPromoCode,
            PromoCodeError::TooLong => CheckoutError::InvalidPromoCode,
        })?;
        if code.as_str() != PROMO_CODE { return Err(CheckoutError::InvalidPromoCode); }
        self.raise_event(DomainEvent::Order(OrderEvent::PromoApplied { code: code.to_string() }));
        self.promo = Some(code);
        Ok(())
    }

    /// `subtotal + delivery fee - discount`
    pub fn summary(&self, cart: &Cart) -> CheckoutSummary {
        let subtotal = cart.cart_total();
        let discount = if self.promo_applied() { promo_discount() } else { Money::zero(subtotal.currency()) };
        let total = subtotal.add(&self.delivery_fee).unwrap_or_else(|_| subtotal.clone());
        let total = total.subtract(&discount).unwrap_or_else(|_| total.clone());
        CheckoutSummary { line_count: cart.line_count(), subtotal, delivery_fee: self.delivery_fee.clone(), discount, total }
    }

    /// Confirms the order, empties the cart and resets promo and payment selection.
    pub fn place_order(&mut self, cart: &mut Cart) -> Result<PlacedOrder, CheckoutError> {
        if cart.is_empty() { return Err(CheckoutError::EmptyCart); }
        let summary = self.summary(cart);
        let placed_at = Utc::now();
        let order = PlacedOrder {
            id: Uuid::new_v4(),
            reference: order_reference(placed_at),
            payment: self.payment,
            items: cart.items().to_vec(),
            summary,
            placed_at,
        };
        cart.clear_cart();
        self.promo = None;
        self.payment = PaymentMethod::default();
        self.raise_event(DomainEvent::Order(OrderEvent::Placed {
            reference: order.reference.clone(), total: order.summary.total.amount(),
        }));
        Ok(order)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }
}

/// Last six digits of the epoch-millisecond timestamp.
pub fn order_reference(at: DateTime<Utc>) -> String {
    format!("#CF{:06}", at.timestamp_millis().rem_euclid(1_000_000))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Please enter a promo code")]
    EmptyPromoCode,
    #[error("Invalid promo code")]
    InvalidPromoCode,
    #[error("Promo code already applied")]
    PromoAlreadyApplied,
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Unknown payment method '{0}', expected wallet, card or cash")]
    UnknownPaymentMethod(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::domain::aggregates::product::Coffee;
    use crate::domain::value_objects::{Quantity, Size};

    fn coffee(id: i64, price: i64) -> Coffee {
        Coffee {
            id, name: format!("Coffee {id}"), description: String::new(), tags: vec![],
            price: Decimal::new(price, 0), rating: 4.0, purchases: 0, image_url: String::new(),
        }
    }

    #[test]
    fn test_total_with_promo() {
        let mut cart = Cart::new();
        cart.add_to_cart(coffee(1, 2000), Size::Medium, Quantity::new(2).unwrap());
        let mut checkout = Checkout::default();
        checkout.apply_promo("coffee10").unwrap();
        let summary = checkout.summary(&cart);
        assert_eq!(summary.subtotal.amount(), Decimal::new(4000, 0));
        assert_eq!(summary.delivery_fee.amount(), Decimal::new(1000, 0));
        assert_eq!(summary.discount.amount(), Decimal::new(500, 0));
        assert_eq!(summary.total.amount(), Decimal::new(4500, 0));
    }

    #[test]
    fn test_total_without_promo() {
        let mut cart = Cart::new();
        cart.add_to_cart(coffee(1, 1000), Size::Small, Quantity::new(2).unwrap());
        let summary = Checkout::default().summary(&cart);
        assert_eq!(summary.discount.amount(), Decimal::ZERO);
        assert_eq!(summary.total.amount(), Decimal::new(2600, 0));
    }

    #[test]
    fn test_promo_validation() {
        let mut checkout = Checkout::default();
        assert_eq!(checkout.apply_promo("  "), Err(CheckoutError::EmptyPromoCode));
        assert_eq!(checkout.apply_promo("TEA5"), Err(CheckoutError::InvalidPromoCode));
        assert!(!checkout.promo_applied());
        checkout.apply_promo("Coffee10").unwrap();
        assert_eq!(checkout.apply_promo("COFFEE10"), Err(CheckoutError::PromoAlreadyApplied));
    }

    #[test]
    fn test_place_order_clears_cart() {
        let mut cart = Cart::new();
        cart.add_coffee(coffee(1, 3000));
        let mut checkout = Checkout::default();
        checkout.select_payment(PaymentMethod::Card);
        checkout.apply_promo("COFFEE10").unwrap();
        let order = checkout.place_order(&mut cart).unwrap();
        assert!(cart.is_empty());
        assert_eq!(order.payment, PaymentMethod::Card);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.summary.total.amount(), Decimal::new(3500, 0));
        assert!(order.reference.starts_with("#CF"));
        assert_eq!(order.reference.len(), 9);
        assert!(!checkout.promo_applied());
        assert_eq!(checkout.payment(), PaymentMethod::Wallet);
        assert_eq!(checkout.take_events().len(), 2);
    }

    #[test]
    fn test_place_order_empty_cart() {
        let mut cart = Cart::new();
        assert_eq!(Checkout::default().place_order(&mut cart).unwrap_err(), CheckoutError::EmptyCart);
    }

    #[test]
    fn test_order_reference() {
        let at = Utc.timestamp_millis_opt(1_700_000_042_517).unwrap();
        assert_eq!(order_reference(at), "#CF042517");
    }

    #[test]
    fn test_payment_parse() {
        assert_eq!("CASH".parse::<PaymentMethod>().unwrap(), PaymentMethod::CashOnDelivery);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }
}
