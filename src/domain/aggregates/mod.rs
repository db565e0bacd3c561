//! Aggregates module
pub mod product;
pub mod cart;
pub mod favorites;
pub mod checkout;
pub mod order;

pub use product::Coffee;
pub use cart::{Cart, CartItem};
pub use favorites::Favorites;
pub use checkout::{Checkout, CheckoutError, CheckoutSummary, PaymentMethod, PlacedOrder};
pub use order::{OrderDraft, Transport};
