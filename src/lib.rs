//! Coffee Storefront
//!
//! Client-side core of a coffee ordering app.
//!
//! ## Features
//! - Catalog lookups against the remote store (PostgreSQL or in-memory)
//! - Cart with per-size line items and a single pricing rule
//! - Favorites
//! - Simulated checkout with delivery fee and promo code
//! - Single-item order with delivery or pickup
//! - Debounced product search
//! - Delivery address from the device location service

pub mod config;
pub mod domain;
pub mod gateway;
pub mod search;
pub mod shell;
pub mod store;

use thiserror::Error;

pub use config::{Config, ConfigError};
pub use domain::aggregates::{Cart, CartItem, Checkout, CheckoutError, Coffee, Favorites, OrderDraft, PaymentMethod, Transport};
pub use domain::value_objects::{Money, Quantity, Size};
pub use gateway::{CatalogGateway, GatewayError, LocationError};
pub use search::{SearchSession, SearchState};
pub use shell::{App, CommandError, Outcome};
pub use store::Storefront;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Command(#[from] CommandError),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
