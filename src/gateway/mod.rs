//! Gateways to the collaborators the storefront does not own: the remote
//! catalog store and the device location service.
//!
//! Every call is one-shot. Nothing here retries or caches.

pub mod catalog;
pub mod location;

use std::time::Duration;
use thiserror::Error;

pub use catalog::{AnyCatalog, CatalogGateway, InMemoryCatalog, PgCatalog, TimeoutCatalog};
pub use location::{Coordinates, DeviceLocation, FixedDevice, LocationData, LocationError, LocationGateway, Placemark};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Coffee {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Catalog decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Catalog file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}
