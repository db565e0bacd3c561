//! Location Gateway
//!
//! Wraps the device service: permission request, current position and
//! reverse geocoding, composed into one delivery address.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use validator::Validate;

pub const UNKNOWN_LOCATION: &str = "Unknown location";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus { Granted, Denied }

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinates {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// One reverse-geocoding candidate. Any field may be missing or blank.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Placemark {
    pub city: Option<String>,
    pub subregion: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LocationData {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    /// `City, Region, Country` from whichever parts exist.
    pub formatted_address: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Failed to get location: {0}")]
    Unavailable(String),
}

/// The platform location service.
pub trait DeviceLocation: Send + Sync {
    fn request_permission(&self) -> impl Future<Output = PermissionStatus> + Send;
    fn current_position(&self) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;
    fn reverse_geocode(&self, at: Coordinates) -> impl Future<Output = Result<Vec<Placemark>, LocationError>> + Send;
}

pub struct LocationGateway<D> { device: D }

impl<D: DeviceLocation> LocationGateway<D> {
    pub fn new(device: D) -> Self { Self { device } }

    /// Position plus formatted address.
    pub async fn current_location(&self) -> Result<LocationData, LocationError> {
        let at = self.coordinates().await?;
        let placemark = self.device.reverse_geocode(at).await
            .inspect_err(|e| warn!(error = %e, "Error getting location"))?
            .into_iter().next().unwrap_or_default();

        let city = non_blank(placemark.city).or_else(|| non_blank(placemark.subregion));
        let region = non_blank(placemark.region);
        let country = non_blank(placemark.country);
        let formatted_address = format_address(city.as_deref(), region.as_deref(), country.as_deref());

        Ok(LocationData { latitude: at.latitude, longitude: at.longitude, city, region, country, formatted_address })
    }

    /// Position only, no geocoding.
    pub async fn coordinates(&self) -> Result<Coordinates, LocationError> {
        if self.device.request_permission().await != PermissionStatus::Granted {
            return Err(LocationError::PermissionDenied);
        }
        let at = self.device.current_position().await
            .inspect_err(|e| warn!(error = %e, "Error getting coordinates"))?;
        at.validate().map_err(|e| LocationError::InvalidCoordinates(e.to_string()))?;
        Ok(at)
    }
}

fn non_blank(part: Option<String>) -> Option<String> { part.filter(|p| !p.trim().is_empty()) }

pub fn format_address(city: Option<&str>, region: Option<&str>, country: Option<&str>) -> String {
    let parts: Vec<&str> = [city, region, country].into_iter().flatten().filter(|p| !p.trim().is_empty()).collect();
    if parts.is_empty() { UNKNOWN_LOCATION.to_string() } else { parts.join(", ") }
}

/// Device with a fixed answer, configured at startup.
#[derive(Clone, Debug)]
pub struct FixedDevice {
    pub permission: PermissionStatus,
    pub position: Coordinates,
    pub placemark: Option<Placemark>,
}

impl DeviceLocation for FixedDevice {
    async fn request_permission(&self) -> PermissionStatus { self.permission }

    async fn current_position(&self) -> Result<Coordinates, LocationError> { Ok(self.position) }

    async fn reverse_geocode(&self, _at: Coordinates) -> Result<Vec<Placemark>, LocationError> {
        Ok(self.placemark.clone().into_iter().collect())
    }
}
