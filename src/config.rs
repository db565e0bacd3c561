//! Runtime configuration, read from the environment after `.env` is loaded.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

use crate::gateway::location::{Coordinates, FixedDevice, PermissionStatus, Placemark};
use crate::search::DEFAULT_DEBOUNCE;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub catalog_path: Option<PathBuf>,
    pub search_debounce: Duration,
    pub delivery_fee: Decimal,
    pub request_timeout: Option<Duration>,
    pub device: FixedDevice,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid { key: &'static str, value: String, reason: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|key| env::var(key).ok()) }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let search_debounce = Duration::from_millis(parse_or(&var, "SEARCH_DEBOUNCE_MS", millis(DEFAULT_DEBOUNCE))?);
        let delivery_fee = parse_or(&var, "DELIVERY_FEE", Decimal::new(1000, 0))?;
        let request_timeout = parse_opt::<u64>(&var, "REQUEST_TIMEOUT_MS")?.map(Duration::from_millis);

        let permission = match var("LOCATION_PERMISSION").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("granted") => PermissionStatus::Granted,
            Some("denied") => PermissionStatus::Denied,
            Some(other) => return Err(ConfigError::Invalid {
                key: "LOCATION_PERMISSION", value: other.to_string(), reason: "expected granted or denied".into(),
            }),
        };
        let position = Coordinates {
            latitude: parse_or(&var, "DEVICE_LATITUDE", 6.5244)?,
            longitude: parse_or(&var, "DEVICE_LONGITUDE", 3.3792)?,
        };
        let placemark = Placemark {
            city: var("DEVICE_CITY"),
            subregion: var("DEVICE_SUBREGION"),
            region: var("DEVICE_REGION"),
            country: var("DEVICE_COUNTRY"),
        };
        let placemark = (placemark != Placemark::default()).then_some(placemark);

        Ok(Self {
            database_url: var("DATABASE_URL"),
            catalog_path: var("CATALOG_PATH").map(PathBuf::from),
            search_debounce,
            delivery_fee,
            request_timeout,
            device: FixedDevice { permission, position, placemark },
        })
    }
}

fn millis(d: Duration) -> u64 { u64::try_from(d.as_millis()).unwrap_or(u64::MAX) }

fn parse_opt<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .map(|raw| raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid { key, value: raw.clone(), reason: e.to_string() }))
        .transpose()
}

fn parse_or<T: FromStr + Display>(var: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    match parse_opt(var, key)? {
        Some(value) => Ok(value),
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let c = config(&[]).unwrap();
        assert!(c.database_url.is_none());
        assert_eq!(c.search_debounce, Duration::from_millis(300));
        assert_eq!(c.delivery_fee, Decimal::new(1000, 0));
        assert!(c.request_timeout.is_none());
        assert_eq!(c.device.permission, PermissionStatus::Granted);
        assert!(c.device.placemark.is_none());
    }

    #[test]
    fn test_overrides() {
        let c = config(&[
            ("SEARCH_DEBOUNCE_MS", "150"), ("DELIVERY_FEE", "750.50"), ("REQUEST_TIMEOUT_MS", "5000"),
            ("LOCATION_PERMISSION", "Denied"), ("DEVICE_CITY", "Abuja"), ("DATABASE_URL", " "),
        ]).unwrap();
        assert_eq!(c.search_debounce, Duration::from_millis(150));
        assert_eq!(c.delivery_fee, Decimal::new(75050, 2));
        assert_eq!(c.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(c.device.permission, PermissionStatus::Denied);
        assert_eq!(c.device.placemark.unwrap().city.as_deref(), Some("Abuja"));
        assert!(c.database_url.is_none());
    }

    #[test]
    fn test_invalid_value() {
        let err = config(&[("SEARCH_DEBOUNCE_MS", "soon")]).unwrap_err();
        assert!(err.to_string().starts_with("Invalid SEARCH_DEBOUNCE_MS value 'soon'"));
        assert!(config(&[("LOCATION_PERMISSION", "maybe")]).is_err());
    }
}
