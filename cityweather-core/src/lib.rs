//! Core library for the `cityweather` widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider seam and its OpenWeather implementation
//! - The observation model and its HTML/text renderings
//! - The search widget that ties validation, fetching and rendering together
//!
//! It is used by `cityweather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod render;
pub mod widget;

pub use config::Config;
pub use error::{FailureKind, WeatherError};
pub use model::{CityQuery, Observation};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
pub use widget::{BusyState, View, Widget};
