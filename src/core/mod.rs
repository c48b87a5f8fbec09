//! Core abstractions: queries, payloads, caching, rate control and the
//! aggregator tying them to the provider adapters.

pub mod adapter;
pub mod aggregator;
pub mod cache;
pub mod carbon;
pub mod config;
pub mod envelope;
pub mod error;
pub mod log;
pub mod payload;
pub mod provider;
pub mod query;
pub mod rate_gate;

// Re-export main types for cleaner imports
pub use adapter::Adapter;
pub use aggregator::Aggregator;
pub use cache::Cache;
pub use carbon::{CarbonFootprint, CarbonInput};
pub use config::{AppConfig, Environment};
pub use envelope::Envelope;
pub use error::{FetchError, InputError};
pub use payload::{
    AirQualityStation, Book, BookSummary, Coordinates, CountryInfo, CryptoPrice, CurrencyInfo,
    CurrentWeather, DemoUser, Holiday, IpLocation, Location, MacroPoint, Measurement, Payload,
    UserLocation,
};
pub use provider::{ProviderId, ProviderSpec};
pub use query::Query;
pub use rate_gate::RateGate;
