//! Provider identifiers and their immutable, process-wide specs.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ProviderId {
    ExchangeRates,
    CryptoPrice,
    Weather,
    Geocode,
    MacroIndicator,
    CountryInfo,
    Holidays,
    BookByIsbn,
    BookSearch,
    RandomUsers,
    AirQuality,
    IpGeolocation,
}

impl ProviderId {
    pub const ALL: [ProviderId; 12] = [
        ProviderId::ExchangeRates,
        ProviderId::CryptoPrice,
        ProviderId::Weather,
        ProviderId::Geocode,
        ProviderId::MacroIndicator,
        ProviderId::CountryInfo,
        ProviderId::Holidays,
        ProviderId::BookByIsbn,
        ProviderId::BookSearch,
        ProviderId::RandomUsers,
        ProviderId::AirQuality,
        ProviderId::IpGeolocation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::ExchangeRates => "exchange_rates",
            ProviderId::CryptoPrice => "crypto_price",
            ProviderId::Weather => "weather",
            ProviderId::Geocode => "geocode",
            ProviderId::MacroIndicator => "macro_indicator",
            ProviderId::CountryInfo => "country_info",
            ProviderId::Holidays => "holidays",
            ProviderId::BookByIsbn => "book_by_isbn",
            ProviderId::BookSearch => "book_search",
            ProviderId::RandomUsers => "random_users",
            ProviderId::AirQuality => "air_quality",
            ProviderId::IpGeolocation => "ip_geolocation",
        }
    }

    /// Upstream domain reported as `source` in the success envelope.
    pub fn source(&self) -> &'static str {
        match self {
            ProviderId::ExchangeRates => "exchangerate.host",
            ProviderId::CryptoPrice => "coingecko.com",
            ProviderId::Weather => "open-meteo.com",
            ProviderId::Geocode => "openstreetmap.org",
            ProviderId::MacroIndicator => "worldbank.org",
            ProviderId::CountryInfo => "restcountries.com",
            ProviderId::Holidays => "date.nager.at",
            ProviderId::BookByIsbn | ProviderId::BookSearch => "openlibrary.org",
            ProviderId::RandomUsers => "randomuser.me",
            ProviderId::AirQuality => "openaq.org",
            ProviderId::IpGeolocation => "ipapi.co",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable configuration of one upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSpec {
    pub id: ProviderId,
    /// Scheme + host (+ optional prefix); adapters append their own path.
    pub base_url: String,
    pub ttl: Duration,
    pub timeout: Duration,
    /// Minimum spacing between consecutive upstream calls, if any.
    pub min_interval: Option<Duration>,
}

impl ProviderSpec {
    /// Compiled-in defaults matching each upstream's volatility and policy.
    pub fn default_for(id: ProviderId) -> Self {
        let (base_url, ttl_secs, timeout_secs) = match id {
            ProviderId::ExchangeRates => ("https://api.exchangerate.host", HOUR, 10),
            ProviderId::CryptoPrice => ("https://api.coingecko.com", 5 * MINUTE, 10),
            ProviderId::Weather => ("https://api.open-meteo.com", 30 * MINUTE, 10),
            ProviderId::Geocode => ("https://nominatim.openstreetmap.org", DAY, 10),
            ProviderId::MacroIndicator => ("https://api.worldbank.org", DAY, 15),
            ProviderId::CountryInfo => ("https://restcountries.com", 7 * DAY, 10),
            ProviderId::Holidays => ("https://date.nager.at", DAY, 10),
            ProviderId::BookByIsbn => ("https://openlibrary.org", 7 * DAY, 10),
            ProviderId::BookSearch => ("https://openlibrary.org", HOUR, 10),
            ProviderId::RandomUsers => ("https://randomuser.me", HOUR, 10),
            ProviderId::AirQuality => ("https://api.openaq.org", 30 * MINUTE, 10),
            ProviderId::IpGeolocation => ("https://ipapi.co", HOUR, 10),
        };
        // Nominatim usage policy: absolute maximum of 1 request per second.
        let min_interval = (id == ProviderId::Geocode).then(|| Duration::from_secs(1));

        ProviderSpec {
            id,
            base_url: base_url.to_string(),
            ttl: Duration::from_secs(ttl_secs),
            timeout: Duration::from_secs(timeout_secs),
            min_interval,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.min_interval.is_some_and(|d| !d.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        let ttl = |id| ProviderSpec::default_for(id).ttl.as_secs();
        assert_eq!(ttl(ProviderId::CryptoPrice), 300);
        assert_eq!(ttl(ProviderId::Weather), 1800);
        assert_eq!(ttl(ProviderId::AirQuality), 1800);
        assert_eq!(ttl(ProviderId::ExchangeRates), 3600);
        assert_eq!(ttl(ProviderId::BookSearch), 3600);
        assert_eq!(ttl(ProviderId::RandomUsers), 3600);
        assert_eq!(ttl(ProviderId::IpGeolocation), 3600);
        assert_eq!(ttl(ProviderId::Geocode), 86400);
        assert_eq!(ttl(ProviderId::MacroIndicator), 86400);
        assert_eq!(ttl(ProviderId::Holidays), 86400);
        assert_eq!(ttl(ProviderId::CountryInfo), 604800);
        assert_eq!(ttl(ProviderId::BookByIsbn), 604800);
    }

    #[test]
    fn test_only_geocode_is_rate_limited() {
        for id in ProviderId::ALL {
            let spec = ProviderSpec::default_for(id);
            assert_eq!(spec.is_rate_limited(), id == ProviderId::Geocode, "{id}");
        }
        assert_eq!(
            ProviderSpec::default_for(ProviderId::Geocode).min_interval,
            Some(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_cli_ids_match_display() {
        use clap::ValueEnum;

        for id in ProviderId::ALL {
            assert_eq!(
                <ProviderId as ValueEnum>::from_str(id.as_str(), false),
                Ok(id),
                "{id}"
            );
        }
        assert!(<ProviderId as ValueEnum>::from_str("exchange-rates", false).is_err());
        assert!(<ProviderId as ValueEnum>::from_str("stocks", false).is_err());
    }
}
