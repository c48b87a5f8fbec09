pub mod coingecko;
pub mod exchange_rate;
pub mod http;
pub mod ipapi;
pub mod nager_date;
pub mod nominatim;
pub mod open_library;
pub mod open_meteo;
pub mod openaq;
pub mod random_user;
pub mod rest_countries;
pub mod world_bank;

use crate::core::{Adapter, ProviderId, ProviderSpec};
use std::collections::HashMap;
use std::sync::Arc;

pub use http::build_client;

/// Instantiates the adapter for one provider.
pub fn build_adapter(spec: ProviderSpec, user_agent: &str) -> Arc<dyn Adapter> {
    match spec.id {
        ProviderId::ExchangeRates => Arc::new(exchange_rate::ExchangeRateProvider::new(spec)),
        ProviderId::CryptoPrice => Arc::new(coingecko::CoinGeckoProvider::new(spec)),
        ProviderId::Weather => Arc::new(open_meteo::OpenMeteoProvider::new(spec)),
        ProviderId::Geocode => Arc::new(nominatim::NominatimProvider::new(spec, user_agent)),
        ProviderId::MacroIndicator => Arc::new(world_bank::WorldBankProvider::new(spec)),
        ProviderId::CountryInfo => Arc::new(rest_countries::RestCountriesProvider::new(spec)),
        ProviderId::Holidays => Arc::new(nager_date::NagerDateProvider::new(spec)),
        ProviderId::BookByIsbn => Arc::new(open_library::OpenLibraryBookProvider::new(spec)),
        ProviderId::BookSearch => Arc::new(open_library::OpenLibrarySearchProvider::new(spec)),
        ProviderId::RandomUsers => Arc::new(random_user::RandomUserProvider::new(spec)),
        ProviderId::AirQuality => Arc::new(openaq::OpenAqProvider::new(spec)),
        ProviderId::IpGeolocation => Arc::new(ipapi::IpApiProvider::new(spec)),
    }
}

/// One adapter per resolved spec, keyed by provider.
pub fn build_adapters<'a>(
    specs: impl IntoIterator<Item = &'a ProviderSpec>,
    user_agent: &str,
) -> HashMap<ProviderId, Arc<dyn Adapter>> {
    specs
        .into_iter()
        .map(|spec| (spec.id, build_adapter(spec.clone(), user_agent)))
        .collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::core::{ProviderId, ProviderSpec};
    use wiremock::MockServer;

    /// Default spec for `id`, pointed at the mock server.
    pub fn mock_spec(id: ProviderId, server: &MockServer) -> ProviderSpec {
        ProviderSpec {
            base_url: server.uri(),
            ..ProviderSpec::default_for(id)
        }
    }

    pub fn client() -> reqwest::Client {
        reqwest::Client::new()
    }
}
