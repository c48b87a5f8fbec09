//! Typed, normalized request parameters and the cache keys derived from them.
//!
//! Every constructor normalizes its input so that logically identical
//! requests compare equal and share one cache slot.

use super::error::InputError;
use super::provider::ProviderId;
use chrono::Datelike;
use std::cell::RefCell;
use std::collections::HashMap;

pub const DEFAULT_SYMBOLS: [&str; 6] = ["KES", "EUR", "GBP", "NGN", "TZS", "UGX"];
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    ExchangeRates {
        base: String,
        symbols: Vec<String>,
    },
    CryptoPrice {
        coin_id: String,
        vs_currency: String,
    },
    Weather {
        latitude: f64,
        longitude: f64,
    },
    Geocode {
        address: String,
    },
    MacroIndicator {
        country: String,
        indicator: String,
        date_range: Option<(String, String)>,
    },
    CountryInfo {
        name: String,
    },
    Holidays {
        country_code: String,
        year: i32,
    },
    BookByIsbn {
        isbn: String,
    },
    BookSearch {
        query: String,
        limit: u32,
    },
    RandomUsers {
        count: u32,
        nationality: String,
    },
    AirQuality {
        country_code: String,
        limit: u32,
    },
    IpGeolocation,
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_empty(field: &'static str, value: &str) -> Result<String, InputError> {
    let value = collapse_whitespace(value);
    if value.is_empty() {
        return Err(InputError::Missing(field));
    }
    Ok(value)
}

fn code(field: &'static str, value: &str) -> Result<String, InputError> {
    let value = non_empty(field, value)?;
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_') {
        return Err(InputError::invalid(field, format!("'{value}' is not a code")));
    }
    Ok(value.to_uppercase())
}

fn limit(field: &'static str, value: u32) -> Result<u32, InputError> {
    if !(1..=MAX_LIMIT).contains(&value) {
        return Err(InputError::invalid(
            field,
            format!("{value} is outside 1..={MAX_LIMIT}"),
        ));
    }
    Ok(value)
}

impl Query {
    pub fn exchange_rates<S: AsRef<str>>(base: &str, symbols: &[S]) -> Result<Self, InputError> {
        let base = code("base", base)?;
        let mut symbols = if symbols.is_empty() {
            DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
        } else {
            symbols
                .iter()
                .map(|s| code("symbols", s.as_ref()))
                .collect::<Result<Vec<_>, _>>()?
        };
        symbols.sort();
        symbols.dedup();
        Ok(Query::ExchangeRates { base, symbols })
    }

    pub fn crypto_price(coin_id: &str, vs_currency: &str) -> Result<Self, InputError> {
        Ok(Query::CryptoPrice {
            coin_id: non_empty("coin_id", coin_id)?.to_lowercase(),
            vs_currency: code("vs_currency", vs_currency)?.to_lowercase(),
        })
    }

    pub fn weather(latitude: f64, longitude: f64) -> Result<Self, InputError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(InputError::invalid("latitude", format!("{latitude} is outside -90..=90")));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(InputError::invalid(
                "longitude",
                format!("{longitude} is outside -180..=180"),
            ));
        }
        // `+ 0.0` folds -0.0 into 0.0 so both render the same key.
        Ok(Query::Weather {
            latitude: latitude + 0.0,
            longitude: longitude + 0.0,
        })
    }

    pub fn geocode(address: &str) -> Result<Self, InputError> {
        Ok(Query::Geocode {
            address: non_empty("address", address)?,
        })
    }

    pub fn macro_indicator(
        country: &str,
        indicator: &str,
        date_start: Option<&str>,
        date_end: Option<&str>,
    ) -> Result<Self, InputError> {
        let year = |field, value: &str| -> Result<String, InputError> {
            let value = value.trim();
            if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
                return Err(InputError::invalid(field, format!("'{value}' is not a year")));
            }
            Ok(value.to_string())
        };
        // The upstream only understands a closed range; a single bound is ignored.
        let date_range = match (date_start, date_end) {
            (Some(start), Some(end)) => Some((year("date_start", start)?, year("date_end", end)?)),
            _ => None,
        };
        Ok(Query::MacroIndicator {
            country: code("country", country)?,
            indicator: code("indicator", indicator)?,
            date_range,
        })
    }

    pub fn country_info(name: &str) -> Result<Self, InputError> {
        Ok(Query::CountryInfo {
            name: non_empty("name", name)?,
        })
    }

    pub fn holidays(country_code: &str, year: i32) -> Result<Self, InputError> {
        if !YEAR_RANGE.contains(&year) {
            return Err(InputError::invalid(
                "year",
                format!("{year} is outside {}..={}", YEAR_RANGE.start(), YEAR_RANGE.end()),
            ));
        }
        Ok(Query::Holidays {
            country_code: code("country_code", country_code)?,
            year,
        })
    }

    pub fn book_by_isbn(isbn: &str) -> Result<Self, InputError> {
        let isbn: String = isbn
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect::<String>()
            .to_uppercase();
        let valid = matches!(isbn.len(), 10 | 13)
            && isbn
                .char_indices()
                .all(|(i, c)| c.is_ascii_digit() || (c == 'X' && i == 9 && isbn.len() == 10));
        if !valid {
            return Err(InputError::invalid("isbn", format!("'{isbn}' is not an ISBN")));
        }
        Ok(Query::BookByIsbn { isbn })
    }

    pub fn book_search(query: &str, max_results: u32) -> Result<Self, InputError> {
        Ok(Query::BookSearch {
            query: non_empty("q", query)?,
            limit: limit("limit", max_results)?,
        })
    }

    pub fn random_users(count: u32, nationality: &str) -> Result<Self, InputError> {
        Ok(Query::RandomUsers {
            count: limit("count", count)?,
            nationality: code("nationality", nationality)?.to_lowercase(),
        })
    }

    pub fn air_quality(country_code: &str, max_results: u32) -> Result<Self, InputError> {
        Ok(Query::AirQuality {
            country_code: code("country_code", country_code)?,
            limit: limit("limit", max_results)?,
        })
    }

    pub fn provider(&self) -> ProviderId {
        match self {
            Query::ExchangeRates { .. } => ProviderId::ExchangeRates,
            Query::CryptoPrice { .. } => ProviderId::CryptoPrice,
            Query::Weather { .. } => ProviderId::Weather,
            Query::Geocode { .. } => ProviderId::Geocode,
            Query::MacroIndicator { .. } => ProviderId::MacroIndicator,
            Query::CountryInfo { .. } => ProviderId::CountryInfo,
            Query::Holidays { .. } => ProviderId::Holidays,
            Query::BookByIsbn { .. } => ProviderId::BookByIsbn,
            Query::BookSearch { .. } => ProviderId::BookSearch,
            Query::RandomUsers { .. } => ProviderId::RandomUsers,
            Query::AirQuality { .. } => ProviderId::AirQuality,
            Query::IpGeolocation => ProviderId::IpGeolocation,
        }
    }

    /// Deterministic key: `<provider>:<normalized params>`.
    pub fn cache_key(&self) -> String {
        let params = match self {
            Query::ExchangeRates { base, symbols } => format!("{base}:{}", symbols.join(",")),
            Query::CryptoPrice {
                coin_id,
                vs_currency,
            } => format!("{coin_id}:{vs_currency}"),
            Query::Weather {
                latitude,
                longitude,
            } => format!("{latitude},{longitude}"),
            Query::Geocode { address } => address.to_lowercase(),
            Query::MacroIndicator {
                country,
                indicator,
                date_range,
            } => match date_range {
                Some((start, end)) => format!("{country}:{indicator}:{start}:{end}"),
                None => format!("{country}:{indicator}:all"),
            },
            Query::CountryInfo { name } => name.to_lowercase(),
            Query::Holidays { country_code, year } => format!("{country_code}:{year}"),
            Query::BookByIsbn { isbn } => isbn.clone(),
            Query::BookSearch { query, limit } => format!("{}:{limit}", query.to_lowercase()),
            Query::RandomUsers { count, nationality } => format!("{count}:{nationality}"),
            Query::AirQuality {
                country_code,
                limit,
            } => format!("{country_code}:{limit}"),
            Query::IpGeolocation => "self".to_string(),
        };
        format!("{}:{params}", self.provider())
    }

    /// Builds a query from loosely typed `name -> value` parameters, applying
    /// the same defaults an HTTP route would.
    pub fn from_params(
        provider: ProviderId,
        params: &HashMap<String, String>,
    ) -> Result<Self, InputError> {
        let params = Params::new(params);
        let query = match provider {
            ProviderId::ExchangeRates => {
                let symbols: Vec<&str> = params
                    .get(&["symbols"])
                    .map(|s| s.split(',').filter(|s| !s.trim().is_empty()).collect())
                    .unwrap_or_default();
                Query::exchange_rates(params.get(&["base"]).unwrap_or("USD"), symbols.as_slice())?
            }
            ProviderId::CryptoPrice => Query::crypto_price(
                params.require(&["coin_id", "id"], "coin_id")?,
                params.get(&["vs_currency", "currency"]).unwrap_or("usd"),
            )?,
            ProviderId::Weather => Query::weather(
                params.number(&["latitude", "lat"], "latitude")?,
                params.number(&["longitude", "lon"], "longitude")?,
            )?,
            ProviderId::Geocode => Query::geocode(params.require(&["address", "q"], "address")?)?,
            ProviderId::MacroIndicator => Query::macro_indicator(
                params.require(&["country"], "country")?,
                params.get(&["indicator"]).unwrap_or("NY.GDP.MKTP.CD"),
                params.get(&["date_start", "start"]),
                params.get(&["date_end", "end"]),
            )?,
            ProviderId::CountryInfo => {
                Query::country_info(params.require(&["name", "country"], "name")?)?
            }
            ProviderId::Holidays => {
                let year = match params.get(&["year"]) {
                    Some(_) => params.number(&["year"], "year")?,
                    None => chrono::Utc::now().year(),
                };
                Query::holidays(
                    params.require(&["country_code", "country"], "country_code")?,
                    year,
                )?
            }
            ProviderId::BookByIsbn => Query::book_by_isbn(params.require(&["isbn"], "isbn")?)?,
            ProviderId::BookSearch => Query::book_search(
                params.require(&["q", "query"], "q")?,
                params.number_or(&["limit"], "limit", DEFAULT_LIMIT)?,
            )?,
            ProviderId::RandomUsers => Query::random_users(
                params.number_or(&["count", "results"], "count", DEFAULT_LIMIT)?,
                params.get(&["nationality", "nat"]).unwrap_or("us"),
            )?,
            ProviderId::AirQuality => Query::air_quality(
                params.require(&["country_code", "country"], "country_code")?,
                params.number_or(&["limit"], "limit", DEFAULT_LIMIT)?,
            )?,
            ProviderId::IpGeolocation => Query::IpGeolocation,
        };
        params.reject_unused()?;
        Ok(query)
    }
}

/// Tracks which parameters were consumed so typos are reported, not ignored.
///
/// Aliases are looked up in the order given; supplying two spellings of one
/// value is a conflict rather than a silent pick.
struct Params<'a> {
    inner: &'a HashMap<String, String>,
    used: RefCell<Vec<&'a str>>,
    conflict: RefCell<Option<(String, String)>>,
}

impl<'a> Params<'a> {
    fn new(inner: &'a HashMap<String, String>) -> Self {
        Self {
            inner,
            used: RefCell::new(Vec::new()),
            conflict: RefCell::new(None),
        }
    }

    fn get(&self, names: &[&str]) -> Option<&'a str> {
        let mut present = names
            .iter()
            .filter_map(|name| self.inner.get_key_value(*name));
        let (name, value) = present.next()?;
        if let Some((other, _)) = present.next() {
            self.conflict
                .borrow_mut()
                .get_or_insert_with(|| (name.clone(), other.clone()));
        }
        self.used.borrow_mut().push(name.as_str());
        Some(value.as_str())
    }

    fn require(&self, names: &[&str], field: &'static str) -> Result<&'a str, InputError> {
        self.get(names).ok_or(InputError::Missing(field))
    }

    fn number<T: std::str::FromStr>(
        &self,
        names: &[&str],
        field: &'static str,
    ) -> Result<T, InputError> {
        let raw = self.require(names, field)?;
        raw.trim()
            .parse()
            .map_err(|_| InputError::invalid(field, format!("'{raw}' is not a number")))
    }

    fn number_or<T: std::str::FromStr>(
        &self,
        names: &[&str],
        field: &'static str,
        default: T,
    ) -> Result<T, InputError> {
        match self.get(names) {
            Some(_) => self.number(names, field),
            None => Ok(default),
        }
    }

    fn reject_unused(&self) -> Result<(), InputError> {
        if let Some((first, second)) = self.conflict.borrow_mut().take() {
            return Err(InputError::Conflict(first, second));
        }
        let used = self.used.borrow();
        match self
            .inner
            .keys()
            .filter(|k| !used.contains(&k.as_str()))
            .min()
        {
            Some(unknown) => Err(InputError::Unknown(unknown.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_exchange_rate_keys_ignore_case_and_order() {
        let a = Query::exchange_rates("usd", &["EUR", "GBP"]).unwrap();
        let b = Query::exchange_rates("USD", &["GBP", "EUR"]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cache_key(), "exchange_rates:USD:EUR,GBP");
    }

    #[test]
    fn test_exchange_rates_default_symbols() {
        let query = Query::exchange_rates::<&str>("USD", &[]).unwrap();
        assert_eq!(
            query.cache_key(),
            "exchange_rates:USD:EUR,GBP,KES,NGN,TZS,UGX"
        );
    }

    #[test]
    fn test_exchange_rates_deduplicates_symbols() {
        let query = Query::exchange_rates("USD", &["eur", "EUR", " gbp "]).unwrap();
        let Query::ExchangeRates { symbols, .. } = query else {
            panic!("Expected exchange rate query");
        };
        assert_eq!(symbols, vec!["EUR", "GBP"]);
    }

    #[test]
    fn test_country_key_is_lowercase() {
        let a = Query::country_info("Kenya").unwrap();
        let b = Query::country_info("  KENYA ").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
        assert_eq!(a.cache_key(), "country_info:kenya");
    }

    #[test]
    fn test_geocode_key_collapses_whitespace() {
        let a = Query::geocode("Nairobi,   Kenya").unwrap();
        let b = Query::geocode("nairobi, kenya").unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
        // The request keeps the caller's casing.
        assert_eq!(
            a,
            Query::Geocode {
                address: "Nairobi, Kenya".to_string()
            }
        );
    }

    #[test]
    fn test_weather_validation() {
        assert!(Query::weather(-1.286389, 36.817223).is_ok());
        assert!(matches!(
            Query::weather(91.0, 0.0),
            Err(InputError::Invalid {
                field: "latitude",
                ..
            })
        ));
        assert!(matches!(
            Query::weather(0.0, -181.0),
            Err(InputError::Invalid {
                field: "longitude",
                ..
            })
        ));
        assert_eq!(
            Query::weather(-0.0, 0.0).unwrap().cache_key(),
            Query::weather(0.0, 0.0).unwrap().cache_key()
        );
    }

    #[test]
    fn test_isbn_normalization() {
        let query = Query::book_by_isbn("978-0-14-032872-1").unwrap();
        assert_eq!(query.cache_key(), "book_by_isbn:9780140328721");
        assert!(Query::book_by_isbn("080442957X").is_ok());
        assert!(Query::book_by_isbn("12345").is_err());
        assert!(Query::book_by_isbn("97801403287X1").is_err());
    }

    #[test]
    fn test_limits_are_bounded() {
        assert!(Query::book_search("agriculture", 0).is_err());
        assert!(Query::book_search("agriculture", 101).is_err());
        assert!(Query::random_users(100, "KE").is_ok());
        assert!(Query::air_quality("KE", 1).is_ok());
    }

    #[test]
    fn test_macro_single_bound_is_dropped() {
        let open = Query::macro_indicator("ke", "ny.gdp.mktp.cd", Some("2020"), None).unwrap();
        let all = Query::macro_indicator("KE", "NY.GDP.MKTP.CD", None, None).unwrap();
        assert_eq!(open, all);
        assert_eq!(all.cache_key(), "macro_indicator:KE:NY.GDP.MKTP.CD:all");

        let ranged =
            Query::macro_indicator("KE", "NY.GDP.MKTP.CD", Some("2020"), Some("2023")).unwrap();
        assert_eq!(
            ranged.cache_key(),
            "macro_indicator:KE:NY.GDP.MKTP.CD:2020:2023"
        );
        assert!(Query::macro_indicator("KE", "X", Some("twenty"), Some("2023")).is_err());
    }

    #[test]
    fn test_holiday_year_bounds() {
        assert!(Query::holidays("KE", 2024).is_ok());
        assert!(Query::holidays("KE", 1800).is_err());
    }

    #[test]
    fn test_from_params_exchange_rates() {
        let a = Query::from_params(
            ProviderId::ExchangeRates,
            &params(&[("base", "usd"), ("symbols", "EUR,GBP")]),
        )
        .unwrap();
        let b = Query::from_params(
            ProviderId::ExchangeRates,
            &params(&[("base", "USD"), ("symbols", "GBP,EUR")]),
        )
        .unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_from_params_defaults() {
        let crypto =
            Query::from_params(ProviderId::CryptoPrice, &params(&[("coin_id", "Bitcoin")]))
                .unwrap();
        assert_eq!(
            crypto,
            Query::CryptoPrice {
                coin_id: "bitcoin".to_string(),
                vs_currency: "usd".to_string()
            }
        );

        let users = Query::from_params(ProviderId::RandomUsers, &HashMap::new()).unwrap();
        assert_eq!(users.cache_key(), "random_users:10:us");

        let holidays =
            Query::from_params(ProviderId::Holidays, &params(&[("country_code", "ke")])).unwrap();
        let Query::Holidays { year, .. } = holidays else {
            panic!("Expected holidays query");
        };
        assert_eq!(year, chrono::Utc::now().year());
    }

    #[test]
    fn test_from_params_aliases() {
        let weather = Query::from_params(
            ProviderId::Weather,
            &params(&[("lat", "-1.286389"), ("lon", "36.817223")]),
        )
        .unwrap();
        assert_eq!(weather.cache_key(), "weather:-1.286389,36.817223");
    }

    #[test]
    fn test_from_params_errors() {
        assert_eq!(
            Query::from_params(ProviderId::Geocode, &HashMap::new()),
            Err(InputError::Missing("address"))
        );
        assert!(matches!(
            Query::from_params(ProviderId::Weather, &params(&[("lat", "x"), ("lon", "1")])),
            Err(InputError::Invalid {
                field: "latitude",
                ..
            })
        ));
        assert_eq!(
            Query::from_params(ProviderId::IpGeolocation, &params(&[("ip", "1.1.1.1")])),
            Err(InputError::Unknown("ip".to_string()))
        );
    }

    #[test]
    fn test_from_params_alias_conflict() {
        // Fresh maps get fresh hash seeds, so iteration order varies.
        for _ in 0..10 {
            let both = params(&[("lat", "1"), ("latitude", "2"), ("lon", "3")]);
            assert_eq!(
                Query::from_params(ProviderId::Weather, &both),
                Err(InputError::Conflict("latitude".to_string(), "lat".to_string()))
            );
        }
    }

    #[test]
    fn test_from_params_reports_unknown_deterministically() {
        for _ in 0..10 {
            let typos = params(&[("coin_id", "bitcoin"), ("zz", "1"), ("aa", "1"), ("mm", "1")]);
            assert_eq!(
                Query::from_params(ProviderId::CryptoPrice, &typos),
                Err(InputError::Unknown("aa".to_string()))
            );
        }
    }
}
