//! Stable internal shapes that provider responses are normalized into.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CryptoPrice {
    pub coin_id: String,
    pub currency: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub temperature: f64,
    pub windspeed: f64,
    pub weathercode: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroPoint {
    pub date: String,
    pub value: Option<f64>,
    pub country: Option<String>,
    pub indicator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyInfo {
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryInfo {
    pub name: Option<String>,
    pub official_name: Option<String>,
    pub capital: String,
    pub population: Option<u64>,
    pub area: Option<f64>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub flag: Option<String>,
    pub currencies: BTreeMap<String, CurrencyInfo>,
    pub languages: BTreeMap<String, String>,
    pub timezones: Vec<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub local_name: String,
    pub name: String,
    pub country_code: String,
    pub global: bool,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub cover: Option<String>,
    pub publishers: Vec<String>,
    pub publish_date: Option<String>,
    pub subjects: Vec<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSummary {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub first_publish_year: Option<i32>,
    pub isbn: String,
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserLocation {
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoUser {
    pub name: String,
    pub gender: String,
    pub email: String,
    pub phone: String,
    pub location: UserLocation,
    pub dob: String,
    pub age: u32,
    pub picture: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub parameter: String,
    pub value: f64,
    pub unit: String,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQualityStation {
    pub location: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub measurements: Vec<Measurement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IpLocation {
    pub ip: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub currency: Option<String>,
}

/// One normalized result; the variant always matches the provider that
/// produced it. Serialized untagged as the envelope's `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Rates(BTreeMap<String, f64>),
    Crypto(CryptoPrice),
    Weather(CurrentWeather),
    Location(Location),
    Macro(Vec<MacroPoint>),
    Country(Box<CountryInfo>),
    Holidays(Vec<Holiday>),
    Book(Book),
    Books(Vec<BookSummary>),
    Users(Vec<DemoUser>),
    AirQuality(Vec<AirQualityStation>),
    IpLocation(IpLocation),
}

impl Payload {
    /// Number of records carried, used for display counts.
    pub fn count(&self) -> usize {
        match self {
            Payload::Rates(rates) => rates.len(),
            Payload::Macro(points) => points.len(),
            Payload::Holidays(holidays) => holidays.len(),
            Payload::Books(books) => books.len(),
            Payload::Users(users) => users.len(),
            Payload::AirQuality(stations) => stations.len(),
            _ => 1,
        }
    }
}
