use super::http::{endpoint_with_query, mismatch, parse_json};
use crate::core::{Adapter, DemoUser, FetchError, Payload, ProviderSpec, Query, UserLocation};
use reqwest::Url;
use serde::Deserialize;

/// Synthetic demo people from randomuser.me.
pub struct RandomUserProvider {
    spec: ProviderSpec,
}

impl RandomUserProvider {
    pub fn new(spec: ProviderSpec) -> Self {
        Self { spec }
    }
}

#[derive(Deserialize, Debug)]
struct UsersResponse {
    error: Option<String>,
    #[serde(default)]
    results: Vec<RawUser>,
}

#[derive(Deserialize, Debug)]
struct RawUser {
    name: RawName,
    gender: String,
    email: String,
    phone: String,
    location: RawLocation,
    dob: RawDob,
    picture: RawPicture,
}

#[derive(Deserialize, Debug)]
struct RawName {
    first: String,
    last: String,
}

// `state` and `city` are occasionally numeric for some nationalities.
#[derive(Deserialize, Debug)]
struct RawLocation {
    city: serde_json::Value,
    state: serde_json::Value,
    country: String,
}

#[derive(Deserialize, Debug)]
struct RawDob {
    date: String,
    age: u32,
}

#[derive(Deserialize, Debug)]
struct RawPicture {
    large: String,
}

fn text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl Adapter for RandomUserProvider {
    fn spec(&self) -> &ProviderSpec {
        &self.spec
    }

    fn request(&self, query: &Query) -> Result<Url, FetchError> {
        let Query::RandomUsers { count, nationality } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        let count = count.to_string();
        endpoint_with_query(
            &self.spec.base_url,
            &["api", ""],
            &[("results", count.as_str()), ("nat", nationality.as_str())],
        )
    }

    fn normalize(&self, query: &Query, body: &str) -> Result<Payload, FetchError> {
        let Query::RandomUsers { nationality, .. } = query else {
            return Err(mismatch(self.spec.id, query));
        };
        let data: UsersResponse = parse_json(self.spec.id, body)?;
        if let Some(error) = data.error {
            return Err(FetchError::unavailable(format!(
                "randomuser.me rejected request: {error}"
            )));
        }
        if data.results.is_empty() {
            return Err(FetchError::not_found(format!(
                "No users generated for nationality '{nationality}'"
            )));
        }

        Ok(Payload::Users(
            data.results
                .into_iter()
                .map(|u| DemoUser {
                    name: format!("{} {}", u.name.first, u.name.last),
                    gender: u.gender,
                    email: u.email,
                    phone: u.phone,
                    location: UserLocation {
                        city: text(u.location.city),
                        state: text(u.location.state),
                        country: u.location.country,
                    },
                    dob: u.dob.date,
                    age: u.dob.age,
                    picture: u.picture.large,
                })
                .collect(),
        ))
    }
}
