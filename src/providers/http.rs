//! Shared request execution and failure classification for HTTP adapters.

use crate::core::{Adapter, FetchError, Payload, ProviderId, ProviderSpec, Query};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Builds the client every adapter shares.
pub fn build_client(user_agent: &str) -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder().user_agent(user_agent).build()?)
}

/// Sends the adapter's request once, bounded by its timeout, and hands a
/// success body to its normalizer.
#[instrument(
    name = "UpstreamFetch",
    skip(adapter, client),
    fields(provider = %adapter.spec().id)
)]
pub async fn execute<A>(
    adapter: &A,
    client: &reqwest::Client,
    query: &Query,
) -> Result<Payload, FetchError>
where
    A: Adapter + ?Sized,
{
    let spec = adapter.spec();
    let url = adapter.request(query)?;
    debug!("Requesting {} data from {}", spec.id, url);

    let mut request = client.get(url).timeout(spec.timeout);
    for (name, value) in adapter.headers() {
        request = request.header(name, value);
    }

    let response = request
        .send()
        .await
        .map_err(|e| transport_error(spec, &e))?;
    debug!(status = %response.status(), "Received {} response", spec.id);

    let status = response.status();
    if !status.is_success() {
        return Err(adapter.classify_status(query, status));
    }

    let body = response
        .text()
        .await
        .map_err(|e| transport_error(spec, &e))?;
    adapter.normalize(query, &body)
}

fn transport_error(spec: &ProviderSpec, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::unavailable(format!(
            "Request to {} timed out after {}s",
            spec.id,
            spec.timeout.as_secs_f64()
        ))
    } else {
        FetchError::unavailable(format!("Request error: {} for {}", err, spec.id))
    }
}

/// `base_url` with `segments` appended as percent-encoded path segments.
pub fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, FetchError> {
    let mut url = Url::parse(base_url)
        .map_err(|e| FetchError::unavailable(format!("Invalid base URL {base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::unavailable(format!("Base URL cannot hold a path: {base_url}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// `endpoint` plus an encoded query string.
pub fn endpoint_with_query(
    base_url: &str,
    segments: &[&str],
    params: &[(&str, &str)],
) -> Result<Url, FetchError> {
    let mut url = endpoint(base_url, segments)?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

pub fn parse_json<T: DeserializeOwned>(provider: ProviderId, body: &str) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|e| {
        FetchError::unavailable(format!("Failed to parse JSON response for {provider}: {e}"))
    })
}

/// Failure for a query routed to the wrong adapter.
pub fn mismatch(provider: ProviderId, query: &Query) -> FetchError {
    FetchError::unavailable(format!(
        "{provider} adapter cannot serve a {} query",
        query.provider()
    ))
}
