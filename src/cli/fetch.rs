use super::ui;
use crate::core::{Aggregator, ProviderId, Query};
use anyhow::{Context, Result};
use std::collections::HashMap;

/// Splits `key=value` arguments. Later duplicates win.
pub fn parse_params(args: &[String]) -> Result<HashMap<String, String>> {
    args.iter()
        .map(|arg| {
            let (key, value) = arg
                .split_once('=')
                .with_context(|| format!("Expected key=value, got '{arg}'"))?;
            let key = key.trim();
            anyhow::ensure!(!key.is_empty(), "Empty parameter name in '{arg}'");
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Fetches one provider and prints its envelope as JSON. Failure envelopes
/// are printed too, then reported as an error.
pub async fn run(aggregator: &Aggregator, provider: ProviderId, args: &[String]) -> Result<()> {
    let params = parse_params(args)?;
    let query = Query::from_params(provider, &params)
        .with_context(|| format!("Invalid parameters for {provider}"))?;

    let pb = ui::new_spinner(&format!("Fetching {provider}..."));
    let envelope = aggregator.fetch_envelope(&query).await;
    pb.finish_and_clear();

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    if !envelope.is_success() {
        anyhow::bail!(
            "{provider} request failed with status {}",
            envelope.status()
        );
    }
    Ok(())
}
