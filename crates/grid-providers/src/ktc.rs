//! KeepTradeCut market-valuation loader.
//!
//! The feed is one JSON array of assets (players and rookie picks) with
//! crowd-sourced trade values. Asset ids are numeric upstream and normalized
//! to strings so they can share the crosswalk's native-id space.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};

use crate::{Loader, Params, ProviderClient, ProviderError, RawBatch};

const FORMATS: &[&str] = &["dynasty", "redraft"];

/// Market values for all ranked assets.
pub struct ValuesLoader {
    client: ProviderClient,
}

impl ValuesLoader {
    #[must_use]
    pub const fn new(client: ProviderClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Loader for ValuesLoader {
    fn path(&self) -> &'static str {
        "providers/ktc/values"
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &["format"]
    }

    async fn fetch(&self, params: &Params) -> Result<RawBatch, ProviderError> {
        params.ensure_recognized(self.accepted_params(), self.path())?;
        let format = params.get("format").unwrap_or("dynasty");
        if !FORMATS.contains(&format) {
            return Err(ProviderError::InvalidParameter {
                loader: self.path().to_string(),
                name: "format".to_string(),
                reason: format!("expected one of {}, got '{format}'", FORMATS.join(", ")),
            });
        }

        let url = format!(
            "{}/values.json?format={}",
            self.client.config().ktc_base(),
            urlencoding::encode(format)
        );
        let fetched = self.client.get_json("ktc", &url).await?;
        let fetched_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let rows = values_to_rows(&fetched.body, &fetched_at)?;
        tracing::info!(format, rows = rows.len(), "fetched ktc values");

        Ok(RawBatch::new(
            "ktc",
            "values",
            self.path(),
            fetched.version.unwrap_or_else(|| format.to_string()),
            rows,
        ))
    }
}

pub(crate) fn values_to_rows(body: &Value, fetched_at: &str) -> Result<Vec<Value>, ProviderError> {
    let assets = body
        .as_array()
        .ok_or_else(|| ProviderError::Parse("values feed is not an array".to_string()))?;

    let mut rows = Vec::with_capacity(assets.len());
    for asset in assets {
        let asset_id = match asset.get("playerID") {
            Some(Value::Number(n)) => Value::String(n.to_string()),
            Some(Value::String(s)) => Value::String(s.clone()),
            _ => Value::Null,
        };

        rows.push(json!({
            "asset_id": asset_id,
            "name": asset.get("playerName").cloned().unwrap_or(Value::Null),
            "position": asset.get("position").cloned().unwrap_or(Value::Null),
            "team": asset.get("team").cloned().unwrap_or(Value::Null),
            "value": asset.get("value").cloned().unwrap_or(Value::Null),
            "positional_rank": asset.get("positionalRank").cloned().unwrap_or(Value::Null),
            "fetched_at": fetched_at,
        }));
    }
    Ok(rows)
}
