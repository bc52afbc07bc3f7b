//! nflverse statistics feed loaders.
//!
//! nflverse publishes its data as versioned CSV release artifacts. Both
//! loaders fetch one artifact, decode it, and rename the handful of native
//! headers that differ from the contract schema.

use async_trait::async_trait;
use serde_json::Value;

use crate::tabular::{rename_columns, rows_from_csv};
use crate::{Loader, Params, ProviderClient, ProviderError, RawBatch, parse_week_range};

// ── weekly_stats ───────────────────────────────────────────────────

/// Weekly per-player statistics for one season, optionally narrowed to a
/// week window.
pub struct WeeklyStatsLoader {
    client: ProviderClient,
}

impl WeeklyStatsLoader {
    #[must_use]
    pub const fn new(client: ProviderClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Loader for WeeklyStatsLoader {
    fn path(&self) -> &'static str {
        "providers/nflverse/weekly_stats"
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &["season", "weeks"]
    }

    async fn fetch(&self, params: &Params) -> Result<RawBatch, ProviderError> {
        params.ensure_recognized(self.accepted_params(), self.path())?;
        let season = params.require_u16("season", self.path())?;
        let weeks = params
            .get("weeks")
            .map(|w| parse_week_range(w, self.path()))
            .transpose()?;

        let artifact = format!("player_stats_{season}.csv");
        let url = format!(
            "{}/player_stats/{artifact}",
            self.client.config().nflverse_base()
        );
        let fetched = self.client.get_text("nflverse", &url).await?;

        let mut rows = rows_from_csv(fetched.body.as_bytes())?;
        rename_columns(&mut rows, &[("recent_team", "team")]);
        if let Some(range) = &weeks {
            rows.retain(|row| {
                row.get("week")
                    .and_then(Value::as_i64)
                    .and_then(|w| u16::try_from(w).ok())
                    .is_some_and(|w| range.contains(&w))
            });
        }
        tracing::info!(season, rows = rows.len(), "fetched nflverse weekly stats");

        let version = fetched
            .version
            .map_or_else(|| artifact.clone(), |v| format!("{artifact}@{v}"));
        Ok(RawBatch::new(
            "nflverse",
            "weekly_stats",
            self.path(),
            version,
            rows,
        ))
    }
}

// ── players ────────────────────────────────────────────────────────

/// The nflverse player index, keyed by GSIS id.
pub struct PlayersLoader {
    client: ProviderClient,
}

impl PlayersLoader {
    #[must_use]
    pub const fn new(client: ProviderClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Loader for PlayersLoader {
    fn path(&self) -> &'static str {
        "providers/nflverse/players"
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &[]
    }

    async fn fetch(&self, params: &Params) -> Result<RawBatch, ProviderError> {
        params.ensure_recognized(self.accepted_params(), self.path())?;

        let url = format!(
            "{}/players/players.csv",
            self.client.config().nflverse_base()
        );
        let fetched = self.client.get_text("nflverse", &url).await?;

        let mut rows = rows_from_csv(fetched.body.as_bytes())?;
        rename_columns(
            &mut rows,
            &[
                ("gsis_id", "player_id"),
                ("display_name", "name"),
                ("latest_team", "team"),
                ("rookie_season", "rookie_year"),
            ],
        );
        // The index includes players who never received a GSIS id; they can't
        // participate in keying or crosswalk and are dropped here.
        let before = rows.len();
        rows.retain(|row| row.get("player_id").is_some_and(Value::is_string));
        if rows.len() < before {
            tracing::debug!(dropped = before - rows.len(), "players without gsis id");
        }

        let version = fetched.version.unwrap_or_else(|| "players.csv".to_string());
        Ok(RawBatch::new(
            "nflverse",
            "players",
            self.path(),
            version,
            rows,
        ))
    }
}
