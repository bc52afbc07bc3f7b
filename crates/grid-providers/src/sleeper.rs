//! Sleeper league-platform loaders.
//!
//! Sleeper exposes an unauthenticated JSON REST API. Response shapes are
//! mapped to contract rows here; anything the contract doesn't declare is
//! carried through untouched and left to the quality gate's drift handling.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{Loader, Params, ProviderClient, ProviderError, RawBatch};

const SOURCE: &str = "sleeper";

fn unversioned(version: Option<String>) -> String {
    version.unwrap_or_else(|| "unversioned".to_string())
}

// ── players ────────────────────────────────────────────────────────

/// The full Sleeper player index (`/players/nfl`), a map keyed by player id.
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
        "providers/sleeper/players"
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &[]
    }

    async fn fetch(&self, params: &Params) -> Result<RawBatch, ProviderError> {
        params.ensure_recognized(self.accepted_params(), self.path())?;

        let url = format!("{}/players/nfl", self.client.config().sleeper_base());
        let fetched = self.client.get_json(SOURCE, &url).await?;
        let rows = players_to_rows(&fetched.body)?;
        tracing::info!(rows = rows.len(), "fetched sleeper player index");

        Ok(RawBatch::new(
            SOURCE,
            "players",
            self.path(),
            unversioned(fetched.version),
            rows,
        ))
    }
}

pub(crate) fn players_to_rows(body: &Value) -> Result<Vec<Value>, ProviderError> {
    let map = body
        .as_object()
        .ok_or_else(|| ProviderError::Parse("players index is not an object".to_string()))?;

    let mut rows = Vec::with_capacity(map.len());
    for (player_id, player) in map {
        let full_name = player
            .get("full_name")
            .and_then(Value::as_str)
            .map_or_else(
                || {
                    let first = player.get("first_name").and_then(Value::as_str);
                    let last = player.get("last_name").and_then(Value::as_str);
                    match (first, last) {
                        (Some(f), Some(l)) => Some(format!("{f} {l}")),
                        _ => None,
                    }
                },
                |s| Some(s.to_string()),
            );

        rows.push(json!({
            "player_id": player_id,
            "full_name": full_name,
            "position": player.get("position").cloned().unwrap_or(Value::Null),
            "team": player.get("team").cloned().unwrap_or(Value::Null),
            "status": player.get("status").cloned().unwrap_or(Value::Null),
            "active": player.get("active").cloned().unwrap_or(Value::Null),
        }));
    }
    Ok(rows)
}

// ── rosters ────────────────────────────────────────────────────────

/// Rosters of one league (`/league/{league_id}/rosters`).
pub struct RostersLoader {
    client: ProviderClient,
}

impl RostersLoader {
    #[must_use]
    pub const fn new(client: ProviderClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Loader for RostersLoader {
    fn path(&self) -> &'static str {
        "providers/sleeper/rosters"
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &["league_id"]
    }

    async fn fetch(&self, params: &Params) -> Result<RawBatch, ProviderError> {
        params.ensure_recognized(self.accepted_params(), self.path())?;
        let league_id = params.require("league_id", self.path())?;

        let url = format!(
            "{}/league/{league_id}/rosters",
            self.client.config().sleeper_base()
        );
        let fetched = self.client.get_json(SOURCE, &url).await?;
        let rows = rosters_to_rows(league_id, &fetched.body)?;

        Ok(RawBatch::new(
            SOURCE,
            "rosters",
            self.path(),
            unversioned(fetched.version),
            rows,
        ))
    }
}

pub(crate) fn rosters_to_rows(league_id: &str, body: &Value) -> Result<Vec<Value>, ProviderError> {
    let rosters = body
        .as_array()
        .ok_or_else(|| ProviderError::Parse("rosters response is not an array".to_string()))?;

    let mut rows = Vec::with_capacity(rosters.len());
    for roster in rosters {
        let settings = roster.get("settings").cloned().unwrap_or(Value::Null);
        // The player-id list is kept as one JSON-encoded string column; the
        // transformation layer explodes it.
        let players = roster
            .get("players")
            .filter(|p| !p.is_null())
            .map(|p| {
                serde_json::to_string(p).map_err(|e| ProviderError::Parse(e.to_string()))
            })
            .transpose()?;

        rows.push(json!({
            "league_id": league_id,
            "roster_id": roster.get("roster_id").cloned().unwrap_or(Value::Null),
            "owner_id": roster.get("owner_id").cloned().unwrap_or(Value::Null),
            "players": players,
            "wins": settings.get("wins").cloned().unwrap_or(Value::Null),
            "losses": settings.get("losses").cloned().unwrap_or(Value::Null),
        }));
    }
    Ok(rows)
}

// ── leagues ────────────────────────────────────────────────────────

/// Leagues of one user for one season (`/user/{user_id}/leagues/nfl/{season}`).
pub struct LeaguesLoader {
    client: ProviderClient,
}

impl LeaguesLoader {
    #[must_use]
    pub const fn new(client: ProviderClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Loader for LeaguesLoader {
    fn path(&self) -> &'static str {
        "providers/sleeper/leagues"
    }

    fn accepted_params(&self) -> &'static [&'static str] {
        &["user_id", "season"]
    }

    async fn fetch(&self, params: &Params) -> Result<RawBatch, ProviderError> {
        params.ensure_recognized(self.accepted_params(), self.path())?;
        let user_id = params.require("user_id", self.path())?;
        let season = params.require_u16("season", self.path())?;

        let url = format!(
            "{}/user/{user_id}/leagues/nfl/{season}",
            self.client.config().sleeper_base()
        );
        let fetched = self.client.get_json(SOURCE, &url).await?;
        let rows = leagues_to_rows(&fetched.body)?;

        Ok(RawBatch::new(
            SOURCE,
            "leagues",
            self.path(),
            unversioned(fetched.version),
            rows,
        ))
    }
}

pub(crate) fn leagues_to_rows(body: &Value) -> Result<Vec<Value>, ProviderError> {
    let leagues = body
        .as_array()
        .ok_or_else(|| ProviderError::Parse("leagues response is not an array".to_string()))?;

    let mut rows = Vec::with_capacity(leagues.len());
    for league in leagues {
        // Sleeper serializes season as a string; the contract wants an int.
        let season = league
            .get("season")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<i64>().ok())
            .map_or(Value::Null, Value::from);

        rows.push(json!({
            "league_id": league.get("league_id").cloned().unwrap_or(Value::Null),
            "name": league.get("name").cloned().unwrap_or(Value::Null),
            "season": season,
            "total_rosters": league.get("total_rosters").cloned().unwrap_or(Value::Null),
            "status": league.get("status").cloned().unwrap_or(Value::Null),
        }));
    }
    Ok(rows)
}
