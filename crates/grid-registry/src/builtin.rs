//! Built-in contracts for every known (provider, dataset) pair.
//!
//! This is the registry's deployment surface: schema changes land here as a
//! new contract version, shipped with the process, never mutated at runtime.

use grid_core::enums::{EntityKind, SemanticType};

use crate::contract::{ColumnSpec, DatasetContract, EntityRef};
use crate::error::RegistryError;
use crate::registry::Registry;

use SemanticType::{Bool, Date, Float, Int, Str, Timestamp};

fn col(name: &str, ty: SemanticType) -> ColumnSpec {
    ColumnSpec::new(name, ty)
}

fn player_ref(column: &str) -> Option<EntityRef> {
    Some(EntityRef {
        column: column.to_string(),
        kind: EntityKind::Player,
    })
}

/// Register all built-in contracts. Called once from
/// [`Registry::with_builtin`].
pub fn register_builtin(registry: &mut Registry) -> Result<(), RegistryError> {
    // ── nflverse: weekly player statistics feed ────────────────────────
    registry.register(DatasetContract {
        provider: "nflverse".to_string(),
        dataset: "weekly_stats".to_string(),
        loader_path: "providers/nflverse/weekly_stats".to_string(),
        primary_key: vec![
            "player_id".to_string(),
            "season".to_string(),
            "week".to_string(),
        ],
        schema: vec![
            col("player_id", Str),
            col("player_name", Str),
            col("position", Str),
            col("team", Str),
            col("season", Int),
            col("week", Int),
            col("passing_yards", Float),
            col("rushing_yards", Float),
            col("receiving_yards", Float),
            col("fantasy_points_ppr", Float),
        ],
        entity_ref: player_ref("player_id"),
    })?;

    registry.register(DatasetContract {
        provider: "nflverse".to_string(),
        dataset: "players".to_string(),
        loader_path: "providers/nflverse/players".to_string(),
        primary_key: vec!["player_id".to_string()],
        schema: vec![
            col("player_id", Str),
            col("name", Str),
            col("position", Str),
            col("team", Str),
            col("birth_date", Date),
            col("rookie_year", Int),
        ],
        entity_ref: player_ref("player_id"),
    })?;

    // ── sleeper: roster/league platform ────────────────────────────────
    registry.register(DatasetContract {
        provider: "sleeper".to_string(),
        dataset: "players".to_string(),
        loader_path: "providers/sleeper/players".to_string(),
        primary_key: vec!["player_id".to_string()],
        schema: vec![
            col("player_id", Str),
            col("full_name", Str),
            col("position", Str),
            col("team", Str),
            col("status", Str),
            col("active", Bool),
        ],
        entity_ref: player_ref("player_id"),
    })?;

    registry.register(DatasetContract {
        provider: "sleeper".to_string(),
        dataset: "rosters".to_string(),
        loader_path: "providers/sleeper/rosters".to_string(),
        primary_key: vec!["league_id".to_string(), "roster_id".to_string()],
        schema: vec![
            col("league_id", Str),
            col("roster_id", Int),
            col("owner_id", Str),
            // JSON-encoded list of sleeper player ids; exploded downstream.
            col("players", Str),
            col("wins", Int),
            col("losses", Int),
        ],
        entity_ref: None,
    })?;

    registry.register(DatasetContract {
        provider: "sleeper".to_string(),
        dataset: "leagues".to_string(),
        loader_path: "providers/sleeper/leagues".to_string(),
        primary_key: vec!["league_id".to_string()],
        schema: vec![
            col("league_id", Str),
            col("name", Str),
            col("season", Int),
            col("total_rosters", Int),
            col("status", Str),
        ],
        entity_ref: None,
    })?;

    // ── ktc: market valuation feed ─────────────────────────────────────
    registry.register(DatasetContract {
        provider: "ktc".to_string(),
        dataset: "values".to_string(),
        loader_path: "providers/ktc/values".to_string(),
        primary_key: vec!["asset_id".to_string()],
        schema: vec![
            col("asset_id", Str),
            col("name", Str),
            col("position", Str),
            col("team", Str),
            col("value", Int),
            col("positional_rank", Int),
            col("fetched_at", Timestamp),
        ],
        entity_ref: player_ref("asset_id"),
    })?;

    // ── sheets: commissioner transaction log ───────────────────────────
    registry.register(DatasetContract {
        provider: "sheets".to_string(),
        dataset: "transactions".to_string(),
        loader_path: "providers/sheets/transactions".to_string(),
        primary_key: vec!["txn_id".to_string()],
        schema: vec![
            col("txn_id", Str),
            col("date", Date),
            col("kind", Str),
            col("team", Str),
            col("player", Str),
            col("notes", Str),
        ],
        entity_ref: None,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_builtin_primary_keys_declared() {
        let registry = Registry::with_builtin();
        for (provider, dataset) in registry.list() {
            let contract = registry.resolve(provider, dataset).unwrap();
            assert!(
                contract.primary_key_is_declared(),
                "{provider}/{dataset} primary key references undeclared columns"
            );
        }
    }

    #[test]
    fn entity_ref_columns_are_declared() {
        let registry = Registry::with_builtin();
        for (provider, dataset) in registry.list() {
            let contract = registry.resolve(provider, dataset).unwrap();
            if let Some(entity_ref) = &contract.entity_ref {
                assert!(
                    contract.column(&entity_ref.column).is_some(),
                    "{provider}/{dataset} entity ref column is undeclared"
                );
            }
        }
    }

    #[test]
    fn loader_paths_are_unique() {
        let registry = Registry::with_builtin();
        let mut paths: Vec<String> = registry
            .list()
            .into_iter()
            .map(|(p, d)| registry.resolve(p, d).unwrap().loader_path.clone())
            .collect();
        let before = paths.len();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), before, "duplicate loader paths in builtins");
    }
}
