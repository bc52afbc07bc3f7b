//! End-to-end runner coverage over an in-memory snapshot store and stub
//! loaders: publication, idempotent re-runs, gate rejections, last-known-good
//! fallback, batch isolation, and crosswalk annotation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use arrow_array::Array;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use grid_core::entities::CanonicalEntity;
use grid_core::enums::{EntityKind, QualityCheck, RunStatus, SemanticType, Severity};
use grid_crosswalk::Crosswalk;
use grid_lake::SnapshotStore;
use grid_pipeline::{DatasetRunner, QualityGate};
use grid_providers::{Loader, Loaders, Params, ProviderError, RawBatch};
use grid_registry::{ColumnSpec, DatasetContract, EntityRef, Registry};
use serde_json::{Value, json};

// ── Stub loaders ───────────────────────────────────────────────────

struct StaticLoader {
    path: &'static str,
    provider: &'static str,
    dataset: &'static str,
    rows: Vec<Value>,
}

#[async_trait]
impl Loader for StaticLoader {
    fn path(&self) -> &'static str {
        self.path
    }
    fn accepted_params(&self) -> &'static [&'static str] {
        &[]
    }
    async fn fetch(&self, params: &Params) -> Result<RawBatch, ProviderError> {
        params.ensure_recognized(self.accepted_params(), self.path())?;
        Ok(RawBatch::new(
            self.provider,
            self.dataset,
            self.path,
            "test-v1",
            self.rows.clone(),
        ))
    }
}

/// Returns queued responses in order, one per fetch.
struct QueueLoader {
    path: &'static str,
    provider: &'static str,
    dataset: &'static str,
    responses: Mutex<Vec<Vec<Value>>>,
}

#[async_trait]
impl Loader for QueueLoader {
    fn path(&self) -> &'static str {
        self.path
    }
    fn accepted_params(&self) -> &'static [&'static str] {
        &[]
    }
    async fn fetch(&self, _params: &Params) -> Result<RawBatch, ProviderError> {
        let rows = self
            .responses
            .lock()
            .unwrap()
            .pop()
            .expect("queue exhausted");
        Ok(RawBatch::new(
            self.provider,
            self.dataset,
            self.path,
            "test-v1",
            rows,
        ))
    }
}

struct UnavailableLoader {
    path: &'static str,
}

#[async_trait]
impl Loader for UnavailableLoader {
    fn path(&self) -> &'static str {
        self.path
    }
    fn accepted_params(&self) -> &'static [&'static str] {
        &[]
    }
    async fn fetch(&self, _params: &Params) -> Result<RawBatch, ProviderError> {
        Err(ProviderError::SourceUnavailable {
            source_name: "sourceB".to_string(),
            attempts: 3,
            last_error: "API error (503): upstream down".to_string(),
        })
    }
}

// ── Fixtures ───────────────────────────────────────────────────────

fn players_contract(provider: &str) -> DatasetContract {
    DatasetContract {
        provider: provider.to_string(),
        dataset: "players".to_string(),
        loader_path: "providers/test/players".to_string(),
        primary_key: vec!["player_id".to_string()],
        schema: vec![
            ColumnSpec::new("player_id", SemanticType::Str),
            ColumnSpec::new("name", SemanticType::Str),
            ColumnSpec::new("team", SemanticType::Str),
            ColumnSpec::new("position", SemanticType::Str),
            ColumnSpec::new("points", SemanticType::Float),
        ],
        entity_ref: Some(EntityRef {
            column: "player_id".to_string(),
            kind: EntityKind::Player,
        }),
    }
}

fn weekly_contract() -> DatasetContract {
    DatasetContract {
        provider: "sourceB".to_string(),
        dataset: "weekly".to_string(),
        loader_path: "providers/sourceB/weekly".to_string(),
        primary_key: vec!["row_id".to_string()],
        schema: vec![
            ColumnSpec::new("row_id", SemanticType::Str),
            ColumnSpec::new("points", SemanticType::Float),
        ],
        entity_ref: None,
    }
}

fn good_rows() -> Vec<Value> {
    vec![
        json!({"player_id": "P1", "name": "Josh Allen", "team": "BUF", "position": "QB", "points": 24.7}),
        json!({"player_id": "P2", "name": "Justin Jefferson", "team": "MIN", "position": "WR", "points": 18.2}),
    ]
}

fn dup_rows() -> Vec<Value> {
    vec![
        json!({"player_id": "P1", "name": "Josh Allen", "team": "BUF", "position": "QB", "points": 24.7}),
        json!({"player_id": "P1", "name": "Josh Allen", "team": "BUF", "position": "QB", "points": 11.0}),
    ]
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn curated_crosswalk() -> Arc<Crosswalk> {
    let crosswalk = Crosswalk::in_memory();
    crosswalk
        .add_entity(CanonicalEntity {
            canonical_id: "ply-josh-allen".to_string(),
            kind: EntityKind::Player,
            name: "Josh Allen".to_string(),
            team: Some("BUF".to_string()),
            position: Some("QB".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .unwrap();
    crosswalk.propose_alias("test", "P1", "ply-josh-allen").unwrap();
    Arc::new(crosswalk)
}

fn runner_with(
    contracts: Vec<DatasetContract>,
    loaders: Vec<Arc<dyn Loader>>,
    crosswalk: Arc<Crosswalk>,
) -> (DatasetRunner, Arc<SnapshotStore>) {
    let mut registry = Registry::new();
    for contract in contracts {
        registry.register(contract).unwrap();
    }
    let mut loader_set = Loaders::new();
    for loader in loaders {
        loader_set.insert(loader);
    }
    let store = Arc::new(SnapshotStore::in_memory());
    let runner = DatasetRunner::new(
        Arc::new(registry),
        loader_set,
        crosswalk,
        Arc::clone(&store),
        QualityGate::new(grid_config::QualityConfig::default()),
    );
    (runner, store)
}

// ── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn clean_run_publishes() {
    let (runner, store) = runner_with(
        vec![players_contract("test")],
        vec![Arc::new(StaticLoader {
            path: "providers/test/players",
            provider: "test",
            dataset: "players",
            rows: good_rows(),
        })],
        curated_crosswalk(),
    );

    let result = runner
        .run("test", "players", date("2024-10-01"), &Params::new())
        .await;

    // P2 is unresolved, so the run publishes with a warning
    assert_eq!(result.status, RunStatus::PublishedWithWarnings);
    let snapshot = result.snapshot.expect("snapshot published");
    assert_eq!(snapshot.meta.row_count, 2);
    assert_eq!(snapshot.meta.loader_path, "providers/test/players");
    assert_eq!(snapshot.meta.source_version, "test-v1");

    let latest = store.latest("test", "players").await.unwrap().unwrap();
    assert_eq!(latest.content_id, snapshot.content_id);
}

#[tokio::test]
async fn published_rows_carry_canonical_annotation() {
    let (runner, store) = runner_with(
        vec![players_contract("test")],
        vec![Arc::new(StaticLoader {
            path: "providers/test/players",
            provider: "test",
            dataset: "players",
            rows: good_rows(),
        })],
        curated_crosswalk(),
    );

    let result = runner
        .run("test", "players", date("2024-10-01"), &Params::new())
        .await;
    let snapshot = result.snapshot.unwrap();

    let bytes = store.read_data(&snapshot).await.unwrap();
    let mut reader =
        arrow_ipc::reader::FileReader::try_new(std::io::Cursor::new(bytes), None).unwrap();
    let batch = reader.next().unwrap().unwrap();

    let canonical = batch
        .column_by_name("canonical_id")
        .unwrap()
        .as_any()
        .downcast_ref::<arrow_array::StringArray>()
        .unwrap();
    let flags = batch
        .column_by_name("canonical_unresolved")
        .unwrap()
        .as_any()
        .downcast_ref::<arrow_array::BooleanArray>()
        .unwrap();

    // P1 resolved via curated alias, P2 retained but flagged
    assert_eq!(canonical.value(0), "ply-josh-allen");
    assert!(!flags.value(0));
    assert!(canonical.is_null(1));
    assert!(flags.value(1));

    let unresolved_warn = result
        .findings
        .iter()
        .find(|f| f.check == QualityCheck::EntityResolution)
        .expect("unresolved finding surfaced");
    assert_eq!(unresolved_warn.severity, Severity::Warn);
    assert_eq!(unresolved_warn.affected_rows, 1);
}

#[tokio::test]
async fn rerun_with_identical_content_is_deterministic_noop() {
    let (runner, store) = runner_with(
        vec![players_contract("test")],
        vec![Arc::new(StaticLoader {
            path: "providers/test/players",
            provider: "test",
            dataset: "players",
            rows: good_rows(),
        })],
        curated_crosswalk(),
    );
    let as_of = date("2024-10-01");

    let first = runner.run("test", "players", as_of, &Params::new()).await;
    let second = runner.run("test", "players", as_of, &Params::new()).await;

    assert!(second.status.has_snapshot());
    assert!(
        second
            .findings
            .iter()
            .any(|f| f.check == QualityCheck::Publication && f.severity == Severity::Warn)
    );
    assert_eq!(
        second.snapshot.as_ref().unwrap().content_id,
        first.snapshot.as_ref().unwrap().content_id,
        "never two divergent snapshots for one identity"
    );

    assert_eq!(store.partitions("test", "players").await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_keys_block_publication_and_prior_stays_latest() {
    let (runner, store) = runner_with(
        vec![players_contract("test")],
        vec![Arc::new(QueueLoader {
            path: "providers/test/players",
            provider: "test",
            dataset: "players",
            // popped back-to-front
            responses: Mutex::new(vec![dup_rows(), good_rows()]),
        })],
        curated_crosswalk(),
    );

    let first = runner
        .run("test", "players", date("2024-10-01"), &Params::new())
        .await;
    assert!(first.status.has_snapshot());
    let first_snapshot = first.snapshot.unwrap();

    let second = runner
        .run("test", "players", date("2024-10-02"), &Params::new())
        .await;
    assert_eq!(second.status, RunStatus::LkgFallback);
    assert!(
        second
            .findings
            .iter()
            .any(|f| f.check == QualityCheck::KeyUniqueness && f.is_blocking())
    );
    assert!(
        second
            .findings
            .iter()
            .any(|f| f.check == QualityCheck::Freshness && f.severity == Severity::Warn)
    );

    // prior snapshot (if any) remains latest
    let latest = store.latest("test", "players").await.unwrap().unwrap();
    assert_eq!(latest.content_id, first_snapshot.content_id);
    assert_eq!(latest.as_of, date("2024-10-01"));
}

#[tokio::test]
async fn gate_rejection_with_no_prior_snapshot_fails() {
    let (runner, store) = runner_with(
        vec![players_contract("test")],
        vec![Arc::new(StaticLoader {
            path: "providers/test/players",
            provider: "test",
            dataset: "players",
            rows: dup_rows(),
        })],
        curated_crosswalk(),
    );

    let result = runner
        .run("test", "players", date("2024-10-01"), &Params::new())
        .await;
    assert_eq!(result.status, RunStatus::Failed);
    assert!(result.snapshot.is_none());
    assert!(store.latest("test", "players").await.unwrap().is_none());
}

#[tokio::test]
async fn exhausted_source_falls_back_to_last_known_good() {
    let (runner, store) = runner_with(
        vec![weekly_contract()],
        vec![Arc::new(QueueLoader {
            path: "providers/sourceB/weekly",
            provider: "sourceB",
            dataset: "weekly",
            responses: Mutex::new(vec![vec![
                json!({"row_id": "r1", "points": 7.5}),
            ]]),
        })],
        Arc::new(Crosswalk::in_memory()),
    );

    // Seed one good snapshot, then swap in an unavailable loader
    let seeded = runner
        .run("sourceB", "weekly", date("2024-09-30"), &Params::new())
        .await;
    assert!(seeded.status.has_snapshot());

    // Same store, new runner with the failing loader
    let mut registry = Registry::new();
    registry.register(weekly_contract()).unwrap();
    let mut loaders = Loaders::new();
    loaders.insert(Arc::new(UnavailableLoader {
        path: "providers/sourceB/weekly",
    }));
    let runner = DatasetRunner::new(
        Arc::new(registry),
        loaders,
        Arc::new(Crosswalk::in_memory()),
        Arc::clone(&store),
        QualityGate::new(grid_config::QualityConfig::default()),
    );

    let result = runner
        .run("sourceB", "weekly", date("2024-10-01"), &Params::new())
        .await;

    assert_eq!(result.status, RunStatus::LkgFallback);
    let stale = result
        .findings
        .iter()
        .find(|f| f.check == QualityCheck::Freshness)
        .expect("stale-data warning present");
    assert_eq!(stale.severity, Severity::Warn);
    assert!(stale.description.contains("stale data"));

    // Store unchanged: latest is still the date before the failed run
    let latest = store.latest("sourceB", "weekly").await.unwrap().unwrap();
    assert_eq!(latest.as_of, date("2024-09-30"));
}

#[tokio::test]
async fn unavailable_source_with_empty_store_fails() {
    let (runner, _store) = runner_with(
        vec![weekly_contract()],
        vec![Arc::new(UnavailableLoader {
            path: "providers/sourceB/weekly",
        })],
        Arc::new(Crosswalk::in_memory()),
    );

    let result = runner
        .run("sourceB", "weekly", date("2024-10-01"), &Params::new())
        .await;
    assert_eq!(result.status, RunStatus::Failed);
    assert!(result.findings.iter().any(|f| f.is_blocking()));
}

#[tokio::test]
async fn run_all_isolates_failing_datasets() {
    let (runner, _store) = runner_with(
        vec![players_contract("test"), weekly_contract()],
        vec![
            Arc::new(StaticLoader {
                path: "providers/test/players",
                provider: "test",
                dataset: "players",
                rows: good_rows(),
            }),
            Arc::new(UnavailableLoader {
                path: "providers/sourceB/weekly",
            }),
        ],
        curated_crosswalk(),
    );

    let results = runner.run_all(date("2024-10-01"), &HashMap::new()).await;
    assert_eq!(results.len(), 2);

    let by_key: HashMap<(String, String), &grid_core::entities::RunResult> = results
        .iter()
        .map(|r| ((r.provider.clone(), r.dataset.clone()), r))
        .collect();

    let players = by_key[&("test".to_string(), "players".to_string())];
    assert!(players.status.has_snapshot());

    let weekly = by_key[&("sourceB".to_string(), "weekly".to_string())];
    assert_eq!(weekly.status, RunStatus::Failed);
}

#[tokio::test]
async fn unknown_dataset_fails_that_invocation_only() {
    let (runner, _store) = runner_with(
        vec![players_contract("test")],
        vec![],
        Arc::new(Crosswalk::in_memory()),
    );

    let result = runner
        .run("espn", "scores", date("2024-10-01"), &Params::new())
        .await;
    assert_eq!(result.status, RunStatus::Failed);
    assert!(
        result.findings[0]
            .description
            .contains("unknown dataset: espn/scores")
    );
}

#[tokio::test]
async fn invalid_parameter_fails_without_fallback() {
    let (runner, store) = runner_with(
        vec![players_contract("test")],
        vec![Arc::new(StaticLoader {
            path: "providers/test/players",
            provider: "test",
            dataset: "players",
            rows: good_rows(),
        })],
        curated_crosswalk(),
    );

    // Seed a prior snapshot; caller misuse must NOT masquerade as staleness
    runner
        .run("test", "players", date("2024-09-30"), &Params::new())
        .await;

    let bad = Params::new().set("scoring", "ppr");
    let result = runner.run("test", "players", date("2024-10-01"), &bad).await;
    assert_eq!(result.status, RunStatus::Failed);
    assert!(result.findings[0].description.contains("scoring"));

    // prior snapshot untouched
    assert_eq!(
        store.latest("test", "players").await.unwrap().unwrap().as_of,
        date("2024-09-30")
    );
}
