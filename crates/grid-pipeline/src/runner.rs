//! Per-dataset run orchestration.
//!
//! One run is: contract lookup, loader dispatch, retried fetch, quality
//! gate, crosswalk annotation, atomic publish. Failures are isolated per
//! (provider, dataset): a run never panics and never aborts siblings, it
//! reports its outcome in the `RunResult`. When a fetch exhausts retries or
//! the gate rejects the batch, the runner serves the last-known-good
//! snapshot and flags the staleness; nothing fails silently.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use grid_core::entities::{QualityFinding, RunResult, SnapshotRef};
use grid_core::enums::{QualityCheck, RunStatus, SemanticType, Severity};
use grid_crosswalk::{Crosswalk, EntityHint, Resolution};
use grid_lake::{LakeError, PublishMode, PublishRequest, SnapshotStore};
use grid_providers::{Loaders, Params, RawBatch};
use grid_registry::{ColumnSpec, DatasetContract, Registry};
use serde_json::Value;

use crate::error::PipelineError;
use crate::quality::QualityGate;

type IdentityKey = (String, String, NaiveDate);

/// Executes ingestion runs against a fixed registry, loader set, crosswalk,
/// and snapshot store. This is the entry point external scheduling
/// infrastructure calls on its twice-daily cadence.
pub struct DatasetRunner {
    registry: Arc<Registry>,
    loaders: Loaders,
    crosswalk: Arc<Crosswalk>,
    store: Arc<SnapshotStore>,
    gate: QualityGate,
    // No two concurrent publications may target the same snapshot identity.
    locks: tokio::sync::Mutex<HashMap<IdentityKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl DatasetRunner {
    #[must_use]
    pub fn new(
        registry: Arc<Registry>,
        loaders: Loaders,
        crosswalk: Arc<Crosswalk>,
        store: Arc<SnapshotStore>,
        gate: QualityGate,
    ) -> Self {
        Self {
            registry,
            loaders,
            crosswalk,
            store,
            gate,
            locks: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Run one (provider, dataset) ingestion for `as_of`.
    ///
    /// Infallible by design: every failure mode is folded into the returned
    /// [`RunResult`] so batch fan-out never unwinds across datasets.
    pub async fn run(
        &self,
        provider: &str,
        dataset: &str,
        as_of: NaiveDate,
        params: &Params,
    ) -> RunResult {
        let identity = self.identity_lock(provider, dataset, as_of).await;
        let _guard = identity.lock().await;

        match self.execute(provider, dataset, as_of, params).await {
            Ok(result) => result,
            Err(error) if error.triggers_lkg() => {
                self.fall_back(provider, dataset, as_of, &error).await
            }
            Err(error) => {
                tracing::error!(provider, dataset, %as_of, %error, "dataset run failed");
                result_of(
                    provider,
                    dataset,
                    as_of,
                    RunStatus::Failed,
                    vec![QualityFinding::fail(
                        QualityCheck::Publication,
                        error.to_string(),
                        0,
                    )],
                    None,
                )
            }
        }
    }

    /// Run every registered dataset concurrently. Parameters are keyed by
    /// (provider, dataset); datasets without an entry run with empty
    /// parameters. One failing dataset never blocks the others.
    pub async fn run_all(
        &self,
        as_of: NaiveDate,
        params: &HashMap<(String, String), Params>,
    ) -> Vec<RunResult> {
        let default = Params::new();
        let pairs: Vec<(String, String)> = self
            .registry
            .list()
            .into_iter()
            .map(|(p, d)| (p.to_string(), d.to_string()))
            .collect();

        let runs = pairs.iter().map(|(provider, dataset)| {
            let dataset_params = params
                .get(&(provider.clone(), dataset.clone()))
                .unwrap_or(&default);
            self.run(provider, dataset, as_of, dataset_params)
        });
        futures_util::future::join_all(runs).await
    }

    // ── Internals ──────────────────────────────────────────────────

    async fn execute(
        &self,
        provider: &str,
        dataset: &str,
        as_of: NaiveDate,
        params: &Params,
    ) -> Result<RunResult, PipelineError> {
        let contract = self.registry.resolve(provider, dataset)?;
        let loader = self
            .loaders
            .get(&contract.loader_path)
            .ok_or_else(|| PipelineError::MissingLoader(contract.loader_path.clone()))?;

        let batch = loader.fetch(params).await?;

        let mut findings = self.gate.validate(&batch, contract);
        if findings.iter().any(QualityFinding::is_blocking) {
            return Err(classify_rejection(provider, dataset, findings));
        }

        let (rows, columns, unresolved) = self.annotate(&batch, contract);
        if unresolved > 0 {
            findings.push(QualityFinding::warn(
                QualityCheck::EntityResolution,
                format!("{unresolved} rows with unresolved canonical identity"),
                unresolved,
            ));
        }

        let request = PublishRequest {
            provider,
            dataset,
            as_of,
            rows: &rows,
            columns: &columns,
            loader_path: &batch.loader_path,
            source_name: &batch.provider,
            source_version: &batch.source_version,
            captured_at: batch.captured_at,
            mode: PublishMode::Create,
        };

        match self.store.publish(request).await {
            Ok(snapshot) => {
                let status = if findings.iter().any(|f| f.severity == Severity::Warn) {
                    RunStatus::PublishedWithWarnings
                } else {
                    RunStatus::Published
                };
                Ok(result_of(
                    provider,
                    dataset,
                    as_of,
                    status,
                    findings,
                    Some(snapshot),
                ))
            }
            Err(LakeError::AlreadyExists { content_id, .. }) => {
                // Identical rows re-published for the same identity: the
                // idempotent no-op path for crash-and-retry runs.
                findings.push(QualityFinding::warn(
                    QualityCheck::Publication,
                    format!("content {content_id} already published, idempotent no-op"),
                    0,
                ));
                let snapshot = self.store.snapshot_at(provider, dataset, as_of).await?;
                Ok(result_of(
                    provider,
                    dataset,
                    as_of,
                    RunStatus::PublishedWithWarnings,
                    findings,
                    snapshot,
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Serve the prior snapshot after a non-fatal failure, or report
    /// `Failed` when there is nothing valid to fall back to.
    async fn fall_back(
        &self,
        provider: &str,
        dataset: &str,
        as_of: NaiveDate,
        error: &PipelineError,
    ) -> RunResult {
        let mut findings = error.findings().to_vec();
        match self.store.latest(provider, dataset).await {
            Ok(Some(prior)) => {
                tracing::warn!(
                    provider,
                    dataset,
                    %as_of,
                    prior = %prior.as_of,
                    %error,
                    "serving last known good snapshot"
                );
                findings.push(QualityFinding::warn(
                    QualityCheck::Freshness,
                    format!("stale data: {error}; serving snapshot dt={}", prior.as_of),
                    0,
                ));
                result_of(
                    provider,
                    dataset,
                    as_of,
                    RunStatus::LkgFallback,
                    findings,
                    Some(prior),
                )
            }
            Ok(None) => {
                tracing::error!(provider, dataset, %as_of, %error, "no last known good snapshot");
                findings.push(QualityFinding::fail(
                    QualityCheck::Freshness,
                    format!("{error}; no prior snapshot to fall back to"),
                    0,
                ));
                result_of(provider, dataset, as_of, RunStatus::Failed, findings, None)
            }
            Err(store_error) => {
                findings.push(QualityFinding::fail(
                    QualityCheck::Publication,
                    format!("{error}; fallback lookup failed: {store_error}"),
                    0,
                ));
                result_of(provider, dataset, as_of, RunStatus::Failed, findings, None)
            }
        }
    }

    /// Add `canonical_id` and `canonical_unresolved` columns when the
    /// contract declares an entity reference. Unresolved and ambiguous ids
    /// keep their rows; they are flagged, never dropped.
    fn annotate(
        &self,
        batch: &RawBatch,
        contract: &DatasetContract,
    ) -> (Vec<Value>, Vec<ColumnSpec>, u64) {
        let mut columns = contract.schema.clone();
        let Some(entity_ref) = &contract.entity_ref else {
            return (batch.rows.clone(), columns, 0);
        };
        columns.push(ColumnSpec::new("canonical_id", SemanticType::Str));
        columns.push(ColumnSpec::new("canonical_unresolved", SemanticType::Bool));

        let mut unresolved = 0u64;
        let rows = batch
            .rows
            .iter()
            .map(|original| {
                let mut row = original.clone();
                let resolution = native_id_of(&row, &entity_ref.column).map(|native| {
                    self.crosswalk
                        .resolve_or_nominate(&batch.provider, &native, &hint_of(&row))
                });
                let (canonical, flag) = match resolution {
                    Some(Resolution::Resolved(id)) => (Value::String(id), false),
                    Some(Resolution::Unresolved | Resolution::Ambiguous(_)) | None => {
                        (Value::Null, true)
                    }
                };
                if flag {
                    unresolved += 1;
                }
                if let Some(obj) = row.as_object_mut() {
                    obj.insert("canonical_id".to_string(), canonical);
                    obj.insert("canonical_unresolved".to_string(), Value::Bool(flag));
                }
                row
            })
            .collect();
        (rows, columns, unresolved)
    }

    async fn identity_lock(
        &self,
        provider: &str,
        dataset: &str,
        as_of: NaiveDate,
    ) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry((provider.to_string(), dataset.to_string(), as_of))
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

fn result_of(
    provider: &str,
    dataset: &str,
    as_of: NaiveDate,
    status: RunStatus,
    findings: Vec<QualityFinding>,
    snapshot: Option<SnapshotRef>,
) -> RunResult {
    RunResult {
        provider: provider.to_string(),
        dataset: dataset.to_string(),
        as_of,
        status,
        findings,
        snapshot,
    }
}

fn classify_rejection(
    provider: &str,
    dataset: &str,
    findings: Vec<QualityFinding>,
) -> PipelineError {
    let first_blocking = findings
        .iter()
        .find(|f| f.is_blocking())
        .map_or(QualityCheck::SchemaCompliance, |f| f.check);
    let provider = provider.to_string();
    let dataset = dataset.to_string();
    match first_blocking {
        QualityCheck::KeyUniqueness => PipelineError::KeyUniqueness {
            provider,
            dataset,
            findings,
        },
        QualityCheck::KeyCoverage => PipelineError::KeyCoverage {
            provider,
            dataset,
            findings,
        },
        _ => PipelineError::SchemaViolation {
            provider,
            dataset,
            findings,
        },
    }
}

/// The provider-native id carried by a row, normalized to a string.
fn native_id_of(row: &Value, column: &str) -> Option<String> {
    match row.get(column) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Disambiguation fields for candidate nomination, from whichever name
/// column this dataset carries.
fn hint_of(row: &Value) -> EntityHint {
    let text = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| row.get(*k).and_then(Value::as_str))
            .map(String::from)
    };
    EntityHint {
        name: text(&["name", "player_name", "full_name"]),
        team: text(&["team"]),
        position: text(&["position"]),
    }
}
