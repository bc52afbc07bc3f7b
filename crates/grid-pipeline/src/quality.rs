//! The quality gate: synchronous validation blocking publication of any
//! batch that violates its dataset contract.
//!
//! Checks run in a fixed order: schema compliance first, because the
//! primary-key checks assume the key columns exist. A schema `fail` short-
//! circuits the remaining checks; their findings would only be noise.

use std::collections::{BTreeSet, HashMap};

use grid_config::QualityConfig;
use grid_core::entities::QualityFinding;
use grid_core::enums::QualityCheck;
use grid_providers::RawBatch;
use grid_registry::DatasetContract;
use serde_json::Value;

/// Validates raw batches against dataset contracts.
#[derive(Debug, Clone)]
pub struct QualityGate {
    config: QualityConfig,
}

impl QualityGate {
    #[must_use]
    pub const fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    /// Run all checks, in order. A `fail` finding in the result blocks
    /// publication; `warn` findings are surfaced but do not block.
    #[must_use]
    pub fn validate(&self, batch: &RawBatch, contract: &DatasetContract) -> Vec<QualityFinding> {
        let mut findings = self.check_schema(batch, contract);
        if findings.iter().any(QualityFinding::is_blocking) {
            return findings;
        }
        findings.push(check_key_uniqueness(batch, contract));
        findings.push(self.check_key_coverage(batch, contract));
        findings
    }

    // ── (a) schema compliance ──────────────────────────────────────

    fn check_schema(&self, batch: &RawBatch, contract: &DatasetContract) -> Vec<QualityFinding> {
        let total = batch.rows.len() as u64;
        let mut findings = Vec::new();

        let mut present: HashMap<&str, u64> = HashMap::new();
        let mut mismatched: HashMap<&str, u64> = HashMap::new();
        let mut unknown: BTreeSet<String> = BTreeSet::new();

        for row in &batch.rows {
            let Some(obj) = row.as_object() else {
                continue;
            };
            for (key, value) in obj {
                match contract.column(key) {
                    Some(column) => {
                        *present.entry(column.name.as_str()).or_default() += 1;
                        if !column.ty.is_compatible(value) {
                            *mismatched.entry(column.name.as_str()).or_default() += 1;
                        }
                    }
                    None => {
                        unknown.insert(key.clone());
                    }
                }
            }
        }

        for column in &contract.schema {
            if total > 0 && !present.contains_key(column.name.as_str()) {
                findings.push(QualityFinding::fail(
                    QualityCheck::SchemaCompliance,
                    format!("column '{}' missing from batch", column.name),
                    total,
                ));
            }
            if let Some(&count) = mismatched.get(column.name.as_str()) {
                findings.push(QualityFinding::fail(
                    QualityCheck::SchemaCompliance,
                    format!(
                        "column '{}': {count} rows incompatible with declared type {}",
                        column.name, column.ty
                    ),
                    count,
                ));
            }
        }

        if !unknown.is_empty() {
            let names = unknown.into_iter().collect::<Vec<_>>().join(", ");
            let finding = if self.config.strict_schema {
                QualityFinding::fail(
                    QualityCheck::SchemaCompliance,
                    format!("undeclared columns rejected (strict schema): {names}"),
                    total,
                )
            } else {
                QualityFinding::warn(
                    QualityCheck::SchemaCompliance,
                    format!("undeclared columns tolerated: {names}"),
                    total,
                )
            };
            findings.push(finding);
        }

        if findings.is_empty() {
            findings.push(QualityFinding::pass(QualityCheck::SchemaCompliance));
        }
        findings
    }

    // ── (c) key coverage ───────────────────────────────────────────

    fn check_key_coverage(&self, batch: &RawBatch, contract: &DatasetContract) -> QualityFinding {
        let total = batch.rows.len();
        if total == 0 {
            return QualityFinding::pass(QualityCheck::KeyCoverage);
        }

        let covered = batch
            .rows
            .iter()
            .filter(|row| key_tuple(row, &contract.primary_key).is_some())
            .count();
        #[allow(clippy::cast_precision_loss)]
        let coverage = covered as f64 / total as f64;

        if coverage < self.config.key_coverage_threshold {
            QualityFinding::fail(
                QualityCheck::KeyCoverage,
                format!(
                    "key coverage {coverage:.3} below threshold {:.3}",
                    self.config.key_coverage_threshold
                ),
                (total - covered) as u64,
            )
        } else {
            QualityFinding::pass(QualityCheck::KeyCoverage)
        }
    }
}

// ── (b) primary-key uniqueness ─────────────────────────────────────

fn check_key_uniqueness(batch: &RawBatch, contract: &DatasetContract) -> QualityFinding {
    let mut seen: HashMap<Vec<String>, u64> = HashMap::new();
    for row in &batch.rows {
        if let Some(key) = key_tuple(row, &contract.primary_key) {
            *seen.entry(key).or_default() += 1;
        }
    }

    let duplicate_keys: Vec<(&Vec<String>, u64)> = seen
        .iter()
        .filter(|(_, n)| **n > 1)
        .map(|(k, n)| (k, *n))
        .collect();
    if duplicate_keys.is_empty() {
        return QualityFinding::pass(QualityCheck::KeyUniqueness);
    }

    let affected: u64 = duplicate_keys.iter().map(|(_, n)| n).sum();
    let mut samples: Vec<String> = duplicate_keys
        .iter()
        .take(3)
        .map(|(k, _)| k.join("/"))
        .collect();
    samples.sort_unstable();
    QualityFinding::fail(
        QualityCheck::KeyUniqueness,
        format!(
            "{} duplicate primary-key tuples (e.g. {})",
            duplicate_keys.len(),
            samples.join(", ")
        ),
        affected,
    )
}

/// The primary-key tuple of a row as comparable strings, or `None` when any
/// key column is null or absent.
fn key_tuple(row: &Value, primary_key: &[String]) -> Option<Vec<String>> {
    primary_key
        .iter()
        .map(|column| match row.get(column) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        })
        .collect()
}
