//! # grid-lake
//!
//! The immutable, date-partitioned snapshot store for Gridiron.
//!
//! Storage roots are handled uniformly through [`object_store`]: a plain
//! local path, a `file://` URI, an `s3://bucket/prefix` URI, or an in-memory
//! store for tests. Layout (the external contract read by the transformation
//! layer):
//!
//! ```text
//! <root>/<provider>/<dataset>/dt=<YYYY-MM-DD>/<dataset>_<content-id>.arrow
//! <root>/<provider>/<dataset>/dt=<YYYY-MM-DD>/<dataset>_<content-id>_meta.json
//! ```
//!
//! Writes land under a staging prefix invisible to readers and become
//! visible only through the atomic publish rename, so cancellation mid-write
//! never leaves a partially published snapshot. Data files are never
//! modified or deleted by the pipeline; corrections publish a new content
//! identifier into the same partition, and selectors break ties on capture
//! timestamp.

mod arrow;
mod error;
mod layout;

pub use error::LakeError;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use futures_util::{Stream, StreamExt, TryStreamExt};
use grid_config::StorageConfig;
use grid_core::entities::{SnapshotMeta, SnapshotRef};
use grid_registry::ColumnSpec;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// How a publication treats already-published content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    /// Normal ingestion: identical identity+content fails with
    /// [`LakeError::AlreadyExists`] so idempotent re-runs are detectable.
    Create,
    /// Correction tooling: identical content is a silent no-op returning the
    /// existing snapshot; new content supersedes under a new content id.
    Correct,
}

/// One publication request. Rows must already have passed the quality gate.
pub struct PublishRequest<'a> {
    pub provider: &'a str,
    pub dataset: &'a str,
    pub as_of: NaiveDate,
    pub rows: &'a [Value],
    pub columns: &'a [ColumnSpec],
    pub loader_path: &'a str,
    pub source_name: &'a str,
    pub source_version: &'a str,
    pub captured_at: DateTime<Utc>,
    pub mode: PublishMode,
}

/// Snapshot store over any `object_store` backend.
pub struct SnapshotStore {
    store: Arc<dyn ObjectStore>,
    staging_prefix: String,
}

impl SnapshotStore {
    /// Open a store rooted at a local path, `file://` URI, or `s3://` URI.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::InvalidRoot`] for unparseable URIs and
    /// [`LakeError::Io`] if a local root cannot be created.
    pub fn open(root: &str, staging_prefix: &str) -> Result<Self, LakeError> {
        let store: Arc<dyn ObjectStore> = if root.contains("://") {
            let url = url::Url::parse(root).map_err(|e| LakeError::InvalidRoot {
                root: root.to_string(),
                reason: e.to_string(),
            })?;
            if url.scheme() == "file" {
                std::fs::create_dir_all(url.path())?;
            }
            let (inner, prefix) = object_store::parse_url(&url)?;
            Arc::new(object_store::prefix::PrefixStore::new(inner, prefix))
        } else {
            std::fs::create_dir_all(root)?;
            Arc::new(object_store::local::LocalFileSystem::new_with_prefix(
                root,
            )?)
        };
        Ok(Self {
            store,
            staging_prefix: staging_prefix.trim_matches('/').to_string(),
        })
    }

    /// Open the store described by the storage config section.
    ///
    /// # Errors
    ///
    /// See [`Self::open`].
    pub fn from_config(config: &StorageConfig) -> Result<Self, LakeError> {
        Self::open(&config.root, &config.staging_prefix)
    }

    /// An in-memory store (tests).
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(object_store::memory::InMemory::new()),
            staging_prefix: "_staging".to_string(),
        }
    }

    // ── Publication ────────────────────────────────────────────────

    /// Validate-encode-stage-rename publication of one batch.
    ///
    /// The content identifier is the first 16 hex chars of the SHA-256 of
    /// the encoded Arrow file, so the duplicate guard is exact: identical
    /// rows re-encoded on a retry produce the identical identity.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::AlreadyExists`] per the [`PublishMode`] rules,
    /// [`LakeError::Encode`] on contract-incompatible rows, or storage
    /// errors.
    pub async fn publish(&self, req: PublishRequest<'_>) -> Result<SnapshotRef, LakeError> {
        let bytes = arrow::encode_ipc(req.columns, req.rows)?;
        let digest = Sha256::digest(&bytes);
        let content_sha256 = format!("{digest:x}");
        let content_id = content_sha256[..16].to_string();

        let partition = layout::partition_prefix(req.provider, req.dataset, req.as_of);
        let data_name = layout::data_file_name(req.dataset, &content_id);
        let meta_name = layout::meta_file_name(req.dataset, &content_id);
        let data_path = partition.child(data_name.as_str());
        let meta_path = partition.child(meta_name.as_str());

        if self.exists(&meta_path).await? {
            match req.mode {
                PublishMode::Create => {
                    return Err(LakeError::AlreadyExists {
                        provider: req.provider.to_string(),
                        dataset: req.dataset.to_string(),
                        as_of: req.as_of,
                        content_id,
                    });
                }
                PublishMode::Correct => {
                    tracing::info!(
                        provider = req.provider,
                        dataset = req.dataset,
                        %content_id,
                        "correction matches published content, no-op"
                    );
                    return self.read_ref(req.provider, req.dataset, req.as_of, &meta_path, content_id).await;
                }
            }
        }

        let meta = SnapshotMeta {
            dataset: req.dataset.to_string(),
            asof_datetime: req.captured_at,
            loader_path: req.loader_path.to_string(),
            source_name: req.source_name.to_string(),
            source_version: req.source_version.to_string(),
            output_path: data_path.to_string(),
            row_count: req.rows.len() as u64,
            content_sha256,
        };

        // Stage both objects out of the readable namespace, then make them
        // visible with renames: data first so a sidecar never points at a
        // missing file.
        let staging = Path::from(self.staging_prefix.as_str());
        let staged_data = staging.child(format!("{}_{data_name}", req.provider));
        let staged_meta = staging.child(format!("{}_{meta_name}", req.provider));

        self.store
            .put(&staged_data, PutPayload::from(bytes))
            .await?;
        self.store
            .put(&staged_meta, PutPayload::from(serde_json::to_vec_pretty(&meta)?))
            .await?;
        self.store.rename(&staged_data, &data_path).await?;
        self.store.rename(&staged_meta, &meta_path).await?;

        tracing::info!(
            provider = req.provider,
            dataset = req.dataset,
            as_of = %req.as_of,
            %content_id,
            rows = meta.row_count,
            "snapshot published"
        );

        Ok(SnapshotRef {
            provider: req.provider.to_string(),
            dataset: req.dataset.to_string(),
            as_of: req.as_of,
            content_id,
            data_path: data_path.to_string(),
            meta,
        })
    }

    // ── Selection (time travel) ────────────────────────────────────

    /// Partition dates for (provider, dataset), ascending, no duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::ObjectStore`] on listing failures.
    pub async fn partitions(
        &self,
        provider: &str,
        dataset: &str,
    ) -> Result<Vec<NaiveDate>, LakeError> {
        let prefix = layout::dataset_prefix(provider, dataset);
        let listing = self.store.list_with_delimiter(Some(&prefix)).await?;
        let mut dates: Vec<NaiveDate> = listing
            .common_prefixes
            .iter()
            .filter_map(layout::parse_partition_date)
            .collect();
        dates.sort_unstable();
        dates.dedup();
        Ok(dates)
    }

    /// Lazy, restartable sequence of snapshots ordered by as-of-date
    /// ascending. Sidecars are fetched per-partition as the stream is
    /// polled; calling `list` again restarts from a fresh listing.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::ObjectStore`] if the partition listing fails;
    /// per-snapshot failures surface as stream items.
    pub async fn list(
        &self,
        provider: &str,
        dataset: &str,
    ) -> Result<impl Stream<Item = Result<SnapshotRef, LakeError>> + '_, LakeError> {
        let dates = self.partitions(provider, dataset).await?;
        let provider = provider.to_string();
        let dataset = dataset.to_string();
        Ok(futures_util::stream::iter(dates)
            .then(move |date| {
                let provider = provider.clone();
                let dataset = dataset.clone();
                async move { self.snapshot_at(&provider, &dataset, date).await }
            })
            .try_filter_map(|snapshot| async move { Ok::<_, LakeError>(snapshot) }))
    }

    /// The most recent snapshot, or `None` if nothing was ever published.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError`] on listing or sidecar read failures.
    pub async fn latest(
        &self,
        provider: &str,
        dataset: &str,
    ) -> Result<Option<SnapshotRef>, LakeError> {
        let dates = self.partitions(provider, dataset).await?;
        for date in dates.into_iter().rev() {
            if let Some(snapshot) = self.snapshot_at(provider, dataset, date).await? {
                return Ok(Some(snapshot));
            }
        }
        Ok(None)
    }

    /// The newest snapshot with as-of-date `<= date`.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError`] on listing or sidecar read failures.
    pub async fn as_of(
        &self,
        provider: &str,
        dataset: &str,
        date: NaiveDate,
    ) -> Result<Option<SnapshotRef>, LakeError> {
        let dates = self.partitions(provider, dataset).await?;
        for candidate in dates.into_iter().rev().filter(|d| *d <= date) {
            if let Some(snapshot) = self.snapshot_at(provider, dataset, candidate).await? {
                return Ok(Some(snapshot));
            }
        }
        Ok(None)
    }

    /// The winning snapshot of one partition: latest capture timestamp,
    /// content id as the deterministic tie-break.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError`] on listing or sidecar read failures.
    pub async fn snapshot_at(
        &self,
        provider: &str,
        dataset: &str,
        as_of: NaiveDate,
    ) -> Result<Option<SnapshotRef>, LakeError> {
        let prefix = layout::partition_prefix(provider, dataset, as_of);
        let listing = self.store.list_with_delimiter(Some(&prefix)).await?;

        let mut best: Option<SnapshotRef> = None;
        for object in listing.objects {
            let Some(name) = object.location.filename() else {
                continue;
            };
            let Some(content_id) = layout::content_id_of_meta(name, dataset) else {
                continue;
            };
            let meta = self.read_meta(&object.location).await?;
            let candidate = SnapshotRef {
                provider: provider.to_string(),
                dataset: dataset.to_string(),
                as_of,
                content_id,
                data_path: meta.output_path.clone(),
                meta,
            };
            best = match best {
                None => Some(candidate),
                Some(current) => {
                    if (candidate.meta.asof_datetime, candidate.content_id.as_str())
                        > (current.meta.asof_datetime, current.content_id.as_str())
                    {
                        Some(candidate)
                    } else {
                        Some(current)
                    }
                }
            };
        }
        Ok(best)
    }

    /// Fetch the raw Arrow IPC bytes of a published snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`LakeError::ObjectStore`] if the data object is unreadable.
    pub async fn read_data(&self, snapshot: &SnapshotRef) -> Result<Vec<u8>, LakeError> {
        let path = Path::from(snapshot.data_path.as_str());
        Ok(self.store.get(&path).await?.bytes().await?.to_vec())
    }

    // ── Internals ──────────────────────────────────────────────────

    async fn exists(&self, path: &Path) -> Result<bool, LakeError> {
        match self.store.head(path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_meta(&self, path: &Path) -> Result<SnapshotMeta, LakeError> {
        let bytes = self.store.get(path).await?.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| LakeError::InvalidLayout {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn read_ref(
        &self,
        provider: &str,
        dataset: &str,
        as_of: NaiveDate,
        meta_path: &Path,
        content_id: String,
    ) -> Result<SnapshotRef, LakeError> {
        let meta = self.read_meta(meta_path).await?;
        Ok(SnapshotRef {
            provider: provider.to_string(),
            dataset: dataset.to_string(),
            as_of,
            content_id,
            data_path: meta.output_path.clone(),
            meta,
        })
    }
}
