//! # grid-providers
//!
//! Provider fetch clients and the loader framework for Gridiron.
//!
//! Each upstream source is isolated behind the [`Loader`] capability, one
//! implementation per (provider, dataset):
//! - nflverse (weekly statistics, player index) via CSV release artifacts
//! - Sleeper (players, rosters, leagues) via JSON REST
//! - KeepTradeCut (market values) via its JSON feed
//! - Google Sheets (commissioner transaction logs) via published CSV export
//!
//! Loaders are pure fetch + normalize: they never touch storage. Idempotence
//! under re-invocation comes from the snapshot store's staging-then-atomic-
//! publish discipline, so re-running a loader after a crash is always safe.

pub mod ktc;
pub mod nflverse;
pub mod sheets;
pub mod sleeper;

mod batch;
mod error;
mod http;
mod params;
mod retry;
mod tabular;

pub use batch::RawBatch;
pub use error::ProviderError;
pub use params::{Params, parse_week_range};
pub use retry::with_retries;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use grid_config::{ProvidersConfig, RetryConfig};

// ── Loader capability ──────────────────────────────────────────────

/// One provider's fetch logic behind a uniform interface.
///
/// Implementations must be idempotent under re-invocation with identical
/// parameters: fetching is read-only and normalization is deterministic
/// modulo the upstream's own drift.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Logical identifier, e.g. `providers/sleeper/rosters`. Matched against
    /// contract `loader_path` values at dispatch time.
    fn path(&self) -> &'static str;

    /// Option names this loader recognizes; anything else fails the
    /// invocation with an invalid-parameter error.
    fn accepted_params(&self) -> &'static [&'static str];

    /// Execute one fetch, producing a raw batch.
    async fn fetch(&self, params: &Params) -> Result<RawBatch, ProviderError>;
}

// ── Client ─────────────────────────────────────────────────────────

/// Shared HTTP client for all provider loaders.
///
/// Carries the per-request timeout and the retry budget; every fetch goes
/// through [`with_retries`] so transient upstream failures are absorbed up to
/// the configured ceiling.
#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    config: ProvidersConfig,
    retry: RetryConfig,
}

pub(crate) struct Fetched<T> {
    pub body: T,
    pub version: Option<String>,
}

impl ProviderClient {
    /// Create a new client with the configured timeout and user agent.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest::Client` fails to build.
    #[must_use]
    pub fn new(config: &ProvidersConfig, retry: &RetryConfig) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent(config.user_agent.clone())
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .expect("reqwest client should build"),
            config: config.clone(),
            retry: retry.clone(),
        }
    }

    pub(crate) const fn config(&self) -> &ProvidersConfig {
        &self.config
    }

    /// GET a text body with retry, returning the body and a version marker.
    pub(crate) async fn get_text(
        &self,
        source: &str,
        url: &str,
    ) -> Result<Fetched<String>, ProviderError> {
        with_retries(&self.retry, source, || async move {
            let resp = http::check_response(self.http.get(url).send().await?).await?;
            let version = http::version_marker(&resp);
            let body = resp.text().await?;
            Ok(Fetched { body, version })
        })
        .await
    }

    /// GET a JSON body with retry, returning the value and a version marker.
    pub(crate) async fn get_json(
        &self,
        source: &str,
        url: &str,
    ) -> Result<Fetched<serde_json::Value>, ProviderError> {
        with_retries(&self.retry, source, || async move {
            let resp = http::check_response(self.http.get(url).send().await?).await?;
            let version = http::version_marker(&resp);
            let body = resp.json::<serde_json::Value>().await?;
            Ok(Fetched { body, version })
        })
        .await
    }
}

// ── Loader dispatch ────────────────────────────────────────────────

/// Loader lookup table keyed by loader path.
///
/// [`Loaders::standard`] wires up every built-in loader; tests insert their
/// own implementations to exercise the pipeline without a network.
#[derive(Default)]
pub struct Loaders {
    by_path: HashMap<&'static str, Arc<dyn Loader>>,
}

impl Loaders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All built-in loaders over one shared client.
    #[must_use]
    pub fn standard(config: &ProvidersConfig, retry: &RetryConfig) -> Self {
        let client = ProviderClient::new(config, retry);
        let mut loaders = Self::new();
        loaders.insert(Arc::new(nflverse::WeeklyStatsLoader::new(client.clone())));
        loaders.insert(Arc::new(nflverse::PlayersLoader::new(client.clone())));
        loaders.insert(Arc::new(sleeper::PlayersLoader::new(client.clone())));
        loaders.insert(Arc::new(sleeper::RostersLoader::new(client.clone())));
        loaders.insert(Arc::new(sleeper::LeaguesLoader::new(client.clone())));
        loaders.insert(Arc::new(ktc::ValuesLoader::new(client.clone())));
        loaders.insert(Arc::new(sheets::TransactionsLoader::new(client)));
        loaders
    }

    /// Register a loader under its declared path. Later insertions win, which
    /// is what lets tests shadow a built-in.
    pub fn insert(&mut self, loader: Arc<dyn Loader>) {
        self.by_path.insert(loader.path(), loader);
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<Arc<dyn Loader>> {
        self.by_path.get(path).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}
