//! # grid-crosswalk
//!
//! Canonical entity resolution for Gridiron.
//!
//! The crosswalk maps each provider's native identifiers onto one canonical
//! identity space. Resolution is a pure lookup against curated reference
//! data: it never invents identities from ingestion traffic. Unmapped ids
//! surface as [`Resolution::Unresolved`] (or [`Resolution::Ambiguous`] when a
//! composite fallback key nominates several candidates) and stay queryable in
//! published snapshots with a distinct flag.
//!
//! Curation (entity creation, alias mapping) is trail-first: every mutation
//! appends a [`CurationEvent`] to a JSONL file before the in-memory state
//! changes, and [`Crosswalk::load`] rebuilds state by replay. Reads proceed
//! concurrently against last-committed state; writes are serialized by a
//! single `RwLock` writer, so a reader observes pre- or post-update mappings
//! atomically, never a partially-applied one.

mod composite;
mod error;
mod trail;

pub use composite::{composite_key, normalize_name};
pub use error::CrosswalkError;
pub use trail::CurationTrail;

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use chrono::Utc;
use grid_core::entities::CanonicalEntity;
use grid_core::enums::CurationOp;
use grid_core::trail::CurationEvent;

// ── Types ──────────────────────────────────────────────────────────

/// Outcome of resolving one provider-native identifier.
///
/// Ambiguity is an explicit tagged outcome, never collapsed to a best guess:
/// downstream correctness depends on it being visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The id maps to exactly one canonical entity.
    Resolved(String),
    /// No mapping and no candidates.
    Unresolved,
    /// No mapping, but the composite fallback key nominated these canonical
    /// ids for human curation.
    Ambiguous(Vec<String>),
}

/// Row-level fields available to nominate curation candidates when an id is
/// unmapped.
#[derive(Debug, Clone, Default)]
pub struct EntityHint {
    pub name: Option<String>,
    pub team: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    entities: HashMap<String, CanonicalEntity>,
    aliases: HashMap<(String, String), String>,
    by_composite: HashMap<String, Vec<String>>,
}

impl State {
    fn add_entity(&mut self, entity: CanonicalEntity) {
        let key = composite_key(
            &entity.name,
            entity.team.as_deref(),
            entity.position.as_deref(),
        );
        self.by_composite
            .entry(key)
            .or_default()
            .push(entity.canonical_id.clone());
        self.entities.insert(entity.canonical_id.clone(), entity);
    }

    fn candidates(&self, hint: &EntityHint) -> Vec<String> {
        let Some(name) = hint.name.as_deref() else {
            return Vec::new();
        };
        let key = composite_key(name, hint.team.as_deref(), hint.position.as_deref());
        self.by_composite.get(&key).cloned().unwrap_or_default()
    }
}

// ── Store ──────────────────────────────────────────────────────────

/// The crosswalk reference store: shared mutable state with single-writer
/// curation and concurrent resolution reads.
pub struct Crosswalk {
    state: RwLock<State>,
    trail: CurationTrail,
}

impl Crosswalk {
    /// An ephemeral crosswalk with no backing trail (tests, dry runs).
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(State::default()),
            trail: CurationTrail::disabled(),
        }
    }

    /// Open the crosswalk rooted at `dir`, replaying the curation trail.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError`] if the trail cannot be read or replay hits
    /// an inconsistent event (which means the trail file was edited by hand).
    pub fn load(dir: &Path) -> Result<Self, CrosswalkError> {
        let trail = CurationTrail::new(dir)?;
        let mut state = State::default();
        let events = trail.read_all()?;
        let replayed = events.len();
        for event in events {
            Self::apply_event(&mut state, event)?;
        }
        tracing::debug!(
            replayed,
            entities = state.entities.len(),
            aliases = state.aliases.len(),
            "crosswalk trail replayed"
        );
        Ok(Self {
            state: RwLock::new(state),
            trail,
        })
    }

    fn apply_event(state: &mut State, event: CurationEvent) -> Result<(), CrosswalkError> {
        if event.v != 1 {
            return Err(CrosswalkError::Replay(format!(
                "unsupported trail version {} for {}",
                event.v, event.canonical_id
            )));
        }
        match event.op {
            CurationOp::AddEntity => {
                let entity: CanonicalEntity = serde_json::from_value(event.data)
                    .map_err(|e| CrosswalkError::Replay(format!("bad entity payload: {e}")))?;
                if state.entities.contains_key(&entity.canonical_id) {
                    return Err(CrosswalkError::Replay(format!(
                        "duplicate canonical id in trail: {}",
                        entity.canonical_id
                    )));
                }
                state.add_entity(entity);
            }
            CurationOp::MapAlias | CurationOp::OverrideAlias => {
                let (Some(provider), Some(native_id)) = (event.provider, event.native_id) else {
                    return Err(CrosswalkError::Replay(
                        "alias event missing provider or native_id".to_string(),
                    ));
                };
                if !state.entities.contains_key(&event.canonical_id) {
                    return Err(CrosswalkError::Replay(format!(
                        "alias event references unknown canonical id {}",
                        event.canonical_id
                    )));
                }
                let key = (provider, native_id);
                if event.op == CurationOp::MapAlias {
                    if let Some(existing) = state.aliases.get(&key) {
                        if *existing != event.canonical_id {
                            return Err(CrosswalkError::Replay(format!(
                                "conflicting alias in trail for {}:{}",
                                key.0, key.1
                            )));
                        }
                    }
                }
                state.aliases.insert(key, event.canonical_id);
            }
        }
        Ok(())
    }

    // ── Resolution reads ───────────────────────────────────────────

    /// Pure lookup: at most one canonical id per (provider, native id),
    /// stable across calls absent an explicit curation update.
    #[must_use]
    pub fn resolve(&self, provider: &str, native_id: &str) -> Resolution {
        let state = self.state.read().expect("crosswalk lock poisoned");
        state
            .aliases
            .get(&(provider.to_string(), native_id.to_string()))
            .map_or(Resolution::Unresolved, |id| {
                Resolution::Resolved(id.clone())
            })
    }

    /// Lookup with candidate nomination: unmapped ids whose composite
    /// fallback key matches several entities come back as `Ambiguous` so the
    /// tie is visible to curation. A single candidate is still `Unresolved`;
    /// the fallback key never silently stands in for a canonical id.
    #[must_use]
    pub fn resolve_or_nominate(
        &self,
        provider: &str,
        native_id: &str,
        hint: &EntityHint,
    ) -> Resolution {
        let state = self.state.read().expect("crosswalk lock poisoned");
        if let Some(id) = state
            .aliases
            .get(&(provider.to_string(), native_id.to_string()))
        {
            return Resolution::Resolved(id.clone());
        }
        let candidates = state.candidates(hint);
        if candidates.len() > 1 {
            tracing::warn!(
                provider,
                native_id,
                ?candidates,
                "ambiguous entity, flagged for curation"
            );
            Resolution::Ambiguous(candidates)
        } else {
            if let Some(only) = candidates.first() {
                tracing::debug!(provider, native_id, candidate = %only, "curation candidate");
            }
            Resolution::Unresolved
        }
    }

    /// Candidate canonical ids for an unmapped row, by composite key.
    #[must_use]
    pub fn nominate(&self, hint: &EntityHint) -> Vec<String> {
        let state = self.state.read().expect("crosswalk lock poisoned");
        state.candidates(hint)
    }

    /// Fetch one canonical entity by id.
    #[must_use]
    pub fn entity(&self, canonical_id: &str) -> Option<CanonicalEntity> {
        let state = self.state.read().expect("crosswalk lock poisoned");
        state.entities.get(canonical_id).cloned()
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.state
            .read()
            .expect("crosswalk lock poisoned")
            .entities
            .len()
    }

    #[must_use]
    pub fn alias_count(&self) -> usize {
        self.state
            .read()
            .expect("crosswalk lock poisoned")
            .aliases
            .len()
    }

    // ── Curation writes ────────────────────────────────────────────

    /// Register a new canonical entity.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::DuplicateCanonical`] if the id exists, or
    /// [`CrosswalkError::Io`] if the trail append fails.
    pub fn add_entity(&self, entity: CanonicalEntity) -> Result<(), CrosswalkError> {
        let mut state = self.state.write().expect("crosswalk lock poisoned");
        if state.entities.contains_key(&entity.canonical_id) {
            return Err(CrosswalkError::DuplicateCanonical(
                entity.canonical_id.clone(),
            ));
        }
        self.trail.append(&CurationEvent {
            v: 1,
            ts: Utc::now(),
            op: CurationOp::AddEntity,
            provider: None,
            native_id: None,
            canonical_id: entity.canonical_id.clone(),
            data: serde_json::to_value(&entity)
                .map_err(|e| CrosswalkError::Replay(e.to_string()))?,
        })?;
        state.add_entity(entity);
        Ok(())
    }

    /// Propose a new alias mapping, applying the staging guards.
    ///
    /// Re-proposing an identical mapping is an idempotent no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::UnknownCanonical`] for unregistered targets
    /// and [`CrosswalkError::Conflict`] when the native id already maps to a
    /// different canonical entity.
    pub fn propose_alias(
        &self,
        provider: &str,
        native_id: &str,
        canonical_id: &str,
    ) -> Result<(), CrosswalkError> {
        let mut state = self.state.write().expect("crosswalk lock poisoned");
        if !state.entities.contains_key(canonical_id) {
            return Err(CrosswalkError::UnknownCanonical(canonical_id.to_string()));
        }
        let key = (provider.to_string(), native_id.to_string());
        if let Some(existing) = state.aliases.get(&key) {
            if existing == canonical_id {
                tracing::debug!(provider, native_id, canonical_id, "alias already mapped");
                return Ok(());
            }
            return Err(CrosswalkError::Conflict {
                provider: provider.to_string(),
                native_id: native_id.to_string(),
                existing: existing.clone(),
                proposed: canonical_id.to_string(),
            });
        }
        self.trail.append(&CurationEvent {
            v: 1,
            ts: Utc::now(),
            op: CurationOp::MapAlias,
            provider: Some(provider.to_string()),
            native_id: Some(native_id.to_string()),
            canonical_id: canonical_id.to_string(),
            data: serde_json::Value::Null,
        })?;
        state.aliases.insert(key, canonical_id.to_string());
        Ok(())
    }

    /// Remap a native id regardless of existing mappings. This is the
    /// explicit human-override path for resolving conflicts; it is recorded
    /// as a distinct trail operation.
    ///
    /// # Errors
    ///
    /// Returns [`CrosswalkError::UnknownCanonical`] for unregistered targets
    /// or [`CrosswalkError::Io`] if the trail append fails.
    pub fn override_alias(
        &self,
        provider: &str,
        native_id: &str,
        canonical_id: &str,
    ) -> Result<(), CrosswalkError> {
        let mut state = self.state.write().expect("crosswalk lock poisoned");
        if !state.entities.contains_key(canonical_id) {
            return Err(CrosswalkError::UnknownCanonical(canonical_id.to_string()));
        }
        let key = (provider.to_string(), native_id.to_string());
        if let Some(previous) = state.aliases.get(&key) {
            tracing::warn!(provider, native_id, from = %previous, to = canonical_id, "alias override");
        }
        self.trail.append(&CurationEvent {
            v: 1,
            ts: Utc::now(),
            op: CurationOp::OverrideAlias,
            provider: Some(provider.to_string()),
            native_id: Some(native_id.to_string()),
            canonical_id: canonical_id.to_string(),
            data: serde_json::Value::Null,
        })?;
        state.aliases.insert(key, canonical_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_core::enums::EntityKind;
    use pretty_assertions::assert_eq;

    fn player(id: &str, name: &str, team: &str, position: &str) -> CanonicalEntity {
        CanonicalEntity {
            canonical_id: id.to_string(),
            kind: EntityKind::Player,
            name: name.to_string(),
            team: Some(team.to_string()),
            position: Some(position.to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn resolve_is_a_pure_lookup() {
        let crosswalk = Crosswalk::in_memory();
        crosswalk
            .add_entity(player("C100", "Josh Allen", "BUF", "QB"))
            .unwrap();
        crosswalk.propose_alias("sourceA", "42", "C100").unwrap();

        assert_eq!(
            crosswalk.resolve("sourceA", "42"),
            Resolution::Resolved("C100".to_string())
        );
        // stable across repeated calls
        assert_eq!(
            crosswalk.resolve("sourceA", "42"),
            Resolution::Resolved("C100".to_string())
        );
        assert_eq!(crosswalk.resolve("sourceA", "43"), Resolution::Unresolved);
        assert_eq!(crosswalk.resolve("sourceB", "42"), Resolution::Unresolved);
    }

    #[test]
    fn conflicting_proposal_rejected_and_mapping_unchanged() {
        let crosswalk = Crosswalk::in_memory();
        crosswalk
            .add_entity(player("C100", "Josh Allen", "BUF", "QB"))
            .unwrap();
        crosswalk
            .add_entity(player("C200", "Josh Allen", "JAX", "LB"))
            .unwrap();
        crosswalk.propose_alias("sourceA", "42", "C100").unwrap();

        let err = crosswalk.propose_alias("sourceA", "42", "C200").unwrap_err();
        assert!(matches!(err, CrosswalkError::Conflict { ref existing, ref proposed, .. }
            if existing == "C100" && proposed == "C200"));

        assert_eq!(
            crosswalk.resolve("sourceA", "42"),
            Resolution::Resolved("C100".to_string())
        );
    }

    #[test]
    fn identical_reproposal_is_noop() {
        let crosswalk = Crosswalk::in_memory();
        crosswalk
            .add_entity(player("C100", "Josh Allen", "BUF", "QB"))
            .unwrap();
        crosswalk.propose_alias("sleeper", "4046", "C100").unwrap();
        crosswalk.propose_alias("sleeper", "4046", "C100").unwrap();
        assert_eq!(crosswalk.alias_count(), 1);
    }

    #[test]
    fn alias_to_unknown_canonical_rejected() {
        let crosswalk = Crosswalk::in_memory();
        let err = crosswalk.propose_alias("sleeper", "4046", "C404").unwrap_err();
        assert!(matches!(err, CrosswalkError::UnknownCanonical(_)));
    }

    #[test]
    fn override_remaps_after_conflict() {
        let crosswalk = Crosswalk::in_memory();
        crosswalk
            .add_entity(player("C100", "Josh Allen", "BUF", "QB"))
            .unwrap();
        crosswalk
            .add_entity(player("C200", "Josh Allen", "JAX", "LB"))
            .unwrap();
        crosswalk.propose_alias("sourceA", "42", "C100").unwrap();

        assert!(crosswalk.propose_alias("sourceA", "42", "C200").is_err());
        crosswalk.override_alias("sourceA", "42", "C200").unwrap();
        assert_eq!(
            crosswalk.resolve("sourceA", "42"),
            Resolution::Resolved("C200".to_string())
        );
    }

    #[test]
    fn duplicate_entity_rejected() {
        let crosswalk = Crosswalk::in_memory();
        crosswalk
            .add_entity(player("C100", "Josh Allen", "BUF", "QB"))
            .unwrap();
        let err = crosswalk
            .add_entity(player("C100", "Josh Allen", "BUF", "QB"))
            .unwrap_err();
        assert!(matches!(err, CrosswalkError::DuplicateCanonical(_)));
    }

    #[test]
    fn ties_surface_as_ambiguous_not_best_guess() {
        let crosswalk = Crosswalk::in_memory();
        // Two distinct Josh Allens with the same composite key
        crosswalk
            .add_entity(player("C100", "Josh Allen", "BUF", "QB"))
            .unwrap();
        crosswalk
            .add_entity(player("C300", "Josh Allen", "BUF", "QB"))
            .unwrap();

        let hint = EntityHint {
            name: Some("Josh Allen".to_string()),
            team: Some("BUF".to_string()),
            position: Some("QB".to_string()),
        };
        match crosswalk.resolve_or_nominate("ktc", "812", &hint) {
            Resolution::Ambiguous(candidates) => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates.contains(&"C100".to_string()));
                assert!(candidates.contains(&"C300".to_string()));
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn single_candidate_stays_unresolved() {
        let crosswalk = Crosswalk::in_memory();
        crosswalk
            .add_entity(player("C100", "Josh Allen", "BUF", "QB"))
            .unwrap();

        let hint = EntityHint {
            name: Some("Josh Allen".to_string()),
            team: Some("BUF".to_string()),
            position: Some("QB".to_string()),
        };
        assert_eq!(
            crosswalk.resolve_or_nominate("ktc", "812", &hint),
            Resolution::Unresolved
        );
        assert_eq!(crosswalk.nominate(&hint), vec!["C100".to_string()]);
    }

    #[test]
    fn trail_replay_reconstructs_state() {
        let dir = tempfile::tempdir().unwrap();
        {
            let crosswalk = Crosswalk::load(dir.path()).unwrap();
            crosswalk
                .add_entity(player("C100", "Josh Allen", "BUF", "QB"))
                .unwrap();
            crosswalk
                .add_entity(player("C200", "Josh Allen", "JAX", "LB"))
                .unwrap();
            crosswalk.propose_alias("sleeper", "4046", "C100").unwrap();
            crosswalk.override_alias("sleeper", "4046", "C200").unwrap();
        }

        let reloaded = Crosswalk::load(dir.path()).unwrap();
        assert_eq!(reloaded.entity_count(), 2);
        assert_eq!(reloaded.alias_count(), 1);
        assert_eq!(
            reloaded.resolve("sleeper", "4046"),
            Resolution::Resolved("C200".to_string())
        );
        assert_eq!(reloaded.entity("C100").unwrap().name, "Josh Allen");
    }

    #[test]
    fn concurrent_reads_observe_committed_state() {
        use std::sync::Arc;

        let crosswalk = Arc::new(Crosswalk::in_memory());
        crosswalk
            .add_entity(player("C100", "Josh Allen", "BUF", "QB"))
            .unwrap();
        crosswalk.propose_alias("sleeper", "4046", "C100").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cw = Arc::clone(&crosswalk);
                std::thread::spawn(move || cw.resolve("sleeper", "4046"))
            })
            .collect();
        for handle in handles {
            assert_eq!(
                handle.join().unwrap(),
                Resolution::Resolved("C100".to_string())
            );
        }
    }
}
