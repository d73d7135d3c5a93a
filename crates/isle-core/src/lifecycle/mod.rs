//! The island lifecycle service: every state transition, the economic guards
//! around them, and the protection synchronization that accompanies each
//! persisted mutation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contracts::{
    Denial, IslandKey, IslandRecord, IslandState, LifecycleConfig, Location, Outcome,
    TransitionCause, TransitionRecord, TAX_INFINITE,
};

use crate::actor::PlayerActor;
use crate::geometry::WorldGeometry;
use crate::protect::{ProtectionError, ProtectionSync};
use crate::store::{RecordStore, StoreError};
use crate::{hash_bytes, mix64};

mod claims;
mod dawn;
mod inspect;
mod load;
mod movement;

pub use dawn::DawnMetrics;

/// Infrastructure fault from a collaborator. User-visible refusals are never
/// errors; they come back as [`Outcome::Denied`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    Store(StoreError),
    Protection(ProtectionError),
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Protection(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for LifecycleError {}

impl From<StoreError> for LifecycleError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ProtectionError> for LifecycleError {
    fn from(value: ProtectionError) -> Self {
        Self::Protection(value)
    }
}

/// Recovers the guard from a poisoned mutex: lock state here is only ever a
/// serialization token, never data that could be left half-written.
pub(crate) fn hold<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Lazily grown arena of per-key mutexes. Locking one key never contends
/// with operations on any other key; entries nobody currently holds are
/// reclaimed on the next lookup, so the arena never outgrows the set of
/// keys in flight.
#[derive(Debug)]
struct LockArena<K: Ord + Clone> {
    entries: Mutex<BTreeMap<K, Arc<Mutex<()>>>>,
}

// Not derived: a derived `Default` would also bound `K: Default`, which key
// types like `IslandKey` do not implement.
impl<K: Ord + Clone> Default for LockArena<K> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<K: Ord + Clone> LockArena<K> {
    fn entry(&self, key: &K) -> Arc<Mutex<()>> {
        let mut entries = hold(&self.entries);
        // An entry referenced only by the map itself is held by no one; the
        // map lock is held here, so no new holder can appear mid-scan.
        entries.retain(|held, lock| held == key || Arc::strong_count(lock) > 1);
        entries.entry(key.clone()).or_default().clone()
    }
}

/// Stateless-over-storage lifecycle service. All mutation of island records
/// and all protection-sync calls in the system go through this type.
///
/// Lock discipline: handlers that consult an actor's holdings (purchase, tax)
/// take the owner lock first, then the island lock; everything else takes
/// only the island lock. The dawn tick additionally holds a per-world lock
/// for its whole scan so a world is never double-decremented.
#[derive(Debug)]
pub struct IslandLifecycle {
    config: LifecycleConfig,
    store: Arc<dyn RecordStore>,
    protection: Arc<dyn ProtectionSync>,
    island_locks: LockArena<IslandKey>,
    owner_locks: LockArena<String>,
    world_locks: LockArena<String>,
    transitions: Mutex<Vec<TransitionRecord>>,
    warp_sequence: AtomicU64,
    warp_salt: u64,
}

impl IslandLifecycle {
    pub fn new(
        config: LifecycleConfig,
        store: Arc<dyn RecordStore>,
        protection: Arc<dyn ProtectionSync>,
    ) -> Self {
        Self {
            config,
            store,
            protection,
            island_locks: LockArena::default(),
            owner_locks: LockArena::default(),
            world_locks: LockArena::default(),
            transitions: Mutex::new(Vec::new()),
            warp_sequence: AtomicU64::new(0),
            warp_salt: 0x5dee_ce66_cf8f_13e5,
        }
    }

    /// Reseeds warp selection; the default salt is fine for production, this
    /// exists so tests can steer the draw sequence.
    pub fn with_warp_seed(mut self, seed: u64) -> Self {
        self.warp_salt = seed;
        self
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Audit trail of every state rewrite since construction (or the last
    /// [`take_transitions`](Self::take_transitions) call).
    pub fn transitions(&self) -> Vec<TransitionRecord> {
        hold(&self.transitions).clone()
    }

    /// Drains the audit trail, handing the accumulated entries to the
    /// caller. Embedders that ship the log elsewhere call this periodically
    /// so the in-memory buffer does not grow without bound.
    pub fn take_transitions(&self) -> Vec<TransitionRecord> {
        std::mem::take(&mut *hold(&self.transitions))
    }

    /// Common guard pair: the actor's world must have geometry, and the
    /// actor must be standing on an island rather than ocean.
    fn resolve_context<'a>(
        &self,
        actor: &'a dyn PlayerActor,
    ) -> Result<(&'a dyn WorldGeometry, IslandKey), Denial> {
        let geometry = actor.geometry().ok_or(Denial::NoGeometry)?;
        let island = geometry
            .inner_island(&actor.location())
            .ok_or(Denial::Ocean)?;
        Ok((geometry, island))
    }

    /// Notifies the actor with the denial's message key and returns the
    /// denied outcome. The only argument carried is the cost on funds errors.
    fn deny(&self, actor: &dyn PlayerActor, action: &str, denial: Denial) -> Outcome {
        let key = denial.message_key(action);
        match denial {
            Denial::InsufficientFunds { cost } => {
                let cost = cost.to_string();
                actor.notify(&key, &[&cost]);
            }
            _ => actor.notify(&key, &[]),
        }
        Outcome::Denied(denial)
    }

    /// Applies the protection state implied by the record's current type and
    /// owner (I3): always a full overwrite, safe to repeat.
    fn sync_protection(
        &self,
        geometry: &dyn WorldGeometry,
        record: &IslandRecord,
    ) -> Result<(), ProtectionError> {
        let region = geometry.outer_region(&record.key);
        match record.state {
            IslandState::New
            | IslandState::Reserved
            | IslandState::Abandoned
            | IslandState::Repossessed => self.protection.set_reserved(&region),
            IslandState::Resource => self.protection.set_public(&region),
            IslandState::Private => self
                .protection
                .set_private(&region, record.owner.as_deref().unwrap_or_default()),
        }
    }

    fn record_transition(
        &self,
        key: &IslandKey,
        from: Option<IslandState>,
        to: IslandState,
        cause: TransitionCause,
    ) {
        hold(&self.transitions).push(TransitionRecord {
            key: key.clone(),
            from,
            to,
            cause,
        });
    }
}

/// Per-island generation seed: world seed mixed with the grid coordinate.
fn island_seed(world_seed: u64, island: &IslandKey) -> u64 {
    let coordinate = ((island.x as i64 as u64) << 32) ^ (island.z as i64 as u64 & 0xFFFF_FFFF);
    mix64(world_seed ^ hash_bytes(island.world.as_bytes()) ^ mix64(coordinate))
}
