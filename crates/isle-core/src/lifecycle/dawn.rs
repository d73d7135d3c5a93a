use super::*;

use rayon::prelude::*;

/// Counters from one daily tick over one world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DawnMetrics {
    pub scanned: usize,
    pub decremented: usize,
    pub repossessed: usize,
    pub regenerated: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DawnAction {
    Hold,
    Decrement,
    Repossess,
    Regenerate,
}

/// Pure decision function of the stored record; re-running it against the
/// same record always yields the same action, which is what makes the
/// commit phase safe to re-evaluate under the island lock.
fn dawn_action(record: &IslandRecord) -> DawnAction {
    if record.tax > 0 {
        return DawnAction::Decrement;
    }
    if record.tax < 0 {
        return DawnAction::Hold;
    }
    match record.state {
        IslandState::Private => DawnAction::Repossess,
        IslandState::Repossessed | IslandState::Abandoned => DawnAction::Regenerate,
        // tax == 0 is unreachable for these under I2; nothing to do.
        IslandState::New | IslandState::Resource | IslandState::Reserved => DawnAction::Hold,
    }
}

impl IslandLifecycle {
    /// Daily batch tick for one world: decrement owed tax, repossess PRIVATE
    /// islands whose tax hit zero, regenerate lapsed REPOSSESSED/ABANDONED
    /// islands back to NEW. Transitions are independent per island.
    ///
    /// The scan filters candidates in parallel, then commits in key order,
    /// re-reading each record under its island lock so the tick never
    /// clobbers a purchase or abandon that landed after the scan. A
    /// per-world lock keeps two dawns from double-decrementing.
    pub fn on_dawn(
        &self,
        world: &str,
        geometry: &dyn WorldGeometry,
    ) -> Result<DawnMetrics, LifecycleError> {
        let world_entry = self.world_locks.entry(&world.to_string());
        let _world_guard = hold(&world_entry);

        let records = self.store.list_by_world(world)?;
        let mut metrics = DawnMetrics {
            scanned: records.len(),
            ..DawnMetrics::default()
        };

        let mut due = records
            .par_iter()
            .filter(|record| dawn_action(record) != DawnAction::Hold)
            .map(|record| record.key.clone())
            .collect::<Vec<_>>();
        due.sort();

        for island in due {
            let island_entry = self.island_locks.entry(&island);
            let _island_guard = hold(&island_entry);
            let Some(record) = self.store.get(&island)? else {
                continue;
            };
            match dawn_action(&record) {
                DawnAction::Hold => {}
                DawnAction::Decrement => {
                    let mut updated = record;
                    updated.tax -= 1;
                    self.store.put(updated)?;
                    metrics.decremented += 1;
                }
                DawnAction::Repossess => {
                    let mut updated = record;
                    updated.state = IslandState::Repossessed;
                    updated.tax = TAX_INFINITE;
                    self.store.put(updated.clone())?;
                    self.sync_protection(geometry, &updated)?;
                    self.record_transition(
                        &island,
                        Some(IslandState::Private),
                        IslandState::Repossessed,
                        TransitionCause::Repossessed,
                    );
                    metrics.repossessed += 1;
                }
                DawnAction::Regenerate => {
                    let previous = record.state;
                    let updated = IslandRecord {
                        key: island.clone(),
                        state: IslandState::New,
                        owner: None,
                        title: "New Island".to_string(),
                        tax: TAX_INFINITE,
                        seed: record.seed,
                    };
                    self.store.put(updated.clone())?;
                    self.sync_protection(geometry, &updated)?;
                    self.record_transition(
                        &island,
                        Some(previous),
                        IslandState::New,
                        TransitionCause::Regenerated,
                    );
                    metrics.regenerated += 1;
                }
            }
        }
        Ok(metrics)
    }
}
