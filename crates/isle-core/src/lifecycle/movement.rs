use super::*;

use std::sync::atomic::Ordering;

impl IslandLifecycle {
    /// Enter/leave announcements for a movement between two locations.
    /// Silent when the world has no geometry or when both endpoints fall on
    /// the same island (or both on ocean).
    ///
    /// Each endpoint resolves from its own coordinates. An earlier version
    /// of this feature resolved both endpoints from the departure point,
    /// which announced the wrong island on every crossing.
    pub fn on_move(
        &self,
        actor: &dyn PlayerActor,
        from: &Location,
        to: &Location,
    ) -> Result<(), LifecycleError> {
        let Some(geometry) = actor.geometry() else {
            return Ok(());
        };
        let departed = geometry.inner_island(from);
        let entered = geometry.inner_island(to);
        if departed == entered {
            return Ok(());
        }
        if let Some(island) = departed {
            self.announce(actor, "leave", &island)?;
        }
        if let Some(island) = entered {
            self.announce(actor, "enter", &island)?;
        }
        Ok(())
    }

    /// Teleports the actor to a uniformly drawn island that is open for
    /// purchase (NEW, ABANDONED or REPOSSESSED).
    pub fn on_warp(&self, actor: &dyn PlayerActor) -> Result<Outcome, LifecycleError> {
        let mut candidates = self
            .store
            .list_all()?
            .into_iter()
            .filter(|record| {
                matches!(
                    record.state,
                    IslandState::New | IslandState::Abandoned | IslandState::Repossessed
                )
            })
            .map(|record| record.key)
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            return Ok(self.deny(actor, "warp", Denial::NoEligibleIsland));
        }
        candidates.sort();

        let draw = self.warp_sequence.fetch_add(1, Ordering::Relaxed);
        let index = mix64(self.warp_salt ^ draw) as usize % candidates.len();
        let island = &candidates[index];
        actor.warp_to(island);
        actor.notify("island-warp", &[]);
        Ok(Outcome::Completed)
    }

    fn announce(
        &self,
        actor: &dyn PlayerActor,
        direction: &str,
        island: &IslandKey,
    ) -> Result<(), LifecycleError> {
        let record = self
            .store
            .get(island)?
            .unwrap_or_else(|| IslandRecord::unrecorded(island.clone()));
        let key = format!("island-{direction}-{}", record.state.message_fragment());
        match record.state {
            IslandState::New | IslandState::Resource | IslandState::Reserved => {
                actor.notify(&key, &[&record.title]);
            }
            IslandState::Private | IslandState::Abandoned | IslandState::Repossessed => {
                let owner = record.owner.as_deref().unwrap_or_default();
                actor.notify(&key, &[&record.title, owner]);
            }
        }
        Ok(())
    }
}
