use super::*;

impl IslandLifecycle {
    /// Chunk-load entry point. Classifies and persists any island whose
    /// protected perimeter newly overlaps the loaded area, then re-applies
    /// protection for every touched island whether or not it already had a
    /// record. Protection is therefore self-healing on every load,
    /// independent of how a record reached its current state.
    ///
    /// Silent no-op when the world has no island geometry.
    pub fn on_load(
        &self,
        location: &Location,
        world_seed: u64,
        geometry: Option<&dyn WorldGeometry>,
    ) -> Result<(), LifecycleError> {
        let Some(geometry) = geometry else {
            return Ok(());
        };

        for island in geometry.outer_islands(location) {
            let entry = self.island_locks.entry(&island);
            let _guard = hold(&entry);

            let record = match self.store.get(&island)? {
                Some(record) => record,
                None => {
                    let record = self.classify(&island, world_seed, geometry);
                    self.store.put(record.clone())?;
                    self.record_transition(
                        &island,
                        None,
                        record.state,
                        TransitionCause::Classified,
                    );
                    record
                }
            };
            self.sync_protection(geometry, &record)?;
        }
        Ok(())
    }

    fn classify(
        &self,
        island: &IslandKey,
        world_seed: u64,
        geometry: &dyn WorldGeometry,
    ) -> IslandRecord {
        let (state, title) = if geometry.is_spawn(island) {
            (IslandState::Reserved, "Spawn Island")
        } else if geometry.is_resource(island, world_seed) {
            (IslandState::Resource, "Resource Island")
        } else {
            (IslandState::New, "New Island")
        };
        IslandRecord {
            key: island.clone(),
            state,
            owner: None,
            title: title.to_string(),
            tax: TAX_INFINITE,
            seed: Some(island_seed(world_seed, island)),
        }
    }
}
