use super::*;

/// Formats the displayed tax balance; a negative balance means the island
/// never accrues tax.
fn tax_display(tax: i64) -> String {
    if tax < 0 {
        "infinite".to_string()
    } else {
        tax.to_string()
    }
}

impl IslandLifecycle {
    /// Read-only summary of the island the actor stands on, keyed per state
    /// so the catalog can phrase each type differently. Never mutates.
    pub fn on_examine(&self, actor: &dyn PlayerActor) -> Result<Outcome, LifecycleError> {
        let (geometry, island) = match self.resolve_context(actor) {
            Ok(context) => context,
            Err(denial) => return Ok(self.deny(actor, "examine", denial)),
        };

        let record = self
            .store
            .get(&island)?
            .unwrap_or_else(|| IslandRecord::unrecorded(island.clone()));

        let biome = match record.seed {
            Some(seed) => geometry.biome(seed),
            None => "unknown".to_string(),
        };
        let x = island.x.to_string();
        let z = island.z.to_string();
        let tax = tax_display(record.tax);
        let owner = record.owner.as_deref().unwrap_or_default();

        let key = format!("island-examine-{}", record.state.message_fragment());
        match record.state {
            IslandState::Resource | IslandState::Reserved => {
                actor.notify(&key, &[&island.world, &x, &z, &biome, &tax]);
            }
            IslandState::New | IslandState::Abandoned | IslandState::Repossessed => {
                actor.notify(&key, &[&island.world, &x, &z, &biome]);
            }
            IslandState::Private => {
                actor.notify(&key, &[&island.world, &x, &z, &biome, owner, &tax]);
            }
        }
        Ok(Outcome::Completed)
    }
}
