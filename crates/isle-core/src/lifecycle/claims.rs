use super::*;

use crate::economy;

impl IslandLifecycle {
    /// Purchase of the island the actor stands on. Guard order: geometry,
    /// ocean, island type, holdings cap, funds; the debit is the last check
    /// before the single write-and-sync step, so a funds failure never
    /// leaves a partial mutation.
    pub fn on_purchase(&self, actor: &dyn PlayerActor) -> Result<Outcome, LifecycleError> {
        let (geometry, island) = match self.resolve_context(actor) {
            Ok(context) => context,
            Err(denial) => return Ok(self.deny(actor, "purchase", denial)),
        };

        let owner_entry = self.owner_locks.entry(&actor.name().to_string());
        let _owner_guard = hold(&owner_entry);
        let island_entry = self.island_locks.entry(&island);
        let _island_guard = hold(&island_entry);

        let existing = self.store.get(&island)?;
        match existing.as_ref().map(|record| record.state) {
            Some(IslandState::Reserved) => {
                return Ok(self.deny(actor, "purchase", Denial::Reserved));
            }
            Some(IslandState::Resource) => {
                return Ok(self.deny(actor, "purchase", Denial::Resource));
            }
            Some(IslandState::Private) => {
                let denial = if existing
                    .as_ref()
                    .and_then(|record| record.owner.as_deref())
                    == Some(actor.name())
                {
                    Denial::OwnedBySelf
                } else {
                    Denial::OwnedByOther
                };
                return Ok(self.deny(actor, "purchase", denial));
            }
            // Unrecorded islands classify at chunk load; a purchase that
            // races ahead of the load treats the island as fresh NEW land.
            Some(IslandState::New)
            | Some(IslandState::Abandoned)
            | Some(IslandState::Repossessed)
            | None => {}
        }

        let owned = economy::owned_private_count(self.store.as_ref(), actor.name())?;
        if owned >= self.config.max_islands {
            return Ok(self.deny(actor, "purchase", Denial::MaxIslands));
        }

        let cost = economy::purchase_cost(&self.config, owned);
        if !actor.debit(&self.config.purchase_item, cost) {
            return Ok(self.deny(actor, "purchase", Denial::InsufficientFunds { cost }));
        }

        let previous = existing.as_ref().map(|record| record.state);
        let record = IslandRecord {
            key: island.clone(),
            state: IslandState::Private,
            owner: Some(actor.name().to_string()),
            title: "Private Island".to_string(),
            tax: self.config.tax_initial,
            seed: existing.and_then(|record| record.seed),
        };
        self.store.put(record.clone())?;
        self.sync_protection(geometry, &record)?;
        self.record_transition(&island, previous, IslandState::Private, TransitionCause::Purchased);
        actor.notify("island-purchase", &[]);
        Ok(Outcome::Completed)
    }

    /// Voluntary tax pay-ahead on the actor's own PRIVATE island.
    pub fn on_tax(&self, actor: &dyn PlayerActor) -> Result<Outcome, LifecycleError> {
        let (_geometry, island) = match self.resolve_context(actor) {
            Ok(context) => context,
            Err(denial) => return Ok(self.deny(actor, "tax", denial)),
        };

        let owner_entry = self.owner_locks.entry(&actor.name().to_string());
        let _owner_guard = hold(&owner_entry);
        let island_entry = self.island_locks.entry(&island);
        let _island_guard = hold(&island_entry);

        let Some(record) = self.owned_private_record(&island, actor.name())? else {
            return Ok(self.deny(actor, "tax", Denial::NotOwner));
        };

        let new_tax = record.tax + self.config.tax_increase;
        if new_tax > self.config.tax_max {
            return Ok(self.deny(actor, "tax", Denial::MaxTax));
        }

        let owned = economy::owned_private_count(self.store.as_ref(), actor.name())?;
        let cost = economy::tax_cost(&self.config, owned);
        if !actor.debit(&self.config.tax_item, cost) {
            return Ok(self.deny(actor, "tax", Denial::InsufficientFunds { cost }));
        }

        let mut updated = record;
        updated.tax = new_tax;
        self.store.put(updated)?;
        self.record_transition(
            &island,
            Some(IslandState::Private),
            IslandState::Private,
            TransitionCause::TaxPaid,
        );
        actor.notify("island-tax", &[]);
        Ok(Outcome::Completed)
    }

    /// Abandonment of the actor's own PRIVATE island. The record keeps the
    /// actor as owner for messaging; tax accrual stops.
    pub fn on_abandon(&self, actor: &dyn PlayerActor) -> Result<Outcome, LifecycleError> {
        let (geometry, island) = match self.resolve_context(actor) {
            Ok(context) => context,
            Err(denial) => return Ok(self.deny(actor, "abandon", denial)),
        };

        let island_entry = self.island_locks.entry(&island);
        let _island_guard = hold(&island_entry);

        let Some(record) = self.owned_private_record(&island, actor.name())? else {
            return Ok(self.deny(actor, "abandon", Denial::NotOwner));
        };

        let mut updated = record;
        updated.state = IslandState::Abandoned;
        updated.tax = TAX_INFINITE;
        self.store.put(updated.clone())?;
        self.sync_protection(geometry, &updated)?;
        self.record_transition(
            &island,
            Some(IslandState::Private),
            IslandState::Abandoned,
            TransitionCause::Abandoned,
        );
        actor.notify("island-abandon", &[]);
        Ok(Outcome::Completed)
    }

    /// Retitling of the actor's own PRIVATE island. Everything but the title
    /// is preserved verbatim.
    pub fn on_rename(&self, actor: &dyn PlayerActor, title: &str) -> Result<Outcome, LifecycleError> {
        let (_geometry, island) = match self.resolve_context(actor) {
            Ok(context) => context,
            Err(denial) => return Ok(self.deny(actor, "rename", denial)),
        };

        let island_entry = self.island_locks.entry(&island);
        let _island_guard = hold(&island_entry);

        let Some(record) = self.owned_private_record(&island, actor.name())? else {
            return Ok(self.deny(actor, "rename", Denial::NotOwner));
        };

        let mut updated = record;
        updated.title = title.to_string();
        self.store.put(updated)?;
        self.record_transition(
            &island,
            Some(IslandState::Private),
            IslandState::Private,
            TransitionCause::Renamed,
        );
        actor.notify("island-rename", &[]);
        Ok(Outcome::Completed)
    }

    /// The island's record iff it is PRIVATE and owned by `owner`.
    fn owned_private_record(
        &self,
        island: &IslandKey,
        owner: &str,
    ) -> Result<Option<IslandRecord>, StoreError> {
        Ok(self.store.get(island)?.filter(|record| {
            record.state == IslandState::Private && record.owner.as_deref() == Some(owner)
        }))
    }
}
