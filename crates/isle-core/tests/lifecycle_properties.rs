use std::sync::{Arc, Mutex};
use std::thread;

use contracts::{
    Denial, IslandKey, IslandRecord, IslandState, LifecycleConfig, Location, Outcome,
    RegionDescriptor, TAX_INFINITE,
};
use isle_core::actor::PlayerActor;
use isle_core::economy;
use isle_core::geometry::{GridGeometry, WorldGeometry};
use isle_core::protect::{ProtectionError, ProtectionSync};
use isle_core::store::{MemoryStore, RecordStore};
use isle_core::IslandLifecycle;
use proptest::prelude::*;

#[derive(Debug, Default)]
struct NullProtection;

impl ProtectionSync for NullProtection {
    fn set_reserved(&self, _region: &RegionDescriptor) -> Result<(), ProtectionError> {
        Ok(())
    }

    fn set_public(&self, _region: &RegionDescriptor) -> Result<(), ProtectionError> {
        Ok(())
    }

    fn set_private(&self, _region: &RegionDescriptor, _owner: &str) -> Result<(), ProtectionError> {
        Ok(())
    }
}

struct TestActor {
    name: String,
    location: Location,
    geometry: GridGeometry,
    funds: Mutex<i64>,
    warped: Mutex<Vec<IslandKey>>,
}

impl TestActor {
    fn new(name: &str, location: Location, funds: i64) -> Self {
        Self {
            name: name.to_string(),
            location,
            geometry: grid(),
            funds: Mutex::new(funds),
            warped: Mutex::new(Vec::new()),
        }
    }
}

impl PlayerActor for TestActor {
    fn name(&self) -> &str {
        &self.name
    }

    fn location(&self) -> Location {
        self.location.clone()
    }

    fn geometry(&self) -> Option<&dyn WorldGeometry> {
        Some(&self.geometry)
    }

    fn debit(&self, _item: &str, amount: i64) -> bool {
        let mut funds = self.funds.lock().unwrap();
        if *funds >= amount {
            *funds -= amount;
            true
        } else {
            false
        }
    }

    fn notify(&self, _message_key: &str, _args: &[&str]) {}

    fn warp_to(&self, island: &IslandKey) {
        self.warped.lock().unwrap().push(island.clone());
    }
}

fn grid() -> GridGeometry {
    GridGeometry {
        resource_rate_bps: 0,
        ..GridGeometry::new("overworld")
    }
}

fn service(store: Arc<MemoryStore>) -> IslandLifecycle {
    IslandLifecycle::new(LifecycleConfig::default(), store, Arc::new(NullProtection))
}

fn on_island(ix: i32, iz: i32) -> Location {
    Location::new("overworld", ix * 96 + 10, iz * 96 + 10)
}

fn owner_presence_matches_state(record: &IslandRecord) -> bool {
    record.owner.is_some() == record.state.keeps_owner()
}

#[test]
fn island_journey_from_claim_to_repossession_and_resale() {
    let store = Arc::new(MemoryStore::new());
    let lifecycle = service(store.clone());
    let geometry = grid();
    let island = IslandKey::new("overworld", 1, 0);

    lifecycle
        .on_load(&on_island(1, 0), 42, Some(&geometry))
        .expect("load");

    let mira = TestActor::new("mira", on_island(1, 0), 1_000);
    assert_eq!(lifecycle.on_purchase(&mira).expect("purchase"), Outcome::Completed);
    assert_eq!(
        lifecycle.on_rename(&mira, "Harbor").expect("rename"),
        Outcome::Completed
    );

    // Run the tax balance down to repossession.
    let initial_tax = lifecycle.config().tax_initial;
    for _ in 0..initial_tax {
        let metrics = lifecycle.on_dawn("overworld", &geometry).expect("dawn");
        assert_eq!(metrics.decremented, 1);
    }
    let metrics = lifecycle.on_dawn("overworld", &geometry).expect("dawn");
    assert_eq!(metrics.repossessed, 1);

    let record = store.get(&island).expect("get").expect("record");
    assert_eq!(record.state, IslandState::Repossessed);
    assert_eq!(record.owner.as_deref(), Some("mira"));
    assert!(owner_presence_matches_state(&record));

    // A repossessed island is open for purchase again.
    let soren = TestActor::new("soren", on_island(1, 0), 1_000);
    assert_eq!(lifecycle.on_purchase(&soren).expect("purchase"), Outcome::Completed);
    let record = store.get(&island).expect("get").expect("record");
    assert_eq!(record.owner.as_deref(), Some("soren"));
    assert_eq!(record.title, "Private Island", "resale resets the title");
}

#[test]
fn concurrent_purchases_of_one_island_admit_exactly_one_owner() {
    let store = Arc::new(MemoryStore::new());
    let lifecycle = Arc::new(service(store.clone()));

    let outcomes = thread::scope(|scope| {
        let handles = ["mira", "soren"].map(|name| {
            let lifecycle = Arc::clone(&lifecycle);
            scope.spawn(move || {
                let actor = TestActor::new(name, on_island(1, 0), 1_000);
                lifecycle.on_purchase(&actor).expect("purchase")
            })
        });
        handles.map(|handle| handle.join().expect("join"))
    });

    let completed = outcomes
        .iter()
        .filter(|outcome| outcome.is_completed())
        .count();
    assert_eq!(completed, 1, "per-island serialization admits one winner");
    assert!(outcomes
        .iter()
        .any(|outcome| matches!(outcome, Outcome::Denied(Denial::OwnedByOther))));

    let record = store
        .get(&IslandKey::new("overworld", 1, 0))
        .expect("get")
        .expect("record");
    assert_eq!(record.state, IslandState::Private);
    assert!(owner_presence_matches_state(&record));
}

#[test]
fn holdings_cap_applies_across_all_worlds() {
    let store = Arc::new(MemoryStore::new());
    for world in ["overworld", "skylands", "depths"] {
        store
            .put(IslandRecord {
                key: IslandKey::new(world, 1, 1),
                state: IslandState::Private,
                owner: Some("mira".to_string()),
                title: "Private Island".to_string(),
                tax: 500,
                seed: None,
            })
            .expect("put");
    }
    let lifecycle = service(store);

    let actor = TestActor::new("mira", on_island(2, 0), 10_000);
    assert_eq!(
        lifecycle.on_purchase(&actor).expect("purchase"),
        Outcome::Denied(Denial::MaxIslands)
    );
}

#[test]
fn warp_reaches_every_open_island() {
    let store = Arc::new(MemoryStore::new());
    for (x, state) in [(3, IslandState::New), (5, IslandState::Abandoned)] {
        store
            .put(IslandRecord {
                key: IslandKey::new("overworld", x, 0),
                state,
                owner: (state != IslandState::New).then(|| "mira".to_string()),
                title: "New Island".to_string(),
                tax: TAX_INFINITE,
                seed: None,
            })
            .expect("put");
    }
    let lifecycle = service(store);

    let actor = TestActor::new("soren", on_island(0, 0), 0);
    for _ in 0..64 {
        assert_eq!(lifecycle.on_warp(&actor).expect("warp"), Outcome::Completed);
    }

    let warped = actor.warped.lock().unwrap();
    for x in [3, 5] {
        let island = IslandKey::new("overworld", x, 0);
        assert!(
            warped.contains(&island),
            "64 draws over 2 candidates reach both"
        );
    }
}

proptest! {
    #[test]
    fn purchase_pricing_is_affine_in_holdings(
        base in 1_i64..10_000,
        increase in 0_i64..1_000,
        owned in 0_usize..32,
    ) {
        let config = LifecycleConfig {
            purchase_cost_amount: base,
            purchase_cost_increase: increase,
            ..LifecycleConfig::default()
        };
        let cost = economy::purchase_cost(&config, owned);
        prop_assert_eq!(cost, base + owned as i64 * increase);
        prop_assert!(economy::purchase_cost(&config, owned + 1) >= cost);
    }

    #[test]
    fn tax_pricing_charges_base_for_the_first_holding(
        base in 1_i64..10_000,
        increase in 0_i64..1_000,
        owned in 1_usize..32,
    ) {
        let config = LifecycleConfig {
            tax_cost_amount: base,
            tax_cost_increase: increase,
            ..LifecycleConfig::default()
        };
        prop_assert_eq!(
            economy::tax_cost(&config, owned),
            base + (owned as i64 - 1) * increase
        );
        prop_assert_eq!(economy::tax_cost(&config, 1), base);
    }

    #[test]
    fn dawn_decrements_private_balances_by_exactly_one(tax in 1_i64..2_000) {
        let store = Arc::new(MemoryStore::new());
        let island = IslandKey::new("overworld", 1, 0);
        store
            .put(IslandRecord {
                key: island.clone(),
                state: IslandState::Private,
                owner: Some("mira".to_string()),
                title: "Private Island".to_string(),
                tax,
                seed: None,
            })
            .expect("put");
        let lifecycle = service(store.clone());

        let metrics = lifecycle.on_dawn("overworld", &grid()).expect("dawn");
        prop_assert_eq!(metrics.decremented, 1);

        let record = store.get(&island).expect("get").expect("record");
        prop_assert_eq!(record.state, IslandState::Private);
        prop_assert_eq!(record.tax, tax - 1);
        prop_assert!(owner_presence_matches_state(&record));
    }

    #[test]
    fn dawn_preserves_owner_iff_state_keeps_it(
        tax in proptest::option::of(0_i64..3),
        state_index in 0_usize..6,
    ) {
        let states = [
            IslandState::New,
            IslandState::Resource,
            IslandState::Reserved,
            IslandState::Private,
            IslandState::Abandoned,
            IslandState::Repossessed,
        ];
        let state = states[state_index];
        let record = IslandRecord {
            key: IslandKey::new("overworld", 1, 0),
            state,
            owner: state.keeps_owner().then(|| "mira".to_string()),
            title: "Island".to_string(),
            tax: tax.unwrap_or(TAX_INFINITE),
            seed: None,
        };
        let store = Arc::new(MemoryStore::new());
        store.put(record).expect("put");
        let lifecycle = service(store.clone());

        lifecycle.on_dawn("overworld", &grid()).expect("dawn");

        let record = store
            .get(&IslandKey::new("overworld", 1, 0))
            .expect("get")
            .expect("record");
        prop_assert!(owner_presence_matches_state(&record));
    }
}
