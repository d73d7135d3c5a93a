//! Pricing for island purchases and tax pay-ahead. Pure functions of the
//! configuration and the buyer's current PRIVATE holdings: every additional
//! island makes the next one (and its upkeep) more expensive.

use contracts::{IslandState, LifecycleConfig};

use crate::store::{RecordStore, StoreError};

/// Number of currently-PRIVATE islands owned by the actor. ABANDONED and
/// REPOSSESSED records that still name the actor do not count.
pub fn owned_private_count(store: &dyn RecordStore, owner: &str) -> Result<usize, StoreError> {
    Ok(store
        .list_by_owner(owner)?
        .iter()
        .filter(|record| record.state == IslandState::Private)
        .count())
}

pub fn purchase_cost(config: &LifecycleConfig, owned_private: usize) -> i64 {
    config.purchase_cost_amount + owned_private as i64 * config.purchase_cost_increase
}

pub fn tax_cost(config: &LifecycleConfig, owned_private: usize) -> i64 {
    config.tax_cost_amount + (owned_private as i64 - 1) * config.tax_cost_increase
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use contracts::{IslandKey, IslandRecord, TAX_INFINITE};

    #[test]
    fn purchase_cost_scales_with_holdings() {
        let config = LifecycleConfig {
            purchase_cost_amount: 100,
            purchase_cost_increase: 50,
            ..LifecycleConfig::default()
        };
        assert_eq!(purchase_cost(&config, 0), 100);
        assert_eq!(purchase_cost(&config, 2), 200);
        assert!(purchase_cost(&config, 3) >= purchase_cost(&config, 2));
    }

    #[test]
    fn tax_cost_charges_base_for_a_single_island() {
        let config = LifecycleConfig {
            tax_cost_amount: 50,
            tax_cost_increase: 50,
            ..LifecycleConfig::default()
        };
        assert_eq!(tax_cost(&config, 1), 50);
        assert_eq!(tax_cost(&config, 3), 150);
    }

    #[test]
    fn holdings_count_ignores_lapsed_ownership() {
        let store = MemoryStore::new();
        let mut record = IslandRecord {
            key: IslandKey::new("overworld", 0, 0),
            state: IslandState::Private,
            owner: Some("mira".to_string()),
            title: "Private Island".to_string(),
            tax: 500,
            seed: None,
        };
        store.put(record.clone()).expect("put");

        record.key = IslandKey::new("overworld", 1, 0);
        record.state = IslandState::Repossessed;
        record.tax = TAX_INFINITE;
        store.put(record.clone()).expect("put");

        record.key = IslandKey::new("overworld", 2, 0);
        record.state = IslandState::Abandoned;
        store.put(record).expect("put");

        assert_eq!(
            owned_private_count(&store, "mira").expect("count"),
            1,
            "abandoned/repossessed records keep the owner name but are not holdings"
        );
    }
}
