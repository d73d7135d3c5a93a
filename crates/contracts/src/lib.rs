//! Cross-boundary contracts shared by the island lifecycle core and its stores.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod serde_u64_string;

/// Sentinel tax balance meaning "infinite / no accrual pending".
pub const TAX_INFINITE: i64 = -1;

/// Stable identity of one island parcel: world plus island-grid coordinate.
/// Assigned by geometry, never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IslandKey {
    pub world: String,
    pub x: i32,
    pub z: i32,
}

impl IslandKey {
    pub fn new(world: impl Into<String>, x: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            z,
        }
    }
}

impl fmt::Display for IslandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{},{}", self.world, self.x, self.z)
    }
}

/// An exact block position in a world, as reported by an actor or chunk load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: i32,
    pub z: i32,
}

impl Location {
    pub fn new(world: impl Into<String>, x: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            z,
        }
    }
}

/// Lifecycle state of an island. Exactly one variant is active at any time;
/// consumers match exhaustively so a new variant cannot be silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IslandState {
    New,
    Resource,
    Reserved,
    Private,
    Abandoned,
    Repossessed,
}

impl IslandState {
    /// Whether a record in this state carries an owner (I1). ABANDONED and
    /// REPOSSESSED retain the prior owner for record-keeping and messaging.
    pub fn keeps_owner(self) -> bool {
        matches!(self, Self::Private | Self::Abandoned | Self::Repossessed)
    }

    /// Fragment used in enter/leave/examine message keys.
    pub fn message_fragment(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Resource => "resource",
            Self::Reserved => "reserved",
            Self::Private => "private",
            Self::Abandoned => "abandoned",
            Self::Repossessed => "repossessed",
        }
    }
}

/// One island record: the complete current snapshot, rewritten wholesale on
/// every transition. Only `key` is immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslandRecord {
    pub key: IslandKey,
    pub state: IslandState,
    pub owner: Option<String>,
    pub title: String,
    pub tax: i64,
    #[serde(default, with = "serde_u64_string::option")]
    pub seed: Option<u64>,
}

impl IslandRecord {
    /// Snapshot used for islands geometry can resolve but no record has been
    /// persisted for yet (pre chunk-load). Reads treat them as fresh NEW land.
    pub fn unrecorded(key: IslandKey) -> Self {
        Self {
            key,
            state: IslandState::New,
            owner: None,
            title: "New Island".to_string(),
            tax: TAX_INFINITE,
            seed: None,
        }
    }
}

/// Axis-aligned protected perimeter of an island, consumed by the
/// access-control subsystem. Bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDescriptor {
    pub world: String,
    pub min_x: i32,
    pub min_z: i32,
    pub max_x: i32,
    pub max_z: i32,
}

/// Every tunable of the lifecycle economy. The original implementation read
/// these from server configuration; embedders override the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    pub max_islands: usize,
    pub purchase_item: String,
    pub purchase_cost_amount: i64,
    pub purchase_cost_increase: i64,
    pub tax_item: String,
    pub tax_cost_amount: i64,
    pub tax_cost_increase: i64,
    pub tax_initial: i64,
    pub tax_increase: i64,
    pub tax_max: i64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_islands: 3,
            purchase_item: "diamond".to_string(),
            purchase_cost_amount: 100,
            purchase_cost_increase: 50,
            tax_item: "diamond".to_string(),
            tax_cost_amount: 50,
            tax_cost_increase: 50,
            tax_initial: 500,
            tax_increase: 500,
            tax_max: 2000,
        }
    }
}

/// User-visible reason a handler refused to act. Never a fault: state is
/// untouched and the actor has been notified with the matching message key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Denial {
    NoGeometry,
    Ocean,
    NotOwner,
    Reserved,
    Resource,
    OwnedBySelf,
    OwnedByOther,
    MaxIslands,
    MaxTax,
    InsufficientFunds { cost: i64 },
    NoEligibleIsland,
}

impl Denial {
    /// Message key in the `island-<action>-<reason>` catalog, e.g.
    /// `island-purchase-funds-error`.
    pub fn message_key(&self, action: &str) -> String {
        let suffix = match self {
            Self::NoGeometry => "world-error",
            Self::Ocean => "ocean-error",
            Self::NotOwner => "owner-error",
            Self::Reserved => "reserved-error",
            Self::Resource => "resource-error",
            Self::OwnedBySelf => "self-error",
            Self::OwnedByOther => "other-error",
            Self::MaxIslands | Self::MaxTax => "max-error",
            Self::InsufficientFunds { .. } => "funds-error",
            Self::NoEligibleIsland => "error",
        };
        format!("island-{action}-{suffix}")
    }
}

/// Result of one lifecycle entry point, as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Completed,
    Denied(Denial),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Why a record's lifecycle state was rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCause {
    Classified,
    Purchased,
    Abandoned,
    TaxPaid,
    Renamed,
    Repossessed,
    Regenerated,
}

/// Audit entry appended by the lifecycle service on every state rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub key: IslandKey,
    /// `None` for first classification of a previously unrecorded island.
    pub from: Option<IslandState>,
    pub to: IslandState,
    pub cause: TransitionCause,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_presence_follows_state() {
        assert!(IslandState::Private.keeps_owner());
        assert!(IslandState::Abandoned.keeps_owner());
        assert!(IslandState::Repossessed.keeps_owner());
        assert!(!IslandState::New.keeps_owner());
        assert!(!IslandState::Resource.keeps_owner());
        assert!(!IslandState::Reserved.keeps_owner());
    }

    #[test]
    fn denial_message_keys_match_catalog() {
        assert_eq!(
            Denial::InsufficientFunds { cost: 150 }.message_key("purchase"),
            "island-purchase-funds-error"
        );
        assert_eq!(
            Denial::Ocean.message_key("abandon"),
            "island-abandon-ocean-error"
        );
        assert_eq!(Denial::MaxTax.message_key("tax"), "island-tax-max-error");
        assert_eq!(
            Denial::NoEligibleIsland.message_key("warp"),
            "island-warp-error"
        );
    }

    #[test]
    fn record_round_trip_preserves_seed() {
        let record = IslandRecord {
            key: IslandKey::new("overworld", 3, -2),
            state: IslandState::Private,
            owner: Some("mira".to_string()),
            title: "Private Island".to_string(),
            tax: 500,
            seed: Some(u64::MAX - 17),
        };
        let encoded = serde_json::to_string(&record).expect("serialize");
        let decoded: IslandRecord = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(record, decoded);
    }

    #[test]
    fn unrecorded_snapshot_is_fresh_new_land() {
        let record = IslandRecord::unrecorded(IslandKey::new("overworld", 0, 0));
        assert_eq!(record.state, IslandState::New);
        assert_eq!(record.tax, TAX_INFINITE);
        assert!(record.owner.is_none());
    }
}
