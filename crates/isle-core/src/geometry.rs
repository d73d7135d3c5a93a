//! World geometry contract, plus a square-grid implementation for worlds laid
//! out as evenly pitched islands separated by ocean channels.

use contracts::{IslandKey, Location, RegionDescriptor};

use crate::{hash_bytes, mix64};

/// Resolves world coordinates to island identity and classifies islands
/// procedurally. A world without island geometry simply never hands out an
/// implementation of this trait.
pub trait WorldGeometry: Send + Sync {
    /// The island the given position stands on, or `None` for ocean.
    fn inner_island(&self, location: &Location) -> Option<IslandKey>;

    /// Islands whose protected perimeter overlaps the loaded area around
    /// `location` (one chunk).
    fn outer_islands(&self, location: &Location) -> Vec<IslandKey>;

    fn is_spawn(&self, island: &IslandKey) -> bool;

    fn is_resource(&self, island: &IslandKey, world_seed: u64) -> bool;

    /// Protected perimeter of the island, for the access-control subsystem.
    fn outer_region(&self, island: &IslandKey) -> RegionDescriptor;

    /// Biome label derived from a per-island seed.
    fn biome(&self, seed: u64) -> String;
}

const CHUNK_SIZE: i32 = 16;

const BIOME_NAMES: [&str; 8] = [
    "Forest",
    "Jungle",
    "Desert",
    "Taiga",
    "Swampland",
    "Plains",
    "Savanna",
    "Mushroom",
];

/// Square islands of `island_size` blocks on a regular pitch, separated by
/// `ocean_gap` blocks of ocean. Island (0, 0) is the spawn island; resource
/// islands are drawn procedurally from the world seed at
/// `resource_rate_bps` / 10000.
#[derive(Debug, Clone)]
pub struct GridGeometry {
    pub world: String,
    pub island_size: i32,
    pub ocean_gap: i32,
    pub protection_margin: i32,
    pub resource_rate_bps: u32,
}

impl GridGeometry {
    pub fn new(world: impl Into<String>) -> Self {
        Self {
            world: world.into(),
            island_size: 64,
            ocean_gap: 32,
            protection_margin: 16,
            resource_rate_bps: 2000,
        }
    }

    fn pitch(&self) -> i32 {
        self.island_size + self.ocean_gap
    }

    /// Grid index and within-cell offset for one axis.
    fn cell(&self, coordinate: i32) -> (i32, i32) {
        (
            coordinate.div_euclid(self.pitch()),
            coordinate.rem_euclid(self.pitch()),
        )
    }
}

impl WorldGeometry for GridGeometry {
    fn inner_island(&self, location: &Location) -> Option<IslandKey> {
        let (ix, ox) = self.cell(location.x);
        let (iz, oz) = self.cell(location.z);
        if ox < self.island_size && oz < self.island_size {
            Some(IslandKey::new(location.world.clone(), ix, iz))
        } else {
            None
        }
    }

    fn outer_islands(&self, location: &Location) -> Vec<IslandKey> {
        let chunk_min_x = location.x.div_euclid(CHUNK_SIZE) * CHUNK_SIZE;
        let chunk_min_z = location.z.div_euclid(CHUNK_SIZE) * CHUNK_SIZE;
        let chunk_max_x = chunk_min_x + CHUNK_SIZE - 1;
        let chunk_max_z = chunk_min_z + CHUNK_SIZE - 1;

        // Any island whose padded box could reach the chunk lies within one
        // grid cell of the chunk's corners.
        let lo_x = (chunk_min_x - self.protection_margin).div_euclid(self.pitch());
        let hi_x = (chunk_max_x + self.protection_margin).div_euclid(self.pitch());
        let lo_z = (chunk_min_z - self.protection_margin).div_euclid(self.pitch());
        let hi_z = (chunk_max_z + self.protection_margin).div_euclid(self.pitch());

        let mut islands = Vec::new();
        for ix in lo_x..=hi_x {
            for iz in lo_z..=hi_z {
                let island = IslandKey::new(location.world.clone(), ix, iz);
                let region = self.outer_region(&island);
                if region.min_x <= chunk_max_x
                    && region.max_x >= chunk_min_x
                    && region.min_z <= chunk_max_z
                    && region.max_z >= chunk_min_z
                {
                    islands.push(island);
                }
            }
        }
        islands
    }

    fn is_spawn(&self, island: &IslandKey) -> bool {
        island.x == 0 && island.z == 0
    }

    fn is_resource(&self, island: &IslandKey, world_seed: u64) -> bool {
        if self.is_spawn(island) {
            return false;
        }
        let coordinate =
            ((island.x as i64 as u64) << 32) ^ (island.z as i64 as u64 & 0xFFFF_FFFF);
        let draw = mix64(world_seed ^ hash_bytes(island.world.as_bytes()) ^ mix64(coordinate));
        (draw % 10_000) < u64::from(self.resource_rate_bps)
    }

    fn outer_region(&self, island: &IslandKey) -> RegionDescriptor {
        let min_x = island.x * self.pitch() - self.protection_margin;
        let min_z = island.z * self.pitch() - self.protection_margin;
        RegionDescriptor {
            world: island.world.clone(),
            min_x,
            min_z,
            max_x: min_x + self.island_size + 2 * self.protection_margin - 1,
            max_z: min_z + self.island_size + 2 * self.protection_margin - 1,
        }
    }

    fn biome(&self, seed: u64) -> String {
        BIOME_NAMES[(mix64(seed) % BIOME_NAMES.len() as u64) as usize].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> GridGeometry {
        GridGeometry::new("overworld")
    }

    #[test]
    fn inner_island_resolves_land_and_ocean() {
        let geometry = geometry();
        // Pitch is 96: island (1, 0) spans x 96..=159, z 0..=63.
        let on_land = Location::new("overworld", 100, 10);
        assert_eq!(
            geometry.inner_island(&on_land),
            Some(IslandKey::new("overworld", 1, 0))
        );

        let in_channel = Location::new("overworld", 70, 10);
        assert_eq!(geometry.inner_island(&in_channel), None);
    }

    #[test]
    fn inner_island_handles_negative_coordinates() {
        let geometry = geometry();
        let location = Location::new("overworld", -90, -90);
        assert_eq!(
            geometry.inner_island(&location),
            Some(IslandKey::new("overworld", -1, -1))
        );
    }

    #[test]
    fn outer_islands_cover_touched_perimeters() {
        let geometry = geometry();
        let islands = geometry.outer_islands(&Location::new("overworld", 8, 8));
        assert!(islands.contains(&IslandKey::new("overworld", 0, 0)));

        // A chunk in the middle of a wide channel corner may touch several
        // padded boxes, but never an island a full pitch away.
        assert!(!islands.contains(&IslandKey::new("overworld", 2, 0)));
    }

    #[test]
    fn spawn_island_is_never_resource() {
        let geometry = GridGeometry {
            resource_rate_bps: 10_000,
            ..geometry()
        };
        let spawn = IslandKey::new("overworld", 0, 0);
        assert!(geometry.is_spawn(&spawn));
        assert!(!geometry.is_resource(&spawn, 1337));
        assert!(geometry.is_resource(&IslandKey::new("overworld", 1, 0), 1337));
    }

    #[test]
    fn outer_region_pads_inner_box() {
        let geometry = geometry();
        let region = geometry.outer_region(&IslandKey::new("overworld", 1, 0));
        assert_eq!(region.min_x, 96 - 16);
        assert_eq!(region.max_x, 96 + 64 + 16 - 1);
        assert_eq!(region.min_z, -16);
        assert_eq!(region.max_z, 64 + 16 - 1);
    }

    #[test]
    fn biome_is_stable_for_a_seed() {
        let geometry = geometry();
        assert_eq!(geometry.biome(42), geometry.biome(42));
    }
}
