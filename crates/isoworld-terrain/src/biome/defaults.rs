//! The built-in biome set.

use isoworld_grid::{BiomeId, TileType};

use super::{Biome, BiomeCatalog, DecorationTemplate};

struct Envelope {
    temperature: (f64, f64),
    humidity: (f64, f64),
    elevation: (f64, f64),
    hazard: f64,
    resources: f64,
}

fn biome(id: BiomeId, name: &str, description: &str, env: Envelope) -> Biome {
    let mut b = Biome::new(id, name);
    b.set_description(description);
    b.set_temperature_range(env.temperature.0, env.temperature.1);
    b.set_humidity_range(env.humidity.0, env.humidity.1);
    b.set_elevation_range(env.elevation.0, env.elevation.1);
    b.set_hazard_level(env.hazard);
    b.set_resource_level(env.resources);
    b
}

fn with_tiles(mut b: Biome, weights: &[(TileType, f64)]) -> Biome {
    for &(kind, weight) in weights {
        b.set_tile_weight(kind, weight);
    }
    b
}

fn with_decorations(mut b: Biome, templates: Vec<DecorationTemplate>) -> Biome {
    for t in templates {
        b.add_decoration(t);
    }
    b
}

/// Ten biomes covering temperate, arid, frozen, wet, high, volcanic and
/// exotic climates, keyed by the [`BiomeId`] constants.
pub fn default_catalog() -> BiomeCatalog {
    let biomes = [
        with_decorations(
            with_tiles(
                biome(
                    BiomeId::TEMPERATE_PLAINS,
                    "temperate_plains",
                    "Open grassland under a mild climate.",
                    Envelope {
                        temperature: (5.0, 30.0),
                        humidity: (0.3, 0.7),
                        elevation: (0.3, 0.55),
                        hazard: 0.05,
                        resources: 0.4,
                    },
                ),
                &[(TileType::Grass, 8.0), (TileType::Dirt, 1.5), (TileType::Forest, 0.5)],
            ),
            vec![
                DecorationTemplate::new(100, "wildflowers", 0.12).with_scale(0.6, 1.0),
                DecorationTemplate::new(101, "boulder", 0.03).with_scale(0.8, 1.4),
            ],
        ),
        with_decorations(
            with_tiles(
                biome(
                    BiomeId::FOREST,
                    "forest",
                    "Dense woodland on wet, moderate ground.",
                    Envelope {
                        temperature: (0.0, 28.0),
                        humidity: (0.5, 1.0),
                        elevation: (0.3, 0.65),
                        hazard: 0.1,
                        resources: 0.6,
                    },
                ),
                &[(TileType::Forest, 7.0), (TileType::Grass, 2.0), (TileType::Dirt, 0.5)],
            ),
            vec![
                DecorationTemplate::new(110, "oak_tree", 0.25).with_scale(0.8, 1.3),
                DecorationTemplate::new(111, "mushroom_ring", 0.04).with_scale(0.5, 0.9),
                DecorationTemplate::new(112, "fallen_log", 0.06),
            ],
        ),
        with_decorations(
            with_tiles(
                biome(
                    BiomeId::DESERT,
                    "desert",
                    "Hot, dry dunes and rock.",
                    Envelope {
                        temperature: (25.0, 70.0),
                        humidity: (0.0, 0.3),
                        elevation: (0.3, 0.7),
                        hazard: 0.3,
                        resources: 0.3,
                    },
                ),
                &[(TileType::Sand, 8.0), (TileType::Stone, 1.0), (TileType::RockFormation, 0.4)],
            ),
            vec![
                DecorationTemplate::new(120, "cactus", 0.08).with_scale(0.7, 1.2),
                DecorationTemplate::new(121, "bleached_bones", 0.02),
            ],
        ),
        with_decorations(
            with_tiles(
                biome(
                    BiomeId::TUNDRA,
                    "tundra",
                    "Cold plains of frozen soil and sparse grass.",
                    Envelope {
                        temperature: (-30.0, 5.0),
                        humidity: (0.0, 0.6),
                        elevation: (0.3, 0.7),
                        hazard: 0.2,
                        resources: 0.35,
                    },
                ),
                &[(TileType::Snow, 4.0), (TileType::Dirt, 2.0), (TileType::Grass, 1.0), (TileType::Stone, 1.0)],
            ),
            vec![DecorationTemplate::new(130, "lichen_patch", 0.1).with_scale(0.5, 1.0)],
        ),
        with_decorations(
            with_tiles(
                biome(
                    BiomeId::GLACIER,
                    "glacier",
                    "Permanent ice sheets and snowfields.",
                    Envelope {
                        temperature: (-80.0, -10.0),
                        humidity: (0.0, 1.0),
                        elevation: (0.35, 1.0),
                        hazard: 0.4,
                        resources: 0.2,
                    },
                ),
                &[(TileType::Ice, 6.0), (TileType::Snow, 4.0)],
            ),
            vec![DecorationTemplate::new(140, "ice_spire", 0.05).with_scale(0.8, 2.0)],
        ),
        with_decorations(
            with_tiles(
                biome(
                    BiomeId::SWAMP,
                    "swamp",
                    "Waterlogged lowland of mud and reeds.",
                    Envelope {
                        temperature: (10.0, 40.0),
                        humidity: (0.7, 1.0),
                        elevation: (0.3, 0.45),
                        hazard: 0.35,
                        resources: 0.45,
                    },
                ),
                &[(TileType::Mud, 6.0), (TileType::Grass, 2.0), (TileType::Forest, 1.0)],
            ),
            vec![
                DecorationTemplate::new(150, "reeds", 0.2).with_scale(0.6, 1.1),
                DecorationTemplate::new(151, "will_o_wisp", 0.01).animated(),
            ],
        ),
        with_decorations(
            with_tiles(
                biome(
                    BiomeId::HIGHLANDS,
                    "highlands",
                    "Rugged uplands of hills and exposed stone.",
                    Envelope {
                        temperature: (-20.0, 25.0),
                        humidity: (0.0, 0.8),
                        elevation: (0.6, 1.0),
                        hazard: 0.25,
                        resources: 0.55,
                    },
                ),
                &[
                    (TileType::Hill, 5.0),
                    (TileType::Stone, 3.0),
                    (TileType::Mountain, 2.0),
                    (TileType::RockFormation, 0.5),
                ],
            ),
            vec![DecorationTemplate::new(160, "cairn", 0.02)],
        ),
        with_decorations(
            with_tiles(
                biome(
                    BiomeId::VOLCANIC_WASTES,
                    "volcanic_wastes",
                    "Scorched basalt fields around active vents.",
                    Envelope {
                        temperature: (50.0, 200.0),
                        humidity: (0.0, 0.4),
                        elevation: (0.3, 1.0),
                        hazard: 0.7,
                        resources: 0.6,
                    },
                ),
                &[(TileType::Stone, 6.0), (TileType::RockFormation, 2.0), (TileType::Lava, 1.0)],
            ),
            vec![
                DecorationTemplate::new(170, "steam_vent", 0.05).animated(),
                DecorationTemplate::new(171, "obsidian_shard", 0.04).with_scale(0.5, 1.0),
            ],
        ),
        with_decorations(
            with_tiles(
                biome(
                    BiomeId::CRYSTAL_FIELDS,
                    "crystal_fields",
                    "Cold, dry plateaus studded with mineral crystal.",
                    Envelope {
                        temperature: (-40.0, 20.0),
                        humidity: (0.0, 0.4),
                        elevation: (0.5, 0.9),
                        hazard: 0.3,
                        resources: 0.9,
                    },
                ),
                &[(TileType::Crystal, 5.0), (TileType::Stone, 3.0), (TileType::MineralDeposit, 0.5)],
            ),
            vec![DecorationTemplate::new(180, "crystal_cluster", 0.15).with_scale(0.6, 1.8).animated()],
        ),
        with_decorations(
            with_tiles(
                biome(
                    BiomeId::ALIEN_JUNGLE,
                    "alien_jungle",
                    "Humid, hot growth of unfamiliar flora.",
                    Envelope {
                        temperature: (20.0, 60.0),
                        humidity: (0.6, 1.0),
                        elevation: (0.3, 0.7),
                        hazard: 0.5,
                        resources: 0.7,
                    },
                ),
                &[(TileType::AlienGrowth, 6.0), (TileType::Forest, 2.0), (TileType::Mud, 1.0)],
            ),
            vec![
                DecorationTemplate::new(190, "bioluminescent_pod", 0.1).with_scale(0.5, 1.2).animated(),
                DecorationTemplate::new(191, "tendril_spire", 0.05).with_scale(1.0, 2.5),
            ],
        ),
    ];

    let mut catalog = BiomeCatalog::new();
    for b in biomes {
        if let Err(err) = catalog.register(b) {
            tracing::error!(%err, "Built-in biome rejected");
        }
    }
    catalog
}
