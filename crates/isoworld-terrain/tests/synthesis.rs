use std::sync::Arc;

use isoworld_grid::{Grid, TileType};
use isoworld_terrain::{
    BiomeCatalog, GenerationMode, GenerationParameters, PlanetProfile, TerrainSynthesizer,
    default_catalog,
};

#[test]
fn test_planet_profile_drives_synthesis() {
    let profile = PlanetProfile {
        seed: 2024,
        water_coverage: 0.9,
        mode: GenerationMode::Archipelago,
        ..PlanetProfile::default()
    };
    let mut synthesizer = TerrainSynthesizer::new(profile.to_parameters(), Arc::new(default_catalog()));
    let mut grid = Grid::new(64, 64);
    let report = synthesizer.generate(&mut grid, profile.mode).unwrap();
    assert_eq!(report.mode, GenerationMode::Archipelago);

    let water = grid.tiles().iter().filter(|t| t.kind().is_water()).count();
    assert!(
        water * 2 > grid.tiles().len(),
        "a 90% water planet should be mostly water, got {water}/{}",
        grid.tiles().len()
    );
}

#[test]
fn test_catalog_round_trip_produces_same_world() {
    let catalog = default_catalog();
    let reloaded = BiomeCatalog::from_ron_str(&catalog.to_ron_string().unwrap()).unwrap();

    let mut a = Grid::new(32, 32);
    let mut b = Grid::new(32, 32);
    TerrainSynthesizer::new(GenerationParameters::with_seed(5), Arc::new(catalog))
        .generate(&mut a, GenerationMode::Mountainous)
        .unwrap();
    TerrainSynthesizer::new(GenerationParameters::with_seed(5), Arc::new(reloaded))
        .generate(&mut b, GenerationMode::Mountainous)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_generated_grid_survives_save_and_load() {
    let mut grid = Grid::new(20, 12);
    TerrainSynthesizer::new(GenerationParameters::with_seed(31), Arc::new(default_catalog()))
        .generate(&mut grid, GenerationMode::Alien)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("world.map");
    grid.save(&path).unwrap();
    let loaded = Grid::load(&path).unwrap();

    for ((_, _, a), (x, y, b)) in grid.iter().zip(loaded.iter()) {
        assert_eq!(a.kind(), b.kind(), "type differs at ({x}, {y})");
        assert_eq!(a.walkable, b.walkable);
        assert_eq!(a.transparent, b.transparent);
        assert_eq!(a.height, b.height);
    }
    assert!(loaded.tiles().iter().all(|t| t.kind() != TileType::Empty));
}
