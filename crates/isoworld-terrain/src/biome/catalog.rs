//! Biome catalog: the ordered set of biomes available to a planet, with
//! id and name lookup and RON persistence.

use std::path::Path;

use hashbrown::HashMap;
use isoworld_grid::BiomeId;

use super::Biome;

/// Errors that can occur when building, loading or saving a catalog.
#[derive(Debug, thiserror::Error)]
pub enum BiomeCatalogError {
    /// A biome with this name is already registered.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),
    /// A biome with this id is already registered.
    #[error("duplicate biome id: {0}")]
    DuplicateId(u16),
    #[error("failed to read biome catalog: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write biome catalog: {0}")]
    Write(#[source] std::io::Error),
    #[error("failed to parse biome catalog: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize biome catalog: {0}")]
    Serialize(#[from] ron::Error),
}

/// Registered biomes in insertion order.
///
/// Iteration order is registration order; biome selection relies on it for
/// deterministic tie-breaking.
#[derive(Clone, Debug, Default)]
pub struct BiomeCatalog {
    biomes: Vec<Biome>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<BiomeId, usize>,
}

impl BiomeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from a list, failing on the first duplicate.
    pub fn from_biomes(biomes: impl IntoIterator<Item = Biome>) -> Result<Self, BiomeCatalogError> {
        let mut catalog = Self::new();
        for biome in biomes {
            catalog.register(biome)?;
        }
        Ok(catalog)
    }

    /// Adds a biome.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeCatalogError::DuplicateName`] or [`BiomeCatalogError::DuplicateId`]
    /// if either key is already taken.
    pub fn register(&mut self, biome: Biome) -> Result<BiomeId, BiomeCatalogError> {
        if self.by_name.contains_key(biome.name()) {
            return Err(BiomeCatalogError::DuplicateName(biome.name().to_owned()));
        }
        let id = biome.id();
        if self.by_id.contains_key(&id) {
            return Err(BiomeCatalogError::DuplicateId(id.0));
        }
        let index = self.biomes.len();
        self.by_name.insert(biome.name().to_owned(), index);
        self.by_id.insert(id, index);
        self.biomes.push(biome);
        Ok(id)
    }

    pub fn get(&self, id: BiomeId) -> Option<&Biome> {
        self.by_id.get(&id).map(|&i| &self.biomes[i])
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<&Biome> {
        self.by_name.get(name).map(|&i| &self.biomes[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Biome> {
        self.biomes.iter()
    }

    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    /// Parses a RON list of biomes. Out-of-range values are repaired with the
    /// same rules the setters apply.
    pub fn from_ron_str(source: &str) -> Result<Self, BiomeCatalogError> {
        let mut biomes: Vec<Biome> = ron::from_str(source)?;
        for biome in &mut biomes {
            biome.sanitize();
        }
        Self::from_biomes(biomes)
    }

    pub fn to_ron_string(&self) -> Result<String, BiomeCatalogError> {
        let pretty = ron::ser::PrettyConfig::new().depth_limit(4);
        Ok(ron::ser::to_string_pretty(&self.biomes, pretty)?)
    }

    pub fn load(path: &Path) -> Result<Self, BiomeCatalogError> {
        let contents = std::fs::read_to_string(path).map_err(BiomeCatalogError::Read)?;
        let catalog = Self::from_ron_str(&contents)?;
        tracing::info!(path = %path.display(), biomes = catalog.len(), "Loaded biome catalog");
        Ok(catalog)
    }

    pub fn save(&self, path: &Path) -> Result<(), BiomeCatalogError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(BiomeCatalogError::Write)?;
        }
        let contents = self.to_ron_string()?;
        std::fs::write(path, contents).map_err(BiomeCatalogError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::default_catalog;
    use isoworld_grid::TileType;

    #[test]
    fn test_register_and_lookup() {
        let mut catalog = BiomeCatalog::new();
        let id = catalog.register(Biome::new(BiomeId(12), "marsh")).unwrap();
        assert_eq!(id, BiomeId(12));
        assert_eq!(catalog.get(BiomeId(12)).map(Biome::name), Some("marsh"));
        assert_eq!(catalog.lookup_by_name("marsh").map(Biome::id), Some(BiomeId(12)));
        assert!(catalog.get(BiomeId(13)).is_none());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut catalog = BiomeCatalog::new();
        catalog.register(Biome::new(BiomeId(0), "dup")).unwrap();
        let err = catalog.register(Biome::new(BiomeId(1), "dup")).unwrap_err();
        assert!(matches!(err, BiomeCatalogError::DuplicateName(ref n) if n == "dup"));
        assert_eq!(catalog.len(), 1, "rejected biome must not be stored");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut catalog = BiomeCatalog::new();
        catalog.register(Biome::new(BiomeId(4), "a")).unwrap();
        let err = catalog.register(Biome::new(BiomeId(4), "b")).unwrap_err();
        assert!(matches!(err, BiomeCatalogError::DuplicateId(4)));
        assert!(catalog.lookup_by_name("b").is_none());
    }

    #[test]
    fn test_iteration_follows_registration_order() {
        let catalog = BiomeCatalog::from_biomes([
            Biome::new(BiomeId(5), "e"),
            Biome::new(BiomeId(1), "a"),
            Biome::new(BiomeId(3), "c"),
        ])
        .unwrap();
        let ids: Vec<u16> = catalog.iter().map(|b| b.id().0).collect();
        assert_eq!(ids, vec![5, 1, 3]);
    }

    #[test]
    fn test_ron_round_trip_preserves_default_catalog() {
        let catalog = default_catalog();
        let text = catalog.to_ron_string().unwrap();
        let parsed = BiomeCatalog::from_ron_str(&text).unwrap();
        assert_eq!(parsed.len(), catalog.len());
        for (a, b) in catalog.iter().zip(parsed.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("biomes.ron");
        let mut catalog = BiomeCatalog::new();
        let mut biome = Biome::new(BiomeId(2), "dunes");
        biome.set_tile_weight(TileType::Sand, 4.0);
        catalog.register(biome).unwrap();

        catalog.save(&path).unwrap();
        let loaded = BiomeCatalog::load(&path).unwrap();
        let dunes = loaded.lookup_by_name("dunes").unwrap();
        assert_eq!(dunes.tile_weights()[&TileType::Sand], 4.0);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BiomeCatalog::load(&dir.path().join("absent.ron")).unwrap_err();
        assert!(matches!(err, BiomeCatalogError::Read(_)));
    }

    #[test]
    fn test_malformed_ron_is_parse_error() {
        let err = BiomeCatalog::from_ron_str("[ (id: ").unwrap_err();
        assert!(matches!(err, BiomeCatalogError::Parse(_)));
    }
}
