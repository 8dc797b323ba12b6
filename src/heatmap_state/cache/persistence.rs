//! On-disk layout: `<root>/<world identity>/slot_<n>.json`, each file holding
//! `{ "<dimension id>": { "<x>,<z>": <count> } }`. Files are rewritten whole on every
//! save through a `.tmp` sibling and a rename.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;

use super::{DensityCache, DimensionCounts};
use crate::heatmap_state::{
    coordinates::{ChunkKey, DimensionId},
    host::WorldIdentity,
    slot::SlotIndex,
};

/// Failures while reading or writing a cache file.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Directory creation, read, write, rename or delete failed.
    #[error("cache I/O failed for {path}: {source}")]
    Io {
        /// The file or directory being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file exists but is not a valid cache document.
    #[error("cache file {path} is malformed: {source}")]
    Malformed {
        /// The offending file.
        path: PathBuf,
        /// The parse error.
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    fn io(path: &Path, source: io::Error) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads and writes per-(world, slot) cache files under a fixed root directory.
pub struct CacheStore {
    root: PathBuf,
    load_failures: HashSet<PathBuf>,
}

impl CacheStore {
    /// Creates a store rooted at `root`. Nothing is created on disk until the first
    /// save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            load_failures: HashSet::new(),
        }
    }

    /// The cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every slot file of one world.
    pub fn world_dir(&self, world: &WorldIdentity) -> PathBuf {
        self.root.join(world.as_str())
    }

    /// Path of the cache file for `(world, slot)`.
    pub fn slot_file_path(&self, world: &WorldIdentity, slot: SlotIndex) -> PathBuf {
        self.world_dir(world)
            .join(format!("slot_{}.json", slot.number()))
    }

    /// Loads the cache for `(world, slot)`.
    ///
    /// A missing file is an empty cache, not an error.
    ///
    /// # Errors
    /// [`CacheError::Io`] if the file exists but cannot be read, [`CacheError::Malformed`]
    /// if its contents are not a cache document.
    pub fn try_load(
        &self,
        world: &WorldIdentity,
        slot: SlotIndex,
    ) -> Result<DensityCache, CacheError> {
        let path = self.slot_file_path(world, slot);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(DensityCache::default())
            }
            Err(error) => return Err(CacheError::io(&path, error)),
        };

        let dimensions: HashMap<DimensionId, DimensionCounts> =
            serde_json::from_reader(BufReader::new(file))
                .map_err(|source| CacheError::Malformed { path, source })?;

        Ok(DensityCache::from_dimensions(dimensions))
    }

    /// Loads the cache for `(world, slot)`, degrading every failure to an empty cache.
    ///
    /// The first failure for a given file is logged as a warning and remembered; later
    /// failures for the same file are only logged at debug level.
    pub fn load(&mut self, world: &WorldIdentity, slot: SlotIndex) -> DensityCache {
        match self.try_load(world, slot) {
            Ok(cache) => {
                if !cache.is_empty() {
                    log::info!(
                        "Loaded slot {} cache for world {} ({} chunks in {} dimensions)",
                        slot,
                        world,
                        cache.total_chunks(),
                        cache.dimensions().len()
                    );
                }
                cache
            }
            Err(error) => {
                let path = self.slot_file_path(world, slot);
                if self.load_failures.insert(path) {
                    log::warn!("Starting slot {} with an empty cache: {}", slot, error);
                } else {
                    log::debug!("Cache load failed again: {}", error);
                }
                DensityCache::default()
            }
        }
    }

    /// Returns `true` if loading `(world, slot)` has failed at least once.
    pub fn load_failed(&self, world: &WorldIdentity, slot: SlotIndex) -> bool {
        self.load_failures
            .contains(&self.slot_file_path(world, slot))
    }

    /// Writes every dimension of `cache` to the `(world, slot)` file.
    ///
    /// An empty cache is not written. Returns whether a file was written.
    ///
    /// # Errors
    /// [`CacheError::Io`] if the directory or file cannot be written.
    pub fn save(
        &self,
        world: &WorldIdentity,
        slot: SlotIndex,
        cache: &DensityCache,
    ) -> Result<bool, CacheError> {
        if cache.is_empty() {
            log::debug!("Slot {} cache is empty, skipping save", slot);
            return Ok(false);
        }

        let document: BTreeMap<&DimensionId, BTreeMap<ChunkKey, u32>> = cache
            .dimensions()
            .iter()
            .filter(|(_, counts)| !counts.is_empty())
            .map(|(dimension, counts)| {
                let sorted = counts.iter().map(|(key, count)| (*key, *count)).collect();
                (dimension, sorted)
            })
            .collect();

        let dir = self.world_dir(world);
        fs::create_dir_all(&dir).map_err(|error| CacheError::io(&dir, error))?;

        let final_path = self.slot_file_path(world, slot);
        let tmp_path = final_path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path).map_err(|error| CacheError::io(&tmp_path, error))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &document)
                .map_err(|error| CacheError::io(&tmp_path, io::Error::from(error)))?;
            writer
                .flush()
                .map_err(|error| CacheError::io(&tmp_path, error))?;
        }
        fs::rename(&tmp_path, &final_path).map_err(|error| CacheError::io(&final_path, error))?;

        log::debug!("Saved slot {} cache for world {}", slot, world);
        Ok(true)
    }

    /// Removes the `(world, slot)` file. A missing file is not an error.
    ///
    /// # Errors
    /// [`CacheError::Io`] if the file exists but cannot be removed.
    pub fn delete(&mut self, world: &WorldIdentity, slot: SlotIndex) -> Result<(), CacheError> {
        let path = self.slot_file_path(world, slot);
        self.load_failures.remove(&path);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Deleted slot {} cache file for world {}", slot, world);
                Ok(())
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(CacheError::io(&path, error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(n: u8) -> SlotIndex {
        SlotIndex::new(n).unwrap()
    }

    #[test]
    fn slot_files_are_namespaced_by_world() {
        let store = CacheStore::new("cache_root");
        let world = WorldIdentity::new("local_New_World");

        assert_eq!(
            store.slot_file_path(&world, slot(3)),
            Path::new("cache_root").join("local_New_World").join("slot_3.json")
        );
    }

    #[test]
    fn save_writes_the_documented_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let world = WorldIdentity::new("local_test");
        let overworld = DimensionId::new("minecraft:overworld");

        let mut cache = DensityCache::default();
        cache.insert(&overworld, ChunkKey::new(0, 0), 7);
        cache.insert(&overworld, ChunkKey::new(-2, 3), 1);

        assert!(store.save(&world, slot(1), &cache).unwrap());

        let written = fs::read_to_string(store.slot_file_path(&world, slot(1))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "minecraft:overworld": { "0,0": 7, "-2,3": 1 } })
        );
        assert!(!store
            .slot_file_path(&world, slot(1))
            .with_extension("json.tmp")
            .exists());
    }

    #[test]
    fn empty_cache_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("nested"));
        let world = WorldIdentity::new("local_test");

        assert!(!store.save(&world, slot(2), &DensityCache::default()).unwrap());
        assert!(!store.world_dir(&world).exists());
    }

    #[test]
    fn delete_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CacheStore::new(dir.path());
        let world = WorldIdentity::new("server_127_0_0_1");

        assert!(store.delete(&world, slot(5)).is_ok());
    }

    #[test]
    fn malformed_counts_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let world = WorldIdentity::new("local_test");
        let path = store.slot_file_path(&world, slot(1));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"minecraft:overworld":{"0,0":-3}}"#).unwrap();

        assert!(matches!(
            store.try_load(&world, slot(1)),
            Err(CacheError::Malformed { .. })
        ));
    }
}
