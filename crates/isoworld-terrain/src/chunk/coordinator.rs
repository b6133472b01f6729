//! Streams terrain synthesis over a worker pool, one chunk at a time.
//!
//! The coordinator claims each [`ChunkCoordinate`] at most once in a
//! concurrent state map, then either generates it on the calling thread or
//! queues it for the `chunk-gen-worker` threads. Every chunk is synthesized by
//! a fresh [`TerrainSynthesizer`] built from immutable, shared parameters, so
//! the result depends only on the planet parameters and the coordinate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, unbounded};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use isoworld_grid::{Grid, SharedGrid};

use super::{ChunkCoordinate, ChunkState, chunk_to_tile, tile_to_chunk};
use crate::biome::BiomeCatalog;
use crate::params::GenerationParameters;
use crate::seed::{ChunkSeeding, derive_chunk_seed};
use crate::synthesizer::TerrainSynthesizer;

/// Settings for a [`ChunkCoordinator`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkCoordinatorConfig {
    /// Side length of a chunk in tiles. Zero is treated as one.
    pub chunk_size: usize,
    /// Background worker threads. Zero generates every chunk on the caller.
    pub worker_threads: usize,
    /// How many of the nearest new chunks per visible-area update are
    /// generated synchronously before the call returns.
    pub immediate_chunks: usize,
    /// How each chunk's seed is derived from the planet seed.
    pub seeding: ChunkSeeding,
}

impl Default for ChunkCoordinatorConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            worker_threads: num_cpus::get(),
            immediate_chunks: 1,
            seeding: ChunkSeeding::Mixed,
        }
    }
}

enum WorkerMessage {
    Generate { coord: ChunkCoordinate, grid: SharedGrid },
    Shutdown,
}

/// State shared between the coordinator and its workers.
struct ChunkContext {
    chunk_size: usize,
    params: GenerationParameters,
    catalog: Arc<BiomeCatalog>,
    seeding: ChunkSeeding,
    states: DashMap<ChunkCoordinate, ChunkState>,
    in_flight: AtomicUsize,
}

impl ChunkContext {
    /// Synthesizes one chunk into a private grid and merges it into `grid`.
    fn generate(&self, grid: &SharedGrid, coord: ChunkCoordinate) {
        let seed = derive_chunk_seed(self.params.seed, coord, self.seeding);
        let params = GenerationParameters {
            seed,
            ..self.params.clone()
        };
        let mut local = Grid::new(self.chunk_size, self.chunk_size);
        let mut synthesizer = TerrainSynthesizer::new(params, Arc::clone(&self.catalog));
        match synthesizer.generate(&mut local, self.params.mode) {
            Ok(report) => tracing::debug!(
                chunk_x = coord.x,
                chunk_y = coord.y,
                seed,
                rivers = report.rivers,
                pois = report.points_of_interest,
                "Chunk synthesized"
            ),
            Err(err) => tracing::warn!(chunk_x = coord.x, chunk_y = coord.y, %err, "Chunk synthesis failed"),
        }

        let (origin_x, origin_y) = chunk_to_tile(coord, self.chunk_size);
        {
            // A poisoned lock only means another writer panicked mid-merge; the
            // grid itself is still a valid grid.
            let mut shared = grid.write().unwrap_or_else(PoisonError::into_inner);
            for (lx, ly, tile) in local.iter() {
                if let Some(dst) = shared.tile_mut(origin_x + lx as i64, origin_y + ly as i64) {
                    dst.clone_from(tile);
                }
            }
        }

        self.states.insert(coord, ChunkState::Complete);
    }
}

/// Partitions the world into chunks and generates them on demand.
pub struct ChunkCoordinator {
    context: Arc<ChunkContext>,
    immediate_chunks: usize,
    task_sender: Sender<WorkerMessage>,
    task_receiver: Receiver<WorkerMessage>,
    workers: Vec<JoinHandle<()>>,
}

impl ChunkCoordinator {
    pub fn new(params: GenerationParameters, catalog: Arc<BiomeCatalog>, config: ChunkCoordinatorConfig) -> Self {
        let (task_sender, task_receiver) = unbounded();
        let context = Arc::new(ChunkContext {
            chunk_size: config.chunk_size.max(1),
            params: params.sanitized(),
            catalog,
            seeding: config.seeding,
            states: DashMap::new(),
            in_flight: AtomicUsize::new(0),
        });

        let mut coordinator = Self {
            context,
            immediate_chunks: config.immediate_chunks,
            task_sender,
            task_receiver,
            workers: Vec::new(),
        };
        coordinator.spawn_workers(config.worker_threads);
        tracing::info!(
            chunk_size = coordinator.context.chunk_size,
            workers = coordinator.workers.len(),
            seeding = ?coordinator.context.seeding,
            "Chunk coordinator started"
        );
        coordinator
    }

    pub fn chunk_size(&self) -> usize {
        self.context.chunk_size
    }

    pub fn params(&self) -> &GenerationParameters {
        &self.context.params
    }

    /// Requests every chunk within `radius` tiles (plus one chunk of margin)
    /// of the tile `(center_x, center_y)`, nearest first.
    ///
    /// The nearest `immediate_chunks` new chunks are generated before this
    /// returns; the rest are queued. Returns the number of newly requested chunks.
    pub fn update_visible_area(&self, grid: &SharedGrid, center_x: i64, center_y: i64, radius: u32) -> usize {
        let size = self.context.chunk_size;
        let center = tile_to_chunk(center_x, center_y, size);
        let chunk_radius = (radius as usize).div_ceil(size) as i64 + 1;

        let mut candidates = Vec::new();
        for cy in center.y - chunk_radius..=center.y + chunk_radius {
            for cx in center.x - chunk_radius..=center.x + chunk_radius {
                let coord = ChunkCoordinate::new(cx, cy);
                if !self.context.states.contains_key(&coord) {
                    candidates.push(coord);
                }
            }
        }
        candidates.sort_by_key(|c| c.distance_squared(center));

        let mut requested = 0;
        for (i, coord) in candidates.into_iter().enumerate() {
            if self.generate_chunk(grid, coord, i < self.immediate_chunks) {
                requested += 1;
            }
        }
        tracing::debug!(center_x, center_y, radius, chunk_radius, requested, "Visible area updated");
        requested
    }

    /// Claims `coord` and generates it, inline if `immediate` (or if there are
    /// no workers) and on the pool otherwise.
    ///
    /// Returns `false` without doing anything if the chunk was already claimed.
    pub fn generate_chunk(&self, grid: &SharedGrid, coord: ChunkCoordinate, immediate: bool) -> bool {
        match self.context.states.entry(coord) {
            Entry::Occupied(_) => return false,
            Entry::Vacant(slot) => {
                slot.insert(ChunkState::InProgress);
            }
        }

        if immediate || self.workers.is_empty() {
            self.context.generate(grid, coord);
            return true;
        }

        self.context.in_flight.fetch_add(1, Ordering::Relaxed);
        let message = WorkerMessage::Generate {
            coord,
            grid: Arc::clone(grid),
        };
        if let Err(err) = self.task_sender.send(message) {
            // Unreachable while `task_receiver` is held, but never strand a claim.
            self.context.in_flight.fetch_sub(1, Ordering::Relaxed);
            if let WorkerMessage::Generate { coord, grid } = err.into_inner() {
                self.context.generate(&grid, coord);
            }
        }
        true
    }

    pub fn is_chunk_generated(&self, cx: i64, cy: i64) -> bool {
        self.chunk_state(ChunkCoordinate::new(cx, cy)) == ChunkState::Complete
    }

    pub fn chunk_state(&self, coord: ChunkCoordinate) -> ChunkState {
        self.context
            .states
            .get(&coord)
            .map(|state| *state)
            .unwrap_or_default()
    }

    /// Number of chunks whose generation has completed.
    pub fn generated_chunk_count(&self) -> usize {
        self.context
            .states
            .iter()
            .filter(|entry| *entry.value() == ChunkState::Complete)
            .count()
    }

    /// Chunks queued for or running on a worker.
    pub fn in_flight_count(&self) -> usize {
        self.context.in_flight.load(Ordering::Relaxed)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stops and joins every worker, then starts `count` new ones.
    ///
    /// Queued chunks ahead of the stop messages are still generated, so no
    /// claimed chunk is left in progress.
    pub fn resize_workers(&mut self, count: usize) {
        self.shutdown_workers();
        self.spawn_workers(count);
        tracing::info!(workers = self.workers.len(), "Chunk worker pool resized");
    }

    fn spawn_workers(&mut self, count: usize) {
        for _ in 0..count {
            let receiver = self.task_receiver.clone();
            let context = Arc::clone(&self.context);
            let spawned = std::thread::Builder::new()
                .name("chunk-gen-worker".into())
                .spawn(move || worker_loop(&receiver, &context));
            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(err) => tracing::error!(%err, "Failed to spawn chunk generation worker"),
            }
        }
    }

    fn shutdown_workers(&mut self) {
        for _ in 0..self.workers.len() {
            if self.task_sender.send(WorkerMessage::Shutdown).is_err() {
                break;
            }
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("Chunk generation worker panicked");
            }
        }
    }
}

impl Drop for ChunkCoordinator {
    fn drop(&mut self) {
        self.shutdown_workers();
    }
}

fn worker_loop(receiver: &Receiver<WorkerMessage>, context: &ChunkContext) {
    while let Ok(message) = receiver.recv() {
        match message {
            WorkerMessage::Generate { coord, grid } => {
                context.generate(&grid, coord);
                context.in_flight.fetch_sub(1, Ordering::Relaxed);
            }
            WorkerMessage::Shutdown => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::biome::default_catalog;
    use isoworld_grid::TileType;

    fn coordinator(workers: usize) -> ChunkCoordinator {
        ChunkCoordinator::new(
            GenerationParameters::with_seed(1234),
            Arc::new(default_catalog()),
            ChunkCoordinatorConfig {
                chunk_size: 8,
                worker_threads: workers,
                immediate_chunks: 1,
                seeding: ChunkSeeding::Mixed,
            },
        )
    }

    fn wait_for(coordinator: &ChunkCoordinator, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(30);
        while coordinator.generated_chunk_count() < count && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_generate_chunk_is_idempotent() {
        let coordinator = coordinator(0);
        let grid = Grid::new(16, 16).into_shared();
        let coord = ChunkCoordinate::new(1, 1);

        assert_eq!(coordinator.chunk_state(coord), ChunkState::NotStarted);
        assert!(coordinator.generate_chunk(&grid, coord, true));
        assert_eq!(coordinator.chunk_state(coord), ChunkState::Complete);
        let snapshot = grid.read().unwrap().clone();

        assert!(!coordinator.generate_chunk(&grid, coord, true), "second request must be a no-op");
        assert_eq!(coordinator.generated_chunk_count(), 1);
        assert_eq!(*grid.read().unwrap(), snapshot);
    }

    #[test]
    fn test_chunk_matches_direct_synthesis() {
        let coordinator = coordinator(0);
        let grid = Grid::new(16, 16).into_shared();
        let coord = ChunkCoordinate::new(1, 0);
        coordinator.generate_chunk(&grid, coord, true);

        let seed = derive_chunk_seed(1234, coord, ChunkSeeding::Mixed);
        let mut expected = Grid::new(8, 8);
        TerrainSynthesizer::new(GenerationParameters::with_seed(seed), Arc::new(default_catalog()))
            .generate(&mut expected, coordinator.params().mode)
            .unwrap();

        let shared = grid.read().unwrap();
        for (x, y, tile) in expected.iter() {
            assert_eq!(
                shared.tile(8 + x as i64, y as i64),
                Some(tile),
                "tile ({x}, {y}) differs from direct synthesis"
            );
        }
        // Neighbouring chunk untouched.
        assert_eq!(shared.tile_type(0, 0), Some(TileType::Empty));
    }

    #[test]
    fn test_out_of_bounds_chunk_completes_without_writes() {
        let coordinator = coordinator(0);
        let grid = Grid::new(8, 8).into_shared();
        coordinator.generate_chunk(&grid, ChunkCoordinate::new(-3, 5), true);
        assert!(coordinator.is_chunk_generated(-3, 5));
        assert!(grid.read().unwrap().tiles().iter().all(|t| t.kind() == TileType::Empty));
    }

    #[test]
    fn test_worker_pool_fills_visible_area() {
        let coordinator = coordinator(3);
        assert_eq!(coordinator.worker_count(), 3);
        let grid = Grid::new(40, 40).into_shared();

        // radius 16 with chunk size 8 → chunk radius 3 → 7×7 chunks.
        let requested = coordinator.update_visible_area(&grid, 20, 20, 16);
        assert_eq!(requested, 49);
        assert!(coordinator.is_chunk_generated(2, 2), "center chunk must be generated synchronously");

        wait_for(&coordinator, 49);
        assert_eq!(coordinator.generated_chunk_count(), 49);
        assert_eq!(coordinator.in_flight_count(), 0);
        assert!(
            grid.read().unwrap().tiles().iter().all(|t| t.kind() != TileType::Empty),
            "every in-bounds tile should be generated"
        );
    }

    #[test]
    fn test_repeated_update_requests_nothing_new() {
        let coordinator = coordinator(2);
        let grid = Grid::new(32, 32).into_shared();
        let first = coordinator.update_visible_area(&grid, 0, 0, 8);
        let second = coordinator.update_visible_area(&grid, 0, 0, 8);
        assert!(first > 0);
        assert_eq!(second, 0);
        wait_for(&coordinator, first);
        assert_eq!(coordinator.generated_chunk_count(), first);
    }

    #[test]
    fn test_zero_workers_generate_inline() {
        let coordinator = coordinator(0);
        let grid = Grid::new(24, 24).into_shared();
        let requested = coordinator.update_visible_area(&grid, 12, 12, 4);
        assert_eq!(coordinator.generated_chunk_count(), requested);
        assert_eq!(coordinator.in_flight_count(), 0);
    }

    #[test]
    fn test_resize_workers() {
        let mut coordinator = coordinator(1);
        coordinator.resize_workers(4);
        assert_eq!(coordinator.worker_count(), 4);

        let grid = Grid::new(16, 16).into_shared();
        coordinator.generate_chunk(&grid, ChunkCoordinate::new(0, 0), false);
        coordinator.resize_workers(0);
        assert_eq!(coordinator.worker_count(), 0);
        // Queued work drains before the old workers stop.
        assert!(coordinator.is_chunk_generated(0, 0));

        coordinator.generate_chunk(&grid, ChunkCoordinate::new(1, 0), false);
        assert!(coordinator.is_chunk_generated(1, 0));
    }

    #[test]
    fn test_drop_joins_workers_with_pending_work() {
        let coordinator = coordinator(2);
        let grid = Grid::new(8, 8).into_shared();
        for x in 0..20 {
            coordinator.generate_chunk(&grid, ChunkCoordinate::new(x, 7), false);
        }
        drop(coordinator);
    }
}
