//! Lazily loaded reference datasets.
//!
//! Each store owns one `LazyDataset` slot. The slot runs its loader at most
//! once to completion: concurrent first callers serialise on a mutex and the
//! losers reuse the winner's result. A loader that fails publishes nothing,
//! leaving the slot `NotLoaded` for the next call to retry.

pub mod coastline;
pub mod water;

pub use coastline::{CoastlineBoundary, CoastlineStore};
pub use water::{SpatialIndex, WaterFeatureSet, WaterMatch, WaterNetwork, WaterNetworkIndex};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use parking_lot::Mutex;

use crate::models::types::{Dataset, DatasetState, Result};

pub struct LazyDataset<T> {
    dataset: Dataset,
    value: OnceLock<T>,
    load_lock: Mutex<()>,
    loading: AtomicBool,
    loads: AtomicUsize,
}

impl<T> LazyDataset<T> {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            value: OnceLock::new(),
            load_lock: Mutex::new(()),
            loading: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn state(&self) -> DatasetState {
        if self.value.get().is_some() {
            DatasetState::Loaded
        } else if self.loading.load(Ordering::Acquire) {
            DatasetState::Loading
        } else {
            DatasetState::NotLoaded
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Successful loads so far; never exceeds one
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Acquire)
    }

    pub fn get_or_load(&self, load: impl FnOnce() -> Result<T>) -> Result<&T> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let _guard = self.load_lock.lock();

        // Another caller may have finished while we waited
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        self.loading.store(true, Ordering::Release);
        let loading = LoadingFlag(&self.loading);
        let started = Instant::now();
        log::info!("Loading {} dataset", self.dataset);

        let result = load();
        drop(loading);

        match result {
            Ok(value) => {
                self.loads.fetch_add(1, Ordering::AcqRel);
                log::info!("Loaded {} dataset in {:.2?}", self.dataset, started.elapsed());
                Ok(self.value.get_or_init(|| value))
            }
            Err(e) => {
                log::error!("Failed to load {} dataset: {}", self.dataset, e);
                Err(e)
            }
        }
    }
}

/// Clears the loading flag even when the loader unwinds
struct LoadingFlag<'a>(&'a AtomicBool);

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::DistanceError;

    #[test]
    fn test_loads_once() {
        let slot = LazyDataset::new(Dataset::Coastline);
        assert_eq!(slot.state(), DatasetState::NotLoaded);

        let first = slot.get_or_load(|| Ok(vec![1, 2, 3])).unwrap() as *const Vec<i32>;
        let second = slot
            .get_or_load(|| panic!("loader must not run twice"))
            .unwrap() as *const Vec<i32>;

        assert_eq!(first, second);
        assert_eq!(slot.state(), DatasetState::Loaded);
        assert_eq!(slot.load_count(), 1);
    }

    #[test]
    fn test_failed_load_can_retry() {
        let slot: LazyDataset<u32> = LazyDataset::new(Dataset::WaterLines);

        let err = slot
            .get_or_load(|| Err(DistanceError::unavailable(Dataset::WaterLines, "/x", "missing")))
            .unwrap_err();
        assert!(err.is_data_unavailable());
        assert_eq!(slot.state(), DatasetState::NotLoaded);
        assert!(slot.get().is_none());

        assert_eq!(*slot.get_or_load(|| Ok(7)).unwrap(), 7);
        assert_eq!(slot.state(), DatasetState::Loaded);
        assert_eq!(slot.load_count(), 1);
    }

    #[test]
    fn test_panicking_loader_leaves_not_loaded() {
        let slot: LazyDataset<u32> = LazyDataset::new(Dataset::Coastline);

        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = slot.get_or_load(|| panic!("loader failed"));
        }));
        assert!(unwound.is_err());
        assert_eq!(slot.state(), DatasetState::NotLoaded);
        assert_eq!(slot.load_count(), 0);

        assert_eq!(*slot.get_or_load(|| Ok(3)).unwrap(), 3);
        assert_eq!(slot.state(), DatasetState::Loaded);
    }

    #[test]
    fn test_state_is_loading_inside_loader() {
        let slot: LazyDataset<DatasetState> = LazyDataset::new(Dataset::Coastline);

        let seen = *slot.get_or_load(|| Ok(slot.state())).unwrap();
        assert_eq!(seen, DatasetState::Loading);
    }

    #[test]
    fn test_concurrent_first_calls_load_once() {
        let slot: LazyDataset<u64> = LazyDataset::new(Dataset::WaterLines);
        let runs = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let value = slot
                        .get_or_load(|| {
                            runs.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(20));
                            Ok(42)
                        })
                        .unwrap();
                    assert_eq!(*value, 42);
                });
            }
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(slot.load_count(), 1);
    }
}
