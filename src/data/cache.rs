use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::Result;

use super::loader::load_datasets;
use super::model::Datasets;

/// Identity of one input file: its path plus what the filesystem says about it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    path: PathBuf,
    len: Option<u64>,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    fn probe(path: &Path) -> Self {
        let meta = std::fs::metadata(path).ok();
        Fingerprint {
            path: path.to_path_buf(),
            len: meta.as_ref().map(|m| m.len()),
            modified: meta.and_then(|m| m.modified().ok()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceKey {
    daily: Fingerprint,
    hourly: Fingerprint,
}

impl SourceKey {
    fn probe(daily: &Path, hourly: &Path) -> Self {
        SourceKey {
            daily: Fingerprint::probe(daily),
            hourly: Fingerprint::probe(hourly),
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetCache
// ---------------------------------------------------------------------------

/// Memoised load of the two input tables.
///
/// The entry is keyed by both files' path, size and modification time, so a
/// file that changes on disk (or a different path) is reloaded on the next
/// request. [`DatasetCache::invalidate`] drops the entry unconditionally.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(SourceKey, Arc<Datasets>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached tables for these sources, loading them if needed.
    pub fn get_or_load(&mut self, daily: &Path, hourly: &Path) -> Result<Arc<Datasets>> {
        self.get_or_load_with(daily, hourly, load_datasets)
    }

    /// Same as [`DatasetCache::get_or_load`] with an explicit load function.
    pub fn get_or_load_with<F>(&mut self, daily: &Path, hourly: &Path, load: F) -> Result<Arc<Datasets>>
    where
        F: FnOnce(&Path, &Path) -> Result<Datasets>,
    {
        let key = SourceKey::probe(daily, hourly);
        if let Some((cached_key, datasets)) = &self.entry {
            if *cached_key == key {
                log::debug!("Dataset cache hit for {}", daily.display());
                return Ok(Arc::clone(datasets));
            }
            log::info!("Input files changed, reloading");
        }

        self.entry = None;
        let datasets = Arc::new(load(daily, hourly)?);
        self.entry = Some((key, Arc::clone(&datasets)));
        Ok(datasets)
    }

    /// Drop the cached tables; the next request reloads from disk.
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            log::info!("Dataset cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const DAILY: &str = "date,ridership\n2024-01-01,10\n2024-02-01,20\n";
    const HOURLY: &str = "hour,day_type,line_tag,ridership\n8,Weekday,A,5\n";

    fn fixture() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let daily = dir.path().join("daily.csv");
        let hourly = dir.path().join("hourly.csv");
        std::fs::write(&daily, DAILY).unwrap();
        std::fs::write(&hourly, HOURLY).unwrap();
        (dir, daily, hourly)
    }

    fn counting_load(calls: &Cell<usize>) -> impl FnOnce(&Path, &Path) -> Result<Datasets> + '_ {
        move |d: &Path, h: &Path| {
            calls.set(calls.get() + 1);
            load_datasets(d, h)
        }
    }

    #[test]
    fn test_second_request_is_served_from_cache() {
        let (_dir, daily, hourly) = fixture();
        let calls = Cell::new(0);
        let mut cache = DatasetCache::new();

        let first = cache.get_or_load_with(&daily, &hourly, counting_load(&calls)).unwrap();
        let second = cache.get_or_load_with(&daily, &hourly, counting_load(&calls)).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_changed_file_forces_reload() {
        let (_dir, daily, hourly) = fixture();
        let calls = Cell::new(0);
        let mut cache = DatasetCache::new();

        cache.get_or_load_with(&daily, &hourly, counting_load(&calls)).unwrap();
        std::fs::write(&daily, format!("{DAILY}2024-03-01,30\n")).unwrap();
        let reloaded = cache.get_or_load_with(&daily, &hourly, counting_load(&calls)).unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(reloaded.daily.records.len(), 3);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let (_dir, daily, hourly) = fixture();
        let calls = Cell::new(0);
        let mut cache = DatasetCache::new();

        cache.get_or_load_with(&daily, &hourly, counting_load(&calls)).unwrap();
        cache.invalidate();
        assert!(cache.entry.is_none());
        cache.get_or_load_with(&daily, &hourly, counting_load(&calls)).unwrap();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_failed_load_leaves_cache_empty() {
        let (dir, daily, _hourly) = fixture();
        let mut cache = DatasetCache::new();
        let missing = dir.path().join("nope.csv");

        assert!(cache.get_or_load(&daily, &missing).is_err());
        assert!(cache.entry.is_none());
    }
}
