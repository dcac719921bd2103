use std::path::PathBuf;
use std::sync::Arc;

use crate::color::ColorScale;
use crate::config::Sources;
use crate::data::cache::DatasetCache;
use crate::data::dashboard::{Dashboard, Selection};
use crate::data::model::Datasets;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Where the two tables are read from.
    pub sources: Sources,

    /// Memoised tables; cleared by *Reload*.
    cache: DatasetCache,

    /// Loaded tables (None until both files load).
    pub datasets: Option<Arc<Datasets>>,

    /// Current filter choices.
    pub selection: Option<Selection>,

    /// Outputs for `selection`, rebuilt on every change.
    pub dashboard: Option<Dashboard>,

    /// Heatmap colour scale.
    pub heat_scale: ColorScale,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(sources: Sources) -> Self {
        Self {
            sources,
            cache: DatasetCache::new(),
            datasets: None,
            selection: None,
            dashboard: None,
            heat_scale: ColorScale::yl_or_rd(),
            status_message: None,
        }
    }

    /// Fetch the tables for the current sources (from cache when unchanged).
    pub fn load(&mut self) {
        match self
            .cache
            .get_or_load(&self.sources.daily, &self.sources.hourly)
        {
            Ok(datasets) => self.set_datasets(datasets),
            Err(e) => {
                log::error!("Failed to load ridership data: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.datasets = None;
                self.selection = None;
                self.dashboard = None;
            }
        }
    }

    /// Drop the cache and read both files again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        self.load();
    }

    pub fn set_daily_source(&mut self, path: PathBuf) {
        self.sources.daily = path;
        self.load();
    }

    pub fn set_hourly_source(&mut self, path: PathBuf) {
        self.sources.hourly = path;
        self.load();
    }

    /// Ingest freshly loaded tables. Selections reset only when the tables
    /// actually changed.
    fn set_datasets(&mut self, datasets: Arc<Datasets>) {
        let unchanged = self
            .datasets
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &datasets));
        if !unchanged || self.selection.is_none() {
            self.selection = Some(Selection::defaults_for(&datasets));
        }
        self.datasets = Some(datasets);
        self.status_message = None;
        self.recompute();
    }

    /// Replace the selection and rebuild every output if it changed.
    pub fn set_selection(&mut self, selection: Selection) {
        if self.selection.as_ref() != Some(&selection) {
            self.selection = Some(selection);
            self.recompute();
        }
    }

    /// Run one full pass for the current selection.
    pub fn recompute(&mut self) {
        self.dashboard = match (&self.datasets, &self.selection) {
            (Some(ds), Some(sel)) => Some(Dashboard::compute(ds, sel)),
            _ => None,
        };
    }
}
