//! Collection manager: the single entry point for reading and changing the catalog
//!
//! Every mutation is re-validated against the record store and followed by a
//! write of the affected collection. A failed write is logged and remembered;
//! the in-memory state stays authoritative and [`CollectionManager::flush`]
//! retries it.

mod fetch;

pub use fetch::FetchQuery;

use crate::error::CatalogError;
use crate::filter::{evaluate, Predicate};
use crate::store::RecordStore;
use crate::watchlist::{watchlist_name_from_path, Watchlist};
use media_catalog_config::{Config, PathManager};
use media_catalog_models::{Format, MediaRecord};
use media_catalog_sources::{read_records_with_format, write_records_to_file_with_format, MetadataFetcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Watchlist files are always stored as JSON
const WATCHLIST_FORMAT: Format = Format::Json;

/// Which collection a query runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionTarget {
    Source,
    Watchlist(usize),
}

pub struct CollectionManager {
    store: RecordStore,
    watchlists: Vec<Watchlist>,
    /// Names of watchlists whose last write failed
    pending_writes: HashSet<String>,
    active_filter: Option<Vec<Predicate>>,
    paths: PathManager,
    archive_dir: Option<PathBuf>,
    fetcher: Option<Box<dyn MetadataFetcher>>,
    fetch_timeout: Duration,
}

impl CollectionManager {
    /// Load the catalog and every watchlist under the configured data directory
    ///
    /// A watchlist file that cannot be read is skipped; a source file that
    /// cannot be read is an error.
    pub fn open(config: &Config, paths: PathManager) -> Result<Self, CatalogError> {
        let paths = config.paths(paths);
        let format = config.storage.source_format;
        let mut store = RecordStore::load(paths.source_file(format), format)?;

        let mut watchlists: Vec<Watchlist> = Vec::new();
        let mut inserted = 0;
        for path in scan_watchlist_files(&paths.watchlist_dir()) {
            match Watchlist::load(&path, &mut store) {
                Ok((watchlist, new_records)) => {
                    if watchlists.iter().any(|w| w.name() == watchlist.name()) {
                        warn!("Skipping {}: duplicate watchlist name '{}'", path.display(), watchlist.name());
                        continue;
                    }
                    inserted += new_records;
                    watchlists.push(watchlist);
                }
                Err(e) => warn!("Skipping watchlist {}: {}", path.display(), e),
            }
        }

        if inserted > 0 {
            info!("Watchlists added {} record(s) missing from the catalog", inserted);
            if let Err(e) = store.persist() {
                warn!("Failed to save catalog: {}", e);
            }
        }

        info!(
            "Opened catalog with {} records and {} watchlist(s)",
            store.len(),
            watchlists.len()
        );

        Ok(Self {
            store,
            watchlists,
            pending_writes: HashSet::new(),
            active_filter: None,
            paths,
            archive_dir: config.storage.archive_dir.clone(),
            fetcher: None,
            fetch_timeout: Duration::from_secs(config.fetch.timeout_secs),
        })
    }

    /// Attach the metadata source used by the fetch operations
    pub fn with_fetcher(mut self, fetcher: Box<dyn MetadataFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn paths(&self) -> &PathManager {
        &self.paths
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn watchlist(&self, index: usize) -> Result<&Watchlist, CatalogError> {
        self.watchlists.get(index).ok_or(CatalogError::IndexOutOfRange {
            index,
            len: self.watchlists.len(),
        })
    }

    pub fn watchlist_count(&self) -> usize {
        self.watchlists.len()
    }

    pub fn watchlist_name(&self, index: usize) -> Result<&str, CatalogError> {
        self.watchlist(index).map(Watchlist::name)
    }

    pub fn watchlist_names(&self) -> Vec<&str> {
        self.watchlists.iter().map(Watchlist::name).collect()
    }

    pub fn find_watchlist(&self, name: &str) -> Option<usize> {
        self.watchlists.iter().position(|w| w.name() == name)
    }

    /// Indices of every watchlist that references `record`
    pub fn watchlists_containing(&self, record: &MediaRecord) -> Vec<usize> {
        self.watchlists
            .iter()
            .enumerate()
            .filter(|(_, w)| w.contains_identity(record))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn active_filter(&self) -> Option<&[Predicate]> {
        self.active_filter.as_deref()
    }

    /// Replace the active filter; an empty list clears it
    pub fn set_active_filter(&mut self, predicates: Vec<Predicate>) {
        self.active_filter = if predicates.is_empty() { None } else { Some(predicates) };
    }

    pub fn clear_active_filter(&mut self) {
        self.active_filter = None;
    }

    /// Records of `target`, filtered by `filter` or else by the active filter
    pub fn query<'a>(
        &'a self,
        target: CollectionTarget,
        filter: Option<&'a [Predicate]>,
    ) -> Result<Box<dyn Iterator<Item = &'a MediaRecord> + 'a>, CatalogError> {
        let base: Box<dyn Iterator<Item = &'a MediaRecord> + 'a> = match target {
            CollectionTarget::Source => Box::new(self.store.iter()),
            CollectionTarget::Watchlist(index) => Box::new(self.watchlist(index)?.all_records(&self.store)),
        };

        match filter.or(self.active_filter.as_deref()) {
            Some(predicates) if !predicates.is_empty() => Ok(Box::new(evaluate(predicates, base))),
            _ => Ok(base),
        }
    }

    /// Make `predicates` the active filter and return the matching records of `target`
    pub fn apply_filter(
        &mut self,
        target: CollectionTarget,
        predicates: Vec<Predicate>,
    ) -> Result<Vec<&MediaRecord>, CatalogError> {
        if let CollectionTarget::Watchlist(index) = target {
            self.check_index(index)?;
        }
        self.set_active_filter(predicates);
        Ok(self.query(target, None)?.collect())
    }

    fn check_index(&self, index: usize) -> Result<(), CatalogError> {
        self.watchlist(index).map(|_| ())
    }

    /// Canonical identity of `record`, which must already be stored
    fn resolve(&self, record: &MediaRecord) -> Result<String, CatalogError> {
        self.store
            .find_by_identity(record)
            .map(|r| r.imdb_id.clone())
            .ok_or_else(|| CatalogError::UnknownRecord(record.imdb_id.clone()))
    }

    pub fn add_to_watchlist(&mut self, record: &MediaRecord, index: usize) -> Result<bool, CatalogError> {
        self.check_index(index)?;
        let id = self.resolve(record)?;
        let canonical = self
            .store
            .get(&id)
            .ok_or_else(|| CatalogError::UnknownRecord(id.clone()))?;

        let added = self.watchlists[index].add_reference(canonical);
        if added {
            debug!("Added {} to watchlist '{}'", id, self.watchlists[index].name());
            self.persist_watchlist(index);
        }
        Ok(added)
    }

    /// Remove `record` from watchlist `index`; a record that is not a member is a no-op
    pub fn remove_from_watchlist(&mut self, record: &MediaRecord, index: usize) -> Result<bool, CatalogError> {
        self.check_index(index)?;
        let removed = self.watchlists[index].remove_reference(record);
        if removed {
            debug!("Removed {} from watchlist '{}'", record.identity(), self.watchlists[index].name());
            self.persist_watchlist(index);
        }
        Ok(removed)
    }

    /// Create an empty watchlist and return its index
    pub fn create_watchlist(&mut self, name: &str) -> Result<usize, CatalogError> {
        validate_name(name)?;
        if self.find_watchlist(name).is_some() {
            return Err(CatalogError::DuplicateName(name.to_string()));
        }

        self.watchlists.push(Watchlist::new(name));
        let index = self.watchlists.len() - 1;
        self.persist_watchlist(index);
        info!("Created watchlist '{}'", name);
        Ok(index)
    }

    /// Remove watchlist `index` and its file
    ///
    /// Later watchlists shift down by one. The catalog is not touched.
    pub fn delete_watchlist(&mut self, index: usize) -> Result<Watchlist, CatalogError> {
        self.check_index(index)?;
        let watchlist = self.watchlists.remove(index);
        self.pending_writes.remove(watchlist.name());

        if let Some(ref archive_dir) = self.archive_dir {
            let archive_path = archive_dir.join(format!("{}.{}", watchlist.name(), WATCHLIST_FORMAT.extension()));
            match watchlist.persist(&self.store, &archive_path, WATCHLIST_FORMAT) {
                Ok(()) => info!("Archived watchlist '{}' to {}", watchlist.name(), archive_path.display()),
                Err(e) => warn!("Failed to archive watchlist '{}': {}", watchlist.name(), e),
            }
        }

        let path = self.watchlist_path(watchlist.name());
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Failed to delete {}: {}", path.display(), e);
            }
        }

        info!("Deleted watchlist '{}'", watchlist.name());
        Ok(watchlist)
    }

    /// Create a watchlist from an external record file and return its index
    ///
    /// The watchlist is named after the file stem. Records already in the
    /// catalog are referenced; the others are added to it first.
    pub fn import_external(&mut self, path: &Path) -> Result<usize, CatalogError> {
        let format = Format::from_path(path)
            .filter(Format::is_readable)
            .ok_or_else(|| CatalogError::UnsupportedFormat(path.to_path_buf()))?;
        let name = watchlist_name_from_path(path).ok_or_else(|| CatalogError::InvalidName(path.display().to_string()))?;
        validate_name(&name)?;
        if self.find_watchlist(&name).is_some() {
            return Err(CatalogError::DuplicateName(name));
        }

        let records = read_records_with_format(path, format).map_err(|e| CatalogError::load(path, e))?;
        if records.is_empty() {
            return Err(CatalogError::EmptyImport(path.to_path_buf()));
        }

        let (watchlist, inserted) = Watchlist::from_records(name, records, &mut self.store);
        if inserted > 0 {
            self.persist_store();
        }

        info!(
            "Imported watchlist '{}' from {} ({} records, {} new to the catalog)",
            watchlist.name(),
            path.display(),
            watchlist.len(),
            inserted
        );
        self.watchlists.push(watchlist);
        let index = self.watchlists.len() - 1;
        self.persist_watchlist(index);
        Ok(index)
    }

    /// Write watchlist `index` to `path`, format taken from the extension
    pub fn export_watchlist(&self, index: usize, path: &Path) -> Result<(), CatalogError> {
        let watchlist = self.watchlist(index)?;
        let format = Format::from_path(path).ok_or_else(|| CatalogError::UnsupportedFormat(path.to_path_buf()))?;
        write_records_to_file_with_format(watchlist.all_records(&self.store), path, format)
            .map_err(|e| CatalogError::write(path, e))?;
        info!("Exported watchlist '{}' to {} ({})", watchlist.name(), path.display(), format);
        Ok(())
    }

    pub fn set_watched(&mut self, record: &MediaRecord, watched: bool) -> Result<(), CatalogError> {
        let id = self.resolve(record)?;
        self.store.mutate(&id, |r| r.watched = watched)?;
        debug!("Marked {} watched={}", id, watched);
        self.persist_store();
        Ok(())
    }

    pub fn set_my_rating(&mut self, record: &MediaRecord, rating: f64) -> Result<(), CatalogError> {
        let id = self.resolve(record)?;
        self.store.mutate(&id, |r| r.my_rating = Some(rating))?;
        debug!("Rated {} {}", id, rating);
        self.persist_store();
        Ok(())
    }

    /// True if some collection has changes that have not reached disk
    pub fn has_pending_writes(&self) -> bool {
        self.store.is_dirty() || !self.pending_writes.is_empty()
    }

    /// Retry every failed write; returns the first error
    pub fn flush(&mut self) -> Result<(), CatalogError> {
        let mut first_error = None;

        if self.store.is_dirty() {
            if let Err(e) = self.store.persist() {
                first_error = Some(e);
            }
        }

        let pending: Vec<usize> = self
            .watchlists
            .iter()
            .enumerate()
            .filter(|(_, w)| self.pending_writes.contains(w.name()))
            .map(|(i, _)| i)
            .collect();
        for index in pending {
            if let Err(e) = self.write_watchlist(index) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn watchlist_path(&self, name: &str) -> PathBuf {
        self.paths.watchlist_file(name)
    }

    fn write_watchlist(&mut self, index: usize) -> Result<(), CatalogError> {
        let watchlist = &self.watchlists[index];
        let path = self.watchlist_path(watchlist.name());
        match watchlist.persist(&self.store, &path, WATCHLIST_FORMAT) {
            Ok(()) => {
                self.pending_writes.remove(watchlist.name());
                Ok(())
            }
            Err(e) => {
                self.pending_writes.insert(watchlist.name().to_string());
                Err(e)
            }
        }
    }

    fn persist_watchlist(&mut self, index: usize) {
        if let Err(e) = self.write_watchlist(index) {
            warn!("Failed to save watchlist: {}", e);
        }
    }

    fn persist_store(&mut self) {
        if let Err(e) = self.store.persist() {
            warn!("Failed to save catalog: {}", e);
        }
    }
}

/// Watchlist names become file names, so they must be non-blank single path components
fn validate_name(name: &str) -> Result<(), CatalogError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed != name || trimmed == "." || trimmed == ".." || name.contains(|c| c == '/' || c == '\\') {
        return Err(CatalogError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// `.json` files directly under `dir`, sorted by file name
fn scan_watchlist_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("No watchlists loaded from {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
        .collect();
    files.sort();
    files
}
