use crate::error::CatalogError;
use media_catalog_models::{Format, MediaRecord};
use media_catalog_sources::{read_records_from, read_records_with_format, write_records_to_file_with_format};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Catalog shipped with the binary, used when no source file exists yet
const SEED_CATALOG: &str = include_str!("../resources/source_bak.json");

/// Result of merging a candidate record into the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    /// A record with the same identity was already stored; the candidate was discarded
    Existing,
}

/// The canonical set of media records
///
/// Records keep insertion order; `by_id` maps an identity to its position in
/// `records`. Nothing is ever removed, so positions stay valid.
pub struct RecordStore {
    records: Vec<MediaRecord>,
    by_id: HashMap<String, usize>,
    path: PathBuf,
    format: Format,
    /// Set when in-memory state has not reached disk yet
    dirty: bool,
}

impl RecordStore {
    /// Empty store bound to `path`; nothing is read or written
    pub fn new(path: impl Into<PathBuf>, format: Format) -> Self {
        Self {
            records: Vec::new(),
            by_id: HashMap::new(),
            path: path.into(),
            format,
            dirty: false,
        }
    }

    /// Load the store from `path`, seeding it from the bundled catalog if the file is missing
    ///
    /// A file that exists but cannot be parsed is an error; it is never replaced by the seed.
    pub fn load(path: impl Into<PathBuf>, format: Format) -> Result<Self, CatalogError> {
        let path = path.into();
        let mut store = Self::new(&path, format);

        if !path.exists() {
            let seed = read_records_from(SEED_CATALOG.as_bytes(), Format::Json)
                .map_err(|e| CatalogError::load(&path, e))?;
            store.merge_all(seed);
            info!("No catalog at {}, seeded {} records", path.display(), store.len());
            if let Err(e) = store.persist() {
                warn!("Failed to write seeded catalog: {}", e);
            }
            return Ok(store);
        }

        let records = read_records_with_format(&path, format).map_err(|e| CatalogError::load(&path, e))?;
        let total = records.len();
        store.merge_all(records);
        if store.len() < total {
            warn!(
                "Catalog {} contains {} duplicate record(s), keeping the first of each",
                path.display(),
                total - store.len()
            );
        }
        store.dirty = false;

        info!("Loaded {} records from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// All records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &MediaRecord> + '_ {
        self.records.iter()
    }

    pub fn get(&self, imdb_id: &str) -> Option<&MediaRecord> {
        self.by_id.get(imdb_id).map(|&i| &self.records[i])
    }

    pub fn contains(&self, imdb_id: &str) -> bool {
        self.by_id.contains_key(imdb_id)
    }

    /// The stored record with the same identity as `probe`
    pub fn find_by_identity(&self, probe: &MediaRecord) -> Option<&MediaRecord> {
        self.get(probe.identity())
    }

    /// Insert `candidate` unless its identity is already stored
    ///
    /// Returns the canonical record either way. An existing record is never
    /// overwritten, so user state on it survives re-imports and re-fetches.
    pub fn merge(&mut self, candidate: MediaRecord) -> (&MediaRecord, MergeOutcome) {
        if let Some(&i) = self.by_id.get(candidate.identity()) {
            return (&self.records[i], MergeOutcome::Existing);
        }

        let i = self.records.len();
        self.by_id.insert(candidate.imdb_id.clone(), i);
        self.records.push(candidate);
        self.dirty = true;
        (&self.records[i], MergeOutcome::Inserted)
    }

    /// Merge every candidate, returning how many were new
    pub fn merge_all<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = MediaRecord>,
    {
        candidates
            .into_iter()
            .filter(|candidate| !candidate.imdb_id.trim().is_empty())
            .map(|candidate| self.merge(candidate).1)
            .filter(|outcome| *outcome == MergeOutcome::Inserted)
            .count()
    }

    /// Change the stored record with id `imdb_id` in place
    ///
    /// The identity field cannot be changed this way; any edit to it is reverted.
    pub fn mutate<F>(&mut self, imdb_id: &str, f: F) -> Result<&MediaRecord, CatalogError>
    where
        F: FnOnce(&mut MediaRecord),
    {
        let i = *self
            .by_id
            .get(imdb_id)
            .ok_or_else(|| CatalogError::UnknownRecord(imdb_id.to_string()))?;

        let record = &mut self.records[i];
        f(record);
        if record.imdb_id != imdb_id {
            warn!("Ignoring attempt to change identity of {} to {}", imdb_id, record.imdb_id);
            record.imdb_id = imdb_id.to_string();
        }
        self.dirty = true;
        Ok(&self.records[i])
    }

    /// Write the whole store to its file
    ///
    /// On failure the store stays dirty so a later `persist` can retry.
    pub fn persist(&mut self) -> Result<(), CatalogError> {
        write_records_to_file_with_format(self.records.iter(), &self.path, self.format)
            .map_err(|e| CatalogError::write(&self.path, e))?;
        self.dirty = false;
        debug!("Catalog saved: {} records to {}", self.records.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: &str, title: &str) -> MediaRecord {
        MediaRecord::new(id, title, Some(2000))
    }

    #[test]
    fn test_merge_keeps_first_copy() {
        let mut store = RecordStore::new("unused.json", Format::Json);
        let (_, outcome) = store.merge(record("tt1", "Original"));
        assert_eq!(outcome, MergeOutcome::Inserted);

        let (canonical, outcome) = store.merge(record("tt1", "Changed title"));
        assert_eq!(outcome, MergeOutcome::Existing);
        assert_eq!(canonical.title, "Original");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_merge_all_counts_new_records() {
        let mut store = RecordStore::new("unused.json", Format::Json);
        store.merge(record("tt1", "A"));
        let inserted = store.merge_all(vec![record("tt1", "A"), record("tt2", "B"), record("tt3", "C")]);
        assert_eq!(inserted, 2);
        let ids: Vec<&str> = store.iter().map(|r| r.identity()).collect();
        assert_eq!(ids, vec!["tt1", "tt2", "tt3"]);
    }

    #[test]
    fn test_mutate_keeps_identity() {
        let mut store = RecordStore::new("unused.json", Format::Json);
        store.merge(record("tt1", "A"));

        let updated = store
            .mutate("tt1", |r| {
                r.watched = true;
                r.imdb_id = "tt999".to_string();
            })
            .unwrap();
        assert!(updated.watched);
        assert_eq!(updated.imdb_id, "tt1");
        assert!(store.get("tt999").is_none());
        assert!(store.is_dirty());

        let err = store.mutate("tt404", |r| r.watched = true).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownRecord(_)));
    }

    #[test]
    fn test_load_missing_file_seeds_and_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("source.json");

        let store = RecordStore::load(&path, Format::Json).unwrap();
        assert!(!store.is_empty());
        assert!(store.get("tt0133093").is_some());
        assert!(path.exists());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_load_seed_in_configured_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("source.xml");

        let seeded = RecordStore::load(&path, Format::Xml).unwrap();
        let reloaded = RecordStore::load(&path, Format::Xml).unwrap();
        assert_eq!(seeded.len(), reloaded.len());
    }

    #[test]
    fn test_load_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("source.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = RecordStore::load(&path, Format::Json).err().unwrap();
        assert!(matches!(err, CatalogError::Load { .. }));
        // The broken file is left alone
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn test_persist_and_reload_user_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("source.csv");

        let mut store = RecordStore::new(&path, Format::Csv);
        store.merge(record("tt1", "A"));
        store.mutate("tt1", |r| r.my_rating = Some(7.5)).unwrap();
        store.persist().unwrap();
        assert!(!store.is_dirty());

        let reloaded = RecordStore::load(&path, Format::Csv).unwrap();
        assert_eq!(reloaded.get("tt1").unwrap().my_rating, Some(7.5));
    }

    #[test]
    fn test_persist_failure_leaves_store_dirty() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the write fail
        let path = dir.path().join("source.json");
        std::fs::create_dir(&path).unwrap();

        let mut store = RecordStore::new(&path, Format::Json);
        store.merge(record("tt1", "A"));
        assert!(matches!(store.persist(), Err(CatalogError::Write { .. })));
        assert!(store.is_dirty());
    }
}
