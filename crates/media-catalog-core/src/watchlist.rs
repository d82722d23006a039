use crate::error::CatalogError;
use crate::store::{MergeOutcome, RecordStore};
use media_catalog_models::{Format, MediaRecord};
use media_catalog_sources::{read_records_with_format, write_records_to_file_with_format};
use std::path::Path;
use tracing::debug;

/// A named, ordered subset of the catalog
///
/// Holds record identities only. The records themselves live in the
/// [`RecordStore`]; resolving through the store means a change made via one
/// watchlist is visible everywhere the record appears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    name: String,
    members: Vec<String>,
}

impl Watchlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Build a watchlist from loaded records, merging each into `store`
    ///
    /// Records already in the store are referenced rather than duplicated.
    /// Returns the watchlist and the number of records new to the store.
    pub fn from_records<I>(name: impl Into<String>, records: I, store: &mut RecordStore) -> (Self, usize)
    where
        I: IntoIterator<Item = MediaRecord>,
    {
        let mut watchlist = Self::new(name);
        let mut inserted = 0;
        for record in records {
            if record.imdb_id.trim().is_empty() {
                continue;
            }
            let (canonical, outcome) = store.merge(record);
            if outcome == MergeOutcome::Inserted {
                inserted += 1;
            }
            watchlist.add_reference(canonical);
        }
        (watchlist, inserted)
    }

    /// Load a watchlist file; the name is the file stem
    pub fn load(path: &Path, store: &mut RecordStore) -> Result<(Self, usize), CatalogError> {
        let format = Format::from_path(path)
            .filter(Format::is_readable)
            .ok_or_else(|| CatalogError::UnsupportedFormat(path.to_path_buf()))?;
        let name = watchlist_name_from_path(path).ok_or_else(|| CatalogError::UnsupportedFormat(path.to_path_buf()))?;

        let records = read_records_with_format(path, format).map_err(|e| CatalogError::load(path, e))?;
        let (watchlist, inserted) = Self::from_records(name, records, store);
        debug!("Loaded watchlist '{}' ({} records, {} new)", watchlist.name, watchlist.len(), inserted);
        Ok((watchlist, inserted))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member identities in list order
    pub fn identities(&self) -> &[String] {
        &self.members
    }

    /// Add a reference to `record`; returns false if it was already a member
    pub fn add_reference(&mut self, record: &MediaRecord) -> bool {
        if self.contains_identity(record) {
            return false;
        }
        self.members.push(record.imdb_id.clone());
        true
    }

    /// Drop the reference to `record`; returns false if it was not a member
    pub fn remove_reference(&mut self, record: &MediaRecord) -> bool {
        let before = self.members.len();
        self.members.retain(|id| id != record.identity());
        self.members.len() != before
    }

    pub fn contains_identity(&self, record: &MediaRecord) -> bool {
        self.members.iter().any(|id| id == record.identity())
    }

    /// Resolve every member through `store`, in list order
    pub fn all_records<'a>(&'a self, store: &'a RecordStore) -> impl Iterator<Item = &'a MediaRecord> + 'a {
        self.members.iter().filter_map(move |id| store.get(id))
    }

    /// Write the resolved members to `path`
    pub fn persist(&self, store: &RecordStore, path: &Path, format: Format) -> Result<(), CatalogError> {
        write_records_to_file_with_format(self.all_records(store), path, format)
            .map_err(|e| CatalogError::write(path, e))?;
        debug!("Watchlist '{}' saved: {} records to {}", self.name, self.len(), path.display());
        Ok(())
    }
}

/// File stem of a watchlist file, e.g. "Favorites" for "Favorites.json"
pub(crate) fn watchlist_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with(ids: &[&str]) -> RecordStore {
        let mut store = RecordStore::new("unused.json", Format::Json);
        for id in ids {
            store.merge(MediaRecord::new(*id, format!("Title {}", id), None));
        }
        store
    }

    #[test]
    fn test_references_are_unique() {
        let store = store_with(&["tt1", "tt2"]);
        let mut watchlist = Watchlist::new("Favorites");
        let first = store.get("tt1").unwrap();

        assert!(watchlist.add_reference(first));
        assert!(!watchlist.add_reference(first));
        assert!(watchlist.add_reference(store.get("tt2").unwrap()));
        assert_eq!(watchlist.identities(), ["tt1", "tt2"]);

        assert!(watchlist.remove_reference(first));
        assert!(!watchlist.remove_reference(first));
        assert_eq!(watchlist.len(), 1);
    }

    #[test]
    fn test_all_records_sees_store_changes() {
        let mut store = store_with(&["tt1"]);
        let mut watchlist = Watchlist::new("Favorites");
        watchlist.add_reference(store.get("tt1").unwrap());

        store.mutate("tt1", |r| r.watched = true).unwrap();
        let resolved: Vec<&MediaRecord> = watchlist.all_records(&store).collect();
        assert!(resolved[0].watched);
    }

    #[test]
    fn test_from_records_reuses_stored_records() {
        let mut store = store_with(&["tt1"]);
        store.mutate("tt1", |r| r.my_rating = Some(9.0)).unwrap();

        let incoming = vec![
            MediaRecord::new("tt1", "Stale copy", None),
            MediaRecord::new("tt2", "New", None),
            MediaRecord::new("tt2", "New again", None),
        ];
        let (watchlist, inserted) = Watchlist::from_records("Imported", incoming, &mut store);

        assert_eq!(inserted, 1);
        assert_eq!(watchlist.identities(), ["tt1", "tt2"]);
        let first = watchlist.all_records(&store).next().unwrap();
        assert_eq!(first.my_rating, Some(9.0));
        assert_eq!(first.title, "Title tt1");
    }

    #[test]
    fn test_persist_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Weekend.json");
        let store = store_with(&["tt1", "tt2"]);
        let mut watchlist = Watchlist::new("Weekend");
        watchlist.add_reference(store.get("tt2").unwrap());
        watchlist.persist(&store, &path, Format::Json).unwrap();

        let mut fresh = RecordStore::new("unused.json", Format::Json);
        let (loaded, inserted) = Watchlist::load(&path, &mut fresh).unwrap();
        assert_eq!(loaded.name(), "Weekend");
        assert_eq!(loaded.identities(), ["tt2"]);
        assert_eq!(inserted, 1);
    }

    #[test]
    fn test_load_rejects_unreadable_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "The Matrix (1999)").unwrap();

        let mut store = store_with(&[]);
        let err = Watchlist::load(&path, &mut store).unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedFormat(_)));
    }
}
