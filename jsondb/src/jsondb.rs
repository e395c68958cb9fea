use serde_json::Value;
use std::sync::Arc;

use crate::collection::operation::{self, WriteResult};
use crate::collection::{IdGenerator, JsonCollection};
use crate::common::{LockHandle, LockRegistry, Outcome};
use crate::errors::{ErrorKind, JsonDbError, JsonDbResult};
use crate::filter::Predicate;
use crate::jsondb_builder::JsonDbBuilder;
use crate::jsondb_config::JsonDbConfig;
use crate::store::JsonFileStore;
use crate::{
    Record, COLLECTION_CLEAR_SUCCESS, COLLECTION_CREATED, COLLECTION_DELETED,
    COLLECTION_INVALID, COLLECTION_NOT_EXISTS, COLLECTION_VALID, RECORDS_DELETED,
    RECORDS_FOUND, RECORD_DELETED, RECORD_NOT_FOUND, SAVE_SUCCESS_MESSAGE,
    UPDATED_SUCCESSFULLY,
};

/// The main entry point of a jsondb store.
///
/// A `JsonDb` owns a base directory in which every collection is one JSON file.
/// Each operation loads the whole collection, works on it in memory and, when it
/// changed something, writes the whole collection back.
///
/// Operations return a [JsonDbResult] of an [Outcome] holding the produced data
/// and a message. Convert it into a [crate::Response] for the flat
/// `(success, data, message)` form.
///
/// # Examples
///
/// ```rust,ignore
/// use jsondb::JsonDb;
/// use serde_json::json;
///
/// let db = JsonDb::builder().base_dir("/tmp/app/database").open()?;
/// db.create_collection("users")?;
/// db.insert_one("users", json!({ "name": "Sanan", "age": 24 }))?;
///
/// let adults = db.filter("users", &json!({ "age": { "$gt": 20 } }))?.into_data();
/// db.update("users", &json!({ "name": "Sanan" }), &json!({ "age": 25 }))?;
/// ```
///
/// Within one process operations on the same collection are serialized by a
/// per-collection read-write lock. Several processes writing the same base
/// directory are not coordinated.
#[derive(Clone)]
pub struct JsonDb {
    inner: Arc<JsonDbInner>,
}

impl JsonDb {
    /// Creates a new builder for opening a store.
    pub fn builder() -> JsonDbBuilder {
        JsonDbBuilder::new()
    }

    pub(crate) fn new(config: JsonDbConfig) -> Self {
        JsonDb {
            inner: Arc::new(JsonDbInner::new(config)),
        }
    }

    pub(crate) fn initialize(&self) -> JsonDbResult<()> {
        self.inner.config.initialize()?;
        self.inner.store.ensure_base_directory()?;
        log::info!("Opened jsondb at {:?}", self.inner.config.base_dir());
        Ok(())
    }

    pub fn config(&self) -> JsonDbConfig {
        self.inner.config.clone()
    }

    pub fn store(&self) -> JsonFileStore {
        self.inner.store.clone()
    }

    /// Returns a handle bound to one collection. The collection does not need
    /// to exist yet.
    pub fn collection(&self, name: &str) -> JsonDbResult<JsonCollection> {
        self.inner.store.collection_path(name)?;
        Ok(JsonCollection::new(self.clone(), name))
    }

    /// Creates an empty collection. Fails if it already exists.
    pub fn create_collection(&self, name: &str) -> JsonDbResult<Outcome<()>> {
        let lock = self.inner.lock_for(name);
        let _write = lock.as_ref().map(|lock| lock.write());
        self.inner.store.create(name)?;
        log::debug!("Created collection {}", name);
        Ok(Outcome::new((), COLLECTION_CREATED))
    }

    /// Removes the collection file.
    ///
    /// The collection's lock stays registered: handles taken before the delete
    /// must keep excluding writers of a collection recreated under the same name.
    pub fn delete_collection(&self, name: &str) -> JsonDbResult<Outcome<()>> {
        let lock = self.inner.lock_for(name);
        let _write = lock.as_ref().map(|lock| lock.write());
        self.inner.store.remove(name)?;
        log::debug!("Deleted collection {}", name);
        Ok(Outcome::new((), COLLECTION_DELETED))
    }

    /// Removes every record and keeps the collection file.
    ///
    /// The old content is never read, so this also resets a collection whose
    /// file [JsonDb::valid] reports as corrupt.
    pub fn clear_collection(&self, name: &str) -> JsonDbResult<Outcome<()>> {
        let lock = self.inner.lock_for(name);
        let _write = lock.as_ref().map(|lock| lock.write());
        self.inner.store.collection_path(name)?;
        if !self.inner.store.exists(name) {
            log::debug!("Collection {} does not exist", name);
            return Err(JsonDbError::new(
                COLLECTION_NOT_EXISTS,
                ErrorKind::CollectionNotFound,
            ));
        }
        self.inner.store.save(name, &operation::clear())?;
        log::debug!("Cleared collection {}", name);
        Ok(Outcome::new((), COLLECTION_CLEAR_SUCCESS))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.inner.store.exists(name)
    }

    /// Checks whether the collection file holds a well-formed collection.
    pub fn valid(&self, name: &str) -> JsonDbResult<Outcome<bool>> {
        let lock = self.inner.lock_for(name);
        let _read = lock.as_ref().map(|lock| lock.read());
        let valid = self.inner.store.is_valid(name)?;
        let message = if valid { COLLECTION_VALID } else { COLLECTION_INVALID };
        Ok(Outcome::new(valid, message))
    }

    /// Names of every collection in the base directory, sorted.
    pub fn list_collections(&self) -> JsonDbResult<Outcome<Vec<String>>> {
        let names = self.inner.store.list_collections()?;
        Ok(Outcome::new(names, RECORDS_FOUND))
    }

    /// Appends a record and assigns its `id`.
    pub fn insert_one(&self, name: &str, row: Value) -> JsonDbResult<Outcome<WriteResult>> {
        let ids = &self.inner.ids;
        let id = self
            .inner
            .write_collection(name, |records| operation::insert(records, row, ids))?;
        Ok(Outcome::new(WriteResult::new(vec![id]), SAVE_SUCCESS_MESSAGE))
    }

    /// Appends several records with one write. Either every row is stored or none is.
    pub fn insert_many(&self, name: &str, rows: Vec<Value>) -> JsonDbResult<Outcome<WriteResult>> {
        let ids = &self.inner.ids;
        let assigned = self
            .inner
            .write_collection(name, |records| operation::insert_batch(records, rows, ids))?;
        Ok(Outcome::new(WriteResult::new(assigned), SAVE_SUCCESS_MESSAGE))
    }

    pub fn get_all(&self, name: &str) -> JsonDbResult<Outcome<Vec<Record>>> {
        let records = self
            .inner
            .read_collection(name, |records| Ok(operation::select_all(records)))?;
        Ok(Outcome::new(records, RECORDS_FOUND))
    }

    pub fn count(&self, name: &str) -> JsonDbResult<Outcome<usize>> {
        let count = self.inner.read_collection(name, |records| {
            Ok(operation::count_where(&records, &Predicate::default()))
        })?;
        Ok(Outcome::new(count, RECORDS_FOUND))
    }

    /// Records matching the where-clause, in file order. An empty clause matches
    /// every record.
    pub fn filter(&self, name: &str, where_clause: &Value) -> JsonDbResult<Outcome<Vec<Record>>> {
        self.inner.read_collection(name, |records| {
            let predicate = Predicate::parse(where_clause)?;
            Ok(Outcome::new(
                operation::select_where(records, &predicate),
                RECORDS_FOUND,
            ))
        })
    }

    /// Records matching an already built predicate.
    pub fn filter_by(&self, name: &str, predicate: &Predicate) -> JsonDbResult<Outcome<Vec<Record>>> {
        let found = self
            .inner
            .read_collection(name, |records| Ok(operation::select_where(records, predicate)))?;
        Ok(Outcome::new(found, RECORDS_FOUND))
    }

    /// The first record matching the where-clause.
    pub fn find_one(&self, name: &str, where_clause: &Value) -> JsonDbResult<Outcome<Record>> {
        self.inner.read_collection(name, |records| {
            let predicate = Predicate::parse(where_clause)?;
            operation::select_first_where(records, &predicate)
                .map(|record| Outcome::new(record, RECORDS_FOUND))
                .ok_or_else(|| {
                    log::debug!("No record in {} matches {}", name, predicate);
                    JsonDbError::new(RECORD_NOT_FOUND, ErrorKind::RecordNotFound)
                })
        })
    }

    /// Records whose `field` contains `keyword`, ignoring case.
    pub fn search(&self, name: &str, field: &str, keyword: &str) -> JsonDbResult<Outcome<Vec<Record>>> {
        let found = self
            .inner
            .read_collection(name, |records| operation::search(records, field, keyword))?;
        Ok(Outcome::new(found, RECORDS_FOUND))
    }

    /// Values of `field` across the collection.
    pub fn get_field_values(&self, name: &str, field: &str) -> JsonDbResult<Outcome<Vec<Value>>> {
        let values = self
            .inner
            .read_collection(name, |records| operation::field_values(records, field))?;
        Ok(Outcome::new(values, RECORDS_FOUND))
    }

    /// Records that have `field`.
    pub fn search_by_field(&self, name: &str, field: &str) -> JsonDbResult<Outcome<Vec<Record>>> {
        let found = self
            .inner
            .read_collection(name, |records| operation::search_by_field(records, field))?;
        Ok(Outcome::new(found, RECORDS_FOUND))
    }

    /// Merges the set-clause into the first record matching the where-clause.
    pub fn update(
        &self,
        name: &str,
        where_clause: &Value,
        set_clause: &Value,
    ) -> JsonDbResult<Outcome<Record>> {
        let updated = self.inner.write_collection(name, |records| {
            let predicate = Predicate::parse_required(where_clause)?;
            operation::update_first_match(records, &predicate, set_clause)
        })?;
        Ok(Outcome::new(updated, UPDATED_SUCCESSFULLY))
    }

    /// Merges the set-clause into every record matching the where-clause.
    pub fn update_many(
        &self,
        name: &str,
        where_clause: &Value,
        set_clause: &Value,
    ) -> JsonDbResult<Outcome<Vec<Record>>> {
        let updated = self.inner.write_collection(name, |records| {
            let predicate = Predicate::parse_required(where_clause)?;
            operation::update_all_matches(records, &predicate, set_clause)
        })?;
        Ok(Outcome::new(updated, UPDATED_SUCCESSFULLY))
    }

    /// Removes the first record matching the where-clause and returns it.
    pub fn delete_one(&self, name: &str, where_clause: &Value) -> JsonDbResult<Outcome<Record>> {
        let removed = self.inner.write_collection(name, |records| {
            let predicate = Predicate::parse_required(where_clause)?;
            operation::delete_first_match(records, &predicate)
        })?;
        Ok(Outcome::new(removed, RECORD_DELETED))
    }

    /// Removes every record matching the where-clause and returns them.
    pub fn delete_many(&self, name: &str, where_clause: &Value) -> JsonDbResult<Outcome<Vec<Record>>> {
        let removed = self.inner.write_collection(name, |records| {
            let predicate = Predicate::parse_required(where_clause)?;
            operation::delete_all_matches(records, &predicate)
        })?;
        Ok(Outcome::new(removed, RECORDS_DELETED))
    }
}

struct JsonDbInner {
    config: JsonDbConfig,
    store: JsonFileStore,
    locks: LockRegistry,
    ids: IdGenerator,
}

impl JsonDbInner {
    fn new(config: JsonDbConfig) -> Self {
        JsonDbInner {
            store: JsonFileStore::new(config.clone()),
            locks: LockRegistry::new(),
            ids: IdGenerator::new(config.id_strategy()),
            config,
        }
    }

    fn lock_for(&self, name: &str) -> Option<LockHandle> {
        if self.config.collection_locking() {
            Some(self.locks.get_lock(name))
        } else {
            None
        }
    }

    fn read_collection<T, F>(&self, name: &str, read: F) -> JsonDbResult<T>
    where
        F: FnOnce(Vec<Record>) -> JsonDbResult<T>,
    {
        let lock = self.lock_for(name);
        let _read = lock.as_ref().map(|lock| lock.read());
        let records = self.store.load(name)?;
        read(records)
    }

    // Nothing is saved when `mutate` fails, so a failed operation leaves the
    // file untouched.
    fn write_collection<T, F>(&self, name: &str, mutate: F) -> JsonDbResult<T>
    where
        F: FnOnce(&mut Vec<Record>) -> JsonDbResult<T>,
    {
        let lock = self.lock_for(name);
        let _write = lock.as_ref().map(|lock| lock.write());
        let mut records = self.store.load(name)?;
        let result = mutate(&mut records)?;
        self.store.save(name, &records)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::field;
    use serde_json::json;
    use std::sync::mpsc::{self, RecvTimeoutError};
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn open(dir: &TempDir) -> JsonDb {
        JsonDb::builder().base_dir(dir.path()).open().unwrap()
    }

    #[test]
    fn test_create_insert_read() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);

        let created = db.create_collection("users").unwrap();
        assert_eq!(created.message(), COLLECTION_CREATED);

        let inserted = db.insert_one("users", json!({ "name": "Sanan", "age": 24 })).unwrap();
        assert_eq!(inserted.message(), SAVE_SUCCESS_MESSAGE);
        let id = inserted.data().first_id().unwrap();

        let all = db.get_all("users").unwrap().into_data();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["id"], json!(id));
        assert_eq!(all[0]["name"], json!("Sanan"));
        assert_eq!(db.count("users").unwrap().into_data(), 1);
    }

    #[test]
    fn test_filter_and_filter_by_agree() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        db.create_collection("users").unwrap();
        db.insert_many(
            "users",
            vec![json!({ "age": 24 }), json!({ "age": 32 }), json!({ "age": 5 })],
        )
        .unwrap();

        let parsed = db.filter("users", &json!({ "age": { "$gt": 20 } })).unwrap().into_data();
        let fluent = db.filter_by("users", &field("age").gt(20)).unwrap().into_data();
        assert_eq!(parsed, fluent);
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_failed_write_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        db.create_collection("users").unwrap();
        db.insert_one("users", json!({ "age": 1 })).unwrap();
        let before = std::fs::read_to_string(dir.path().join("users.json")).unwrap();

        let err = db.update("users", &json!({}), &json!({ "age": 2 })).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidPredicate);
        let err = db.delete_one("users", &json!({ "age": 99 })).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::RecordNotFound);

        let after = std::fs::read_to_string(dir.path().join("users.json")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_missing_collection() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        let err = db.get_all("ghost").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::CollectionNotFound);
        assert!(!db.exists("ghost"));
        assert!(!dir.path().join("ghost.json").exists());
    }

    #[test]
    fn test_delete_collection_keeps_lock() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        db.create_collection("users").unwrap();
        db.count("users").unwrap();
        assert_eq!(db.inner.locks.lock_count(), 1);

        db.delete_collection("users").unwrap();
        assert_eq!(db.inner.locks.lock_count(), 1);
        assert!(!db.exists("users"));
    }

    #[test]
    fn test_handle_taken_before_delete_still_excludes_writers() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        db.create_collection("users").unwrap();

        let stale = db.inner.lock_for("users").unwrap();
        db.delete_collection("users").unwrap();

        let held = stale.write();
        let (tx, rx) = mpsc::channel();
        let writer = {
            let db = db.clone();
            thread::spawn(move || {
                let created = db.create_collection("users");
                let inserted = db.insert_one("users", json!({ "name": "Ali" }));
                tx.send(()).unwrap();
                (created.is_ok(), inserted.is_ok())
            })
        };

        assert_eq!(
            rx.recv_timeout(Duration::from_millis(200)),
            Err(RecvTimeoutError::Timeout)
        );
        drop(held);

        assert_eq!(writer.join().unwrap(), (true, true));
        assert_eq!(db.count("users").unwrap().into_data(), 1);
    }

    #[test]
    fn test_clear_resets_corrupt_collection() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        db.create_collection("users").unwrap();
        std::fs::write(dir.path().join("users.json"), "{").unwrap();
        assert!(!db.valid("users").unwrap().into_data());

        let cleared = db.clear_collection("users").unwrap();
        assert_eq!(cleared.message(), COLLECTION_CLEAR_SUCCESS);
        assert!(db.valid("users").unwrap().into_data());
        assert_eq!(db.count("users").unwrap().into_data(), 0);
    }

    #[test]
    fn test_clear_missing_collection() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        let err = db.clear_collection("ghost").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::CollectionNotFound);
        let err = db.clear_collection("../ghost").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidCollectionName);
        assert!(!dir.path().join("ghost.json").exists());
    }

    #[test]
    fn test_locking_disabled() {
        let dir = TempDir::new().unwrap();
        let db = JsonDb::builder()
            .base_dir(dir.path())
            .collection_locking(false)
            .open()
            .unwrap();
        db.create_collection("users").unwrap();
        db.insert_one("users", json!({ "a": 1 })).unwrap();
        assert_eq!(db.inner.locks.lock_count(), 0);
    }

    #[test]
    fn test_collection_rejects_bad_name() {
        let dir = TempDir::new().unwrap();
        let db = open(&dir);
        let err = db.collection("../escape").err().unwrap();
        assert_eq!(err.kind(), &ErrorKind::InvalidCollectionName);
        assert!(db.collection("users").is_ok());
    }
}
