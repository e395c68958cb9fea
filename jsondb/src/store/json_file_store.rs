use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

use crate::common::validate_collection_name;
use crate::errors::{ErrorKind, JsonDbError, JsonDbResult};
use crate::jsondb_config::JsonDbConfig;
use crate::{
    Record, COLLECTION_EXISTS, COLLECTION_FILE_EXTENSION, COLLECTION_NOT_EXISTS,
    SAVE_ERROR_MESSAGE,
};

/// Maps collection names to JSON files and moves whole collections between disk
/// and memory.
///
/// Each collection lives in `<base_dir>/<name>.json` as `{ "<name>": [ records ] }`.
/// Writes go to a temporary file in the base directory which is then renamed over
/// the collection file, so a crash never leaves a truncated collection behind.
///
/// `JsonFileStore` is cheap to clone; clones share the same configuration.
#[derive(Clone)]
pub struct JsonFileStore {
    inner: Arc<JsonFileStoreInner>,
}

impl JsonFileStore {
    pub fn new(config: JsonDbConfig) -> Self {
        JsonFileStore {
            inner: Arc::new(JsonFileStoreInner { config }),
        }
    }

    pub fn base_dir(&self) -> PathBuf {
        self.inner.config.base_dir()
    }

    /// Path of the file backing the collection.
    pub fn collection_path(&self, name: &str) -> JsonDbResult<PathBuf> {
        self.inner.collection_path(name)
    }

    /// Returns `true` iff the collection file is present.
    pub fn exists(&self, name: &str) -> bool {
        self.inner
            .collection_path(name)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Creates the base directory if it is missing.
    pub fn ensure_base_directory(&self) -> JsonDbResult<()> {
        self.inner.ensure_base_directory()
    }

    /// Reads and parses every record of the collection.
    pub fn load(&self, name: &str) -> JsonDbResult<Vec<Record>> {
        self.inner.load(name)
    }

    /// Replaces the content of the collection file with `records`.
    pub fn save(&self, name: &str, records: &[Record]) -> JsonDbResult<()> {
        self.inner.save(name, records)
    }

    /// Writes an empty collection file; fails if one already exists.
    pub fn create(&self, name: &str) -> JsonDbResult<()> {
        self.inner.create(name)
    }

    /// Deletes the collection file.
    pub fn remove(&self, name: &str) -> JsonDbResult<()> {
        self.inner.remove(name)
    }

    /// Returns `Ok(false)` when the collection file is present but corrupt.
    pub fn is_valid(&self, name: &str) -> JsonDbResult<bool> {
        match self.inner.load(name) {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == &ErrorKind::CorruptData => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Names of every collection file in the base directory, sorted.
    pub fn list_collections(&self) -> JsonDbResult<Vec<String>> {
        self.inner.list_collections()
    }
}

struct JsonFileStoreInner {
    config: JsonDbConfig,
}

impl JsonFileStoreInner {
    fn collection_path(&self, name: &str) -> JsonDbResult<PathBuf> {
        validate_collection_name(name)?;
        Ok(self
            .config
            .base_dir()
            .join(format!("{}.{}", name, COLLECTION_FILE_EXTENSION)))
    }

    fn ensure_base_directory(&self) -> JsonDbResult<()> {
        let base_dir = self.config.base_dir();
        fs::create_dir_all(&base_dir).map_err(|e| {
            log::error!("Failed to create base directory {:?}: {}", base_dir, e);
            JsonDbError::from(e)
        })
    }

    fn load(&self, name: &str) -> JsonDbResult<Vec<Record>> {
        let path = self.collection_path(name)?;
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(collection_not_found(name));
            }
            Err(e) => {
                log::error!("Failed to read collection file {:?}: {}", path, e);
                return Err(e.into());
            }
        };

        let document: Value = serde_json::from_slice(&content).map_err(|e| {
            log::error!("Collection file {:?} is not valid JSON: {}", path, e);
            JsonDbError::new_with_cause(
                &format!("Collection '{}' is not valid JSON", name),
                ErrorKind::CorruptData,
                e.into(),
            )
        })?;

        extract_records(name, document)
    }

    fn save(&self, name: &str, records: &[Record]) -> JsonDbResult<()> {
        let path = self.collection_path(name)?;
        self.write_atomically(name, &path, records, true)
    }

    fn create(&self, name: &str) -> JsonDbResult<()> {
        let path = self.collection_path(name)?;
        self.ensure_base_directory()?;
        if path.exists() {
            log::error!("Collection {} already exists", name);
            return Err(already_exists(name));
        }
        self.write_atomically(name, &path, &[], false)
    }

    fn remove(&self, name: &str) -> JsonDbResult<()> {
        let path = self.collection_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(collection_not_found(name)),
            Err(e) => {
                log::error!("Failed to delete collection file {:?}: {}", path, e);
                Err(e.into())
            }
        }
    }

    fn list_collections(&self) -> JsonDbResult<Vec<String>> {
        let base_dir = self.config.base_dir();
        let entries = match fs::read_dir(&base_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_collection = path.is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(COLLECTION_FILE_EXTENSION);
            if !is_collection {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    // Serializes `{name: records}` next to the target and renames it into place.
    // With `clobber` unset the rename fails if the target appeared meanwhile.
    fn write_atomically(
        &self,
        name: &str,
        path: &Path,
        records: &[Record],
        clobber: bool,
    ) -> JsonDbResult<()> {
        let document = BTreeMap::from([(name, records)]);
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        let write = || -> JsonDbResult<NamedTempFile> {
            let mut temp_file = NamedTempFile::new_in(dir)?;
            {
                let mut writer = BufWriter::new(temp_file.as_file_mut());
                if self.config.pretty_print() {
                    serde_json::to_writer_pretty(&mut writer, &document)?;
                } else {
                    serde_json::to_writer(&mut writer, &document)?;
                }
                writer.flush()?;
            }
            temp_file.as_file().sync_all()?;
            Ok(temp_file)
        };

        let temp_file = write().map_err(|e| {
            log::error!("Failed to write collection {}: {}", name, e);
            JsonDbError::new_with_cause(SAVE_ERROR_MESSAGE, ErrorKind::IOError, e)
        })?;

        let persisted = if clobber {
            temp_file.persist(path)
        } else {
            temp_file.persist_noclobber(path)
        };

        match persisted {
            Ok(_) => {
                log::debug!("Saved {} records to {:?}", records.len(), path);
                Ok(())
            }
            Err(e) if !clobber && e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(already_exists(name))
            }
            Err(e) => {
                log::error!("Failed to replace collection file {:?}: {}", path, e.error);
                Err(JsonDbError::new_with_cause(
                    SAVE_ERROR_MESSAGE,
                    ErrorKind::IOError,
                    e.into(),
                ))
            }
        }
    }
}

// Checks the `{ "<name>": [ {..}, .. ] }` shape and takes the records out.
fn extract_records(name: &str, document: Value) -> JsonDbResult<Vec<Record>> {
    let Value::Object(mut top_level) = document else {
        return Err(corrupt(name, "top level is not an object"));
    };

    let Some(Value::Array(rows)) = top_level.remove(name) else {
        return Err(corrupt(name, "collection key is missing or not an array"));
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Object(record) => Ok(record),
            _ => Err(corrupt(name, &format!("record {} is not an object", index))),
        })
        .collect()
}

fn corrupt(name: &str, reason: &str) -> JsonDbError {
    log::error!("Collection {} has unexpected shape: {}", name, reason);
    JsonDbError::new(
        &format!("Collection '{}' has unexpected shape: {}", name, reason),
        ErrorKind::CorruptData,
    )
}

fn collection_not_found(name: &str) -> JsonDbError {
    log::debug!("Collection {} does not exist", name);
    JsonDbError::new(COLLECTION_NOT_EXISTS, ErrorKind::CollectionNotFound)
}

fn already_exists(name: &str) -> JsonDbError {
    log::debug!("Collection {} already exists", name);
    JsonDbError::new(COLLECTION_EXISTS, ErrorKind::AlreadyExists)
}
