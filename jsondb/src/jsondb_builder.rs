use std::path::Path;

use crate::collection::IdStrategy;
use crate::errors::{JsonDbError, JsonDbResult};
use crate::jsondb::JsonDb;
use crate::jsondb_config::{JsonDbConfig, JsonDbSettings};

/// Fluent builder for opening a [JsonDb].
///
/// The first invalid setting is remembered and reported by [JsonDbBuilder::open].
///
/// ```rust,ignore
/// let db = JsonDb::builder()
///     .base_dir("/var/lib/inventory")
///     .pretty_print(false)
///     .open()?;
/// ```
#[derive(Default)]
pub struct JsonDbBuilder {
    error: Option<JsonDbError>,
    config: JsonDbConfig,
}

impl JsonDbBuilder {
    pub fn new() -> Self {
        JsonDbBuilder {
            error: None,
            config: JsonDbConfig::new(),
        }
    }

    pub fn base_dir<P: AsRef<Path>>(mut self, base_dir: P) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_base_dir(base_dir) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Name used to resolve the default base directory when none is set.
    pub fn app_name(mut self, app_name: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_app_name(app_name) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn pretty_print(mut self, pretty_print: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_pretty_print(pretty_print) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_id_strategy(id_strategy) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn collection_locking(mut self, enabled: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_collection_locking(enabled) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Replaces every setting with deserialized ones.
    ///
    /// Values from setters called before this are overwritten; setters called
    /// after it change single fields on top of these settings. Invalid settings
    /// are reported by [JsonDbBuilder::open] like any other setter error.
    pub fn settings(mut self, settings: JsonDbSettings) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.apply_settings(settings) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Opens the store, creating the base directory if needed.
    pub fn open(self) -> JsonDbResult<JsonDb> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let db = JsonDb::new(self.config);
        db.initialize()?;
        Ok(db)
    }
}
