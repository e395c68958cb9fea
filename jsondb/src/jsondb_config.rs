//! Configuration management for a jsondb store.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::collection::IdStrategy;
use crate::common::default_base_dir;
use crate::errors::{ErrorKind, JsonDbError, JsonDbResult};

pub const DEFAULT_APP_NAME: &str = "jsondb";

/// Serializable form of a [JsonDbConfig], for loading settings from a file.
///
/// ```rust,ignore
/// let settings: JsonDbSettings = serde_json::from_str(r#"{ "base_dir": "data", "pretty_print": false }"#)?;
/// let db = JsonDb::builder().settings(settings).open()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonDbSettings {
    pub base_dir: Option<PathBuf>,
    pub app_name: String,
    pub pretty_print: bool,
    pub id_strategy: IdStrategy,
    pub collection_locking: bool,
}

impl Default for JsonDbSettings {
    fn default() -> Self {
        JsonDbSettings {
            base_dir: None,
            app_name: DEFAULT_APP_NAME.to_string(),
            pretty_print: true,
            id_strategy: IdStrategy::default(),
            collection_locking: true,
        }
    }
}

/// Public interface for jsondb configuration.
///
/// Cloning is cheap and every clone shares the same settings. Settings can be
/// changed until the store is opened, after which they are frozen.
///
/// # Examples
///
/// ```rust,ignore
/// let config = JsonDbConfig::new();
/// config.set_base_dir("/tmp/my-app/database")?;
/// config.set_pretty_print(false)?;
/// ```
#[derive(Clone)]
pub struct JsonDbConfig {
    /// The pointer to implementation. Uses Arc for cheap cloning and thread safety.
    inner: Arc<JsonDbConfigInner>,
}

impl Default for JsonDbConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonDbConfig {
    /// Creates a new configuration instance with default values.
    pub fn new() -> Self {
        JsonDbConfig {
            inner: Arc::new(JsonDbConfigInner::new(JsonDbSettings::default())),
        }
    }

    /// Creates a configuration from deserialized settings, applying the same
    /// checks as the individual setters.
    pub fn from_settings(settings: JsonDbSettings) -> JsonDbResult<Self> {
        let config = JsonDbConfig::new();
        config.apply_settings(settings)?;
        Ok(config)
    }

    /// Directory holding one `<name>.json` file per collection.
    ///
    /// Falls back to the platform application-data location of the app name
    /// when no directory was set.
    pub fn base_dir(&self) -> PathBuf {
        self.inner.base_dir()
    }

    pub fn set_base_dir<P: AsRef<Path>>(&self, base_dir: P) -> JsonDbResult<()> {
        self.inner.set_base_dir(base_dir.as_ref())
    }

    pub fn app_name(&self) -> String {
        self.inner.settings.read().app_name.clone()
    }

    pub fn set_app_name(&self, app_name: &str) -> JsonDbResult<()> {
        self.inner.set_app_name(app_name)
    }

    /// Whether collection files are written indented.
    pub fn pretty_print(&self) -> bool {
        self.inner.settings.read().pretty_print
    }

    pub fn set_pretty_print(&self, pretty_print: bool) -> JsonDbResult<()> {
        self.inner.update(|settings| settings.pretty_print = pretty_print)
    }

    pub fn id_strategy(&self) -> IdStrategy {
        self.inner.settings.read().id_strategy
    }

    pub fn set_id_strategy(&self, id_strategy: IdStrategy) -> JsonDbResult<()> {
        self.inner.update(|settings| settings.id_strategy = id_strategy)
    }

    /// Whether operations on one collection are serialized inside this process.
    pub fn collection_locking(&self) -> bool {
        self.inner.settings.read().collection_locking
    }

    pub fn set_collection_locking(&self, enabled: bool) -> JsonDbResult<()> {
        self.inner.update(|settings| settings.collection_locking = enabled)
    }

    /// Replaces every setting at once. Fails without changing anything when a
    /// field would be rejected by its setter.
    pub fn apply_settings(&self, settings: JsonDbSettings) -> JsonDbResult<()> {
        self.inner.apply_settings(settings)
    }

    /// A snapshot of the current settings.
    pub fn settings(&self) -> JsonDbSettings {
        self.inner.settings.read().clone()
    }

    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }

    /// Freezes the configuration. Called when the store is opened.
    pub(crate) fn initialize(&self) -> JsonDbResult<()> {
        self.inner.initialize()
    }
}

struct JsonDbConfigInner {
    /// Set once the store has been opened
    configured: AtomicBool,
    settings: RwLock<JsonDbSettings>,
}

impl JsonDbConfigInner {
    fn new(settings: JsonDbSettings) -> Self {
        JsonDbConfigInner {
            configured: AtomicBool::new(false),
            settings: RwLock::new(settings),
        }
    }

    fn base_dir(&self) -> PathBuf {
        let settings = self.settings.read();
        match &settings.base_dir {
            Some(dir) => dir.clone(),
            None => default_base_dir(&settings.app_name),
        }
    }

    fn set_base_dir(&self, base_dir: &Path) -> JsonDbResult<()> {
        check_base_dir(base_dir)?;
        let base_dir = base_dir.to_path_buf();
        self.update(move |settings| settings.base_dir = Some(base_dir))
    }

    fn set_app_name(&self, app_name: &str) -> JsonDbResult<()> {
        check_app_name(app_name)?;
        let app_name = app_name.to_string();
        self.update(move |settings| settings.app_name = app_name)
    }

    fn apply_settings(&self, settings: JsonDbSettings) -> JsonDbResult<()> {
        if let Some(base_dir) = &settings.base_dir {
            check_base_dir(base_dir)?;
        }
        check_app_name(&settings.app_name)?;
        self.update(move |current| *current = settings)
    }

    fn update<F: FnOnce(&mut JsonDbSettings)>(&self, f: F) -> JsonDbResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("Configuration cannot be changed after the store is opened");
            return Err(JsonDbError::new(
                "Configuration cannot be changed after the store is opened",
                ErrorKind::InvalidOperation,
            ));
        }
        f(&mut self.settings.write());
        Ok(())
    }

    fn initialize(&self) -> JsonDbResult<()> {
        self.configured.store(true, Ordering::Relaxed);
        log::debug!("Configuration frozen with base directory {:?}", self.base_dir());
        Ok(())
    }
}

fn check_base_dir(base_dir: &Path) -> JsonDbResult<()> {
    if base_dir.as_os_str().is_empty() {
        log::error!("Base directory cannot be empty");
        return Err(JsonDbError::new(
            "Base directory cannot be empty",
            ErrorKind::InvalidOperation,
        ));
    }
    Ok(())
}

fn check_app_name(app_name: &str) -> JsonDbResult<()> {
    if app_name.trim().is_empty() {
        log::error!("App name cannot be empty");
        return Err(JsonDbError::new(
            "App name cannot be empty",
            ErrorKind::InvalidOperation,
        ));
    }
    Ok(())
}
