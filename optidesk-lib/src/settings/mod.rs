//! User preferences, persisted as a single pretty-printed JSON document.
//!
//! The [`SettingsStore`] is owned by whoever needs it; there is no ambient global. It caches
//! the document for the rest of the session after the first load, and serializes `load` and
//! `save` through one lock so concurrent callers always see a whole document.

use std::{
    fs,
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

use crate::fs::{config_dir, desktop_dir};

mod autostart;

pub use autostart::{Autostart, XdgAutostart};

const FILE_NAME: &str = "settings.json";

pub const DEFAULT_UI_SCALE_PERCENT: u32 = 100;
pub const DEFAULT_FONT_SIZE: u32 = 14;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Settings document {0} does not exist")]
    Missing(PathBuf),
    #[error("Could not access the settings document: {0}")]
    Io(#[from] io::Error),
    #[error("Settings document is malformed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The settings document. Unknown keys are ignored and missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Folder exports are written to. Blank means the desktop.
    pub export_folder: PathBuf,
    pub ui_scale_percent: u32,
    pub font_size: u32,
    pub enable_tray: bool,
    pub minimize_to_tray: bool,
    pub enable_notifications: bool,
    pub enable_autostart: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_folder: PathBuf::new(),
            ui_scale_percent: DEFAULT_UI_SCALE_PERCENT,
            font_size: DEFAULT_FONT_SIZE,
            enable_tray: true,
            minimize_to_tray: true,
            enable_notifications: false,
            enable_autostart: false,
        }
    }
}

impl Settings {
    /// Fill every field that is still unset with its default. `desktop` stands in for a blank
    /// export folder.
    pub fn fill_defaults(&mut self, desktop: &Path) {
        if self
            .export_folder
            .to_str()
            .is_some_and(|folder| folder.trim().is_empty())
        {
            self.export_folder = desktop.to_path_buf();
        }
        if self.ui_scale_percent == 0 {
            self.ui_scale_percent = DEFAULT_UI_SCALE_PERCENT;
        }
        if self.font_size == 0 {
            self.font_size = DEFAULT_FONT_SIZE;
        }
    }

    /// Bring the login entry in line with `enable_autostart`.
    pub fn apply_autostart(&self, autostart: &impl Autostart) -> io::Result<()> {
        match (self.enable_autostart, autostart.is_enabled()) {
            (true, false) => autostart.enable(),
            (false, true) => autostart.disable(),
            _ => Ok(()),
        }
    }
}

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    desktop: PathBuf,
    cache: RwLock<Option<Settings>>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            desktop: desktop_dir(),
            cache: RwLock::new(None),
        }
    }

    /// The store backed by `settings.json` in the per-user config directory.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(config_dir()?.join(FILE_NAME)))
    }

    /// Use `desktop` instead of the platform desktop when filling a blank export folder.
    pub fn with_desktop(mut self, desktop: impl Into<PathBuf>) -> Self {
        self.desktop = desktop.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The session's settings. The first call reads the document and fills defaults; later
    /// calls return the cached result. Read failures are returned and nothing is cached.
    pub fn load(&self) -> Result<Settings> {
        if let Some(settings) = self.cache.read().as_ref() {
            return Ok(settings.clone());
        }

        let mut cache = self.cache.write();
        if let Some(settings) = cache.as_ref() {
            return Ok(settings.clone());
        }

        let mut settings = self.read()?;
        settings.fill_defaults(&self.desktop);
        *cache = Some(settings.clone());

        Ok(settings)
    }

    /// Like [`load`](Self::load), but a missing or unreadable document is replaced with
    /// defaults, which are then cached for the session.
    pub fn load_or_default(&self) -> Settings {
        self.load().unwrap_or_else(|err| {
            match &err {
                Error::Missing(_) => info!("{err}, using defaults"),
                _ => warn!("{err}, using defaults"),
            }

            let mut settings = Settings::default();
            settings.fill_defaults(&self.desktop);
            *self.cache.write() = Some(settings.clone());

            settings
        })
    }

    /// Overwrite the document and make `settings` the cached value for the session.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let mut cache = self.cache.write();

        let contents = serde_json::to_string_pretty(settings)?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(contents.as_bytes())?;
        file.persist(&self.path).map_err(|e| e.error)?;

        *cache = Some(settings.clone());

        info!("Saved settings to {}", self.path.display());

        Ok(())
    }

    fn read(&self) -> Result<Settings> {
        let contents = fs::read_to_string(&self.path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => Error::Missing(self.path.clone()),
            _ => Error::Io(err),
        })?;

        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use super::*;

    fn store(dir: &Path) -> SettingsStore {
        SettingsStore::new(dir.join(FILE_NAME)).with_desktop(dir.join("Desktop"))
    }

    #[test]
    fn test_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        assert!(matches!(store.load(), Err(Error::Missing(_))));

        let settings = store.load_or_default();
        assert_eq!(settings.export_folder, dir.path().join("Desktop"));
        assert_eq!(settings.ui_scale_percent, 100);
        assert_eq!(settings.font_size, 14);
        assert!(settings.enable_tray);
    }

    #[test]
    fn test_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(FILE_NAME), "{ not json").unwrap();
        let store = store(dir.path());

        assert!(matches!(store.load(), Err(Error::Parse(_))));

        let settings = store.load_or_default();
        assert_eq!(settings.ui_scale_percent, 100);
        assert_eq!(settings.font_size, 14);
        assert_eq!(settings.export_folder, dir.path().join("Desktop"));

        // Defaults are now the session's settings
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_partial_document_is_filled() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(FILE_NAME),
            r#"{ "fontSize": 18, "exportFolder": "", "somethingElse": [1, 2] }"#,
        )
        .unwrap();

        let settings = store(dir.path()).load().unwrap();

        assert_eq!(settings.font_size, 18);
        assert_eq!(settings.ui_scale_percent, 100);
        assert_eq!(settings.export_folder, dir.path().join("Desktop"));
    }

    #[test]
    fn test_whitespace_export_folder_is_blank() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(FILE_NAME), r#"{ "exportFolder": "   " }"#).unwrap();

        let settings = store(dir.path()).load().unwrap();

        assert_eq!(settings.export_folder, dir.path().join("Desktop"));
    }

    #[test]
    fn test_save_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            export_folder: dir.path().join("exports"),
            ui_scale_percent: 125,
            enable_autostart: true,
            ..Settings::default()
        };

        store(dir.path()).save(&settings).unwrap();

        let contents = fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();
        assert!(contents.contains("\"uiScalePercent\": 125"));
        assert!(contents.contains("\"enableAutostart\": true"));

        assert_eq!(store(dir.path()).load().unwrap(), settings);
    }

    #[test]
    fn test_save_updates_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let mut settings = store.load_or_default();

        settings.font_size = 20;
        store.save(&settings).unwrap();

        assert_eq!(store.load().unwrap().font_size, 20);
    }

    #[test]
    fn test_load_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.save(&Settings::default()).unwrap();

        let first = store.load().unwrap();
        fs::write(store.path(), r#"{ "fontSize": 30 }"#).unwrap();

        assert_eq!(store.load().unwrap(), first);
    }

    struct FakeAutostart {
        enabled: Cell<bool>,
    }

    impl Autostart for FakeAutostart {
        fn enable(&self) -> io::Result<()> {
            self.enabled.set(true);
            Ok(())
        }

        fn disable(&self) -> io::Result<()> {
            self.enabled.set(false);
            Ok(())
        }

        fn is_enabled(&self) -> bool {
            self.enabled.get()
        }
    }

    #[test]
    fn test_apply_autostart() {
        let autostart = FakeAutostart {
            enabled: Cell::new(false),
        };
        let mut settings = Settings {
            enable_autostart: true,
            ..Settings::default()
        };

        settings.apply_autostart(&autostart).unwrap();
        assert!(autostart.is_enabled());

        settings.enable_autostart = false;
        settings.apply_autostart(&autostart).unwrap();
        assert!(!autostart.is_enabled());
    }
}
