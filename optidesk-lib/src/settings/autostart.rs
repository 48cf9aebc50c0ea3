use std::{
    env, fs,
    io::{self, ErrorKind},
    path::PathBuf,
};

use tracing::debug;

use crate::fs::user_config_home;

const APP_NAME: &str = "OptiDesk";

/// Run-on-login registration for the current user.
pub trait Autostart {
    fn enable(&self) -> io::Result<()>;
    fn disable(&self) -> io::Result<()>;
    fn is_enabled(&self) -> bool;
}

/// Manages an entry in the XDG autostart directory (`$XDG_CONFIG_HOME/autostart`).
#[derive(Debug, Clone)]
pub struct XdgAutostart {
    entry: PathBuf,
    exec: PathBuf,
}

impl XdgAutostart {
    /// Register the running executable under the user's autostart directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self::with_paths(
            user_config_home()?.join("autostart"),
            env::current_exe()?,
        ))
    }

    pub fn with_paths(autostart_dir: impl Into<PathBuf>, exec: impl Into<PathBuf>) -> Self {
        Self {
            entry: autostart_dir.into().join("optidesk.desktop"),
            exec: exec.into(),
        }
    }

    fn desktop_entry(&self) -> String {
        format!(
            "[Desktop Entry]\nType=Application\nName={APP_NAME}\nExec=\"{}\"\nX-GNOME-Autostart-enabled=true\n",
            self.exec.display()
        )
    }
}

impl Autostart for XdgAutostart {
    fn enable(&self) -> io::Result<()> {
        if let Some(dir) = self.entry.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.entry, self.desktop_entry())?;

        debug!("Enabled autostart via {}", self.entry.display());

        Ok(())
    }

    fn disable(&self) -> io::Result<()> {
        match fs::remove_file(&self.entry) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
            _ => {
                debug!("Disabled autostart");
                Ok(())
            }
        }
    }

    fn is_enabled(&self) -> bool {
        self.entry.is_file()
    }
}
