use std::{
    fs::create_dir_all,
    io::{self, ErrorKind},
    path::PathBuf,
};

use xdg::BaseDirectories;

/// Returns the path to the OptiDesk configuration directory. If it doesn't exist when this
/// function is called, it will be created.
pub fn config_dir() -> io::Result<PathBuf> {
    let path = xdg_prefix().get_config_home().ok_or_else(missing_home)?;

    create_dir_all(&path)?;

    Ok(path)
}

/// Returns the path to the OptiDesk data directory. If it doesn't exist when this function is
/// called, it will be created.
pub fn data_dir() -> io::Result<PathBuf> {
    let path = xdg_prefix().get_data_home().ok_or_else(missing_home)?;

    create_dir_all(&path)?;

    Ok(path)
}

/// Returns the user's XDG config home without the OptiDesk prefix, e.g. for the `autostart`
/// directory shared between applications.
pub fn user_config_home() -> io::Result<PathBuf> {
    BaseDirectories::new()
        .get_config_home()
        .ok_or_else(missing_home)
}

/// Default destination for exports: the desktop if the platform has one, otherwise the home
/// directory.
pub fn desktop_dir() -> PathBuf {
    dirs::desktop_dir()
        .filter(|dir| dir.exists())
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn xdg_prefix() -> BaseDirectories {
    BaseDirectories::with_prefix("optidesk")
}

fn missing_home() -> io::Error {
    io::Error::new(ErrorKind::NotFound, "$HOME must exist")
}
