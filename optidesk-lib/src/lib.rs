//! Persistence layer of the OptiDesk order desk: a record store for clients, contact lens
//! orders and the price list, reconciliation of edited working sets, text exports and user
//! settings.

use thiserror::Error;

pub mod export;
pub mod fs;
pub mod repository;
pub mod settings;

pub use export::{Exporter, FieldEscaping};
pub use repository::Repository;
pub use settings::{Settings, SettingsStore};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Repository(#[from] repository::Error),
    #[error(transparent)]
    Export(#[from] export::Error),
    #[error(transparent)]
    Settings(#[from] settings::Error),
}
