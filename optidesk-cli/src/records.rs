//! Working-set plumbing shared by every record subcommand.

use std::path::PathBuf;

use colored::Colorize;
use optidesk_lib::{
    Exporter, Repository, Result, SettingsStore,
    export::Export,
    repository::{Entry, Error, Id, Record, WorkingSet},
};

pub fn list<T: Record>(repo: &Repository, render: impl Fn(&T) -> String) -> Result<()> {
    let set = WorkingSet::<T>::load(repo)?;

    for entry in set.iter() {
        print_entry(entry, &render);
    }

    Ok(())
}

pub fn print_entry<T>(entry: &Entry<T>, render: impl Fn(&T) -> String) {
    let id = entry.id().map_or(0, Id::get);
    println!("{} {}", format!("{id:>5}").dimmed(), render(entry.record()));
}

/// Add `record` to a fresh working set and save it, printing the identity it received.
pub fn add<T: Record>(repo: &Repository, record: T) -> Result<()> {
    let mut set = WorkingSet::<T>::load(repo)?;
    set.add(record);
    set.reconcile(repo)?;

    if let Some(id) = set.get(0).and_then(Entry::id) {
        println!("{} {} {id}", "Saved".green(), T::KIND);
    }

    Ok(())
}

/// Apply `change` to the stored record `id` and save it.
pub fn edit<T: Record>(repo: &Repository, id: u64, change: impl FnOnce(&mut T)) -> Result<()> {
    let id = Id::from(id);
    let mut set = WorkingSet::<T>::load(repo)?;
    let record = set
        .position(id)
        .and_then(|index| set.get_mut(index))
        .ok_or(Error::NotFound { kind: T::KIND, id })?;

    change(record);
    set.reconcile(repo)?;

    println!("{} {} {id}", "Updated".green(), T::KIND);

    Ok(())
}

pub fn delete<T: Record>(repo: &Repository, id: u64) -> Result<()> {
    let id = Id::from(id);
    let mut set = WorkingSet::<T>::load(repo)?;

    match set.position(id) {
        Some(index) => {
            set.delete(repo, index)?;
            println!("{} {} {id}", "Deleted".yellow(), T::KIND);
        }
        None => println!("{} {id} is already gone", T::KIND),
    }

    Ok(())
}

/// Export every stored record of kind `T` to `folder`, or to the configured export folder.
pub fn export<T: Export>(
    repo: &Repository,
    settings: &SettingsStore,
    folder: Option<PathBuf>,
) -> Result<()> {
    let folder = folder.unwrap_or_else(|| settings.load_or_default().export_folder);
    let set = WorkingSet::<T>::load(repo)?;

    let path = Exporter::new(folder).export(set.entries())?;
    println!("{} {}", "Exported to".green(), path.display());

    Ok(())
}

/// Turn a blank command-line value into "clear this field".
pub fn optional(value: String) -> Option<String> {
    Some(value).filter(|v| !v.trim().is_empty())
}
