//! In-memory editing of a collection of records.
//!
//! A [`WorkingSet`] is a snapshot loaded from the [`Repository`]. Callers add and edit entries
//! locally, then [`reconcile`](WorkingSet::reconcile) to write back only what changed.
//! Concurrent changes to the store made after the snapshot was taken are not detected; the last
//! save wins.

use std::collections::HashMap;

use tracing::debug;

use crate::repository::{Id, Op, Record, Repository, Result, Row};

/// An entry of a working set, tagged by whether it has been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<T> {
    /// Created in memory and never stored.
    New(T),
    /// Loaded from, or already written to, the store under this identity.
    Existing(Id, T),
}

impl<T> Entry<T> {
    pub fn id(&self) -> Option<Id> {
        match self {
            Entry::New(_) => None,
            Entry::Existing(id, _) => Some(*id),
        }
    }

    pub fn record(&self) -> &T {
        match self {
            Entry::New(record) | Entry::Existing(_, record) => record,
        }
    }

    pub fn record_mut(&mut self) -> &mut T {
        match self {
            Entry::New(record) | Entry::Existing(_, record) => record,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Entry::New(_))
    }
}

impl<T> From<Row<T>> for Entry<T> {
    fn from(row: Row<T>) -> Self {
        Entry::Existing(row.id, row.record)
    }
}

#[derive(Debug, Clone)]
pub struct WorkingSet<T> {
    entries: Vec<Entry<T>>,
    /// Stored records as of the last load, keyed by identity.
    loaded: HashMap<Id, T>,
}

impl<T: Record> WorkingSet<T> {
    /// Snapshot every stored record of kind `T`, most recently created first.
    pub fn load(repo: &Repository) -> Result<Self> {
        let rows = repo.list_all::<T>()?;

        Ok(Self {
            loaded: rows
                .iter()
                .map(|row| (row.id, row.record.clone()))
                .collect(),
            entries: rows.into_iter().map(Entry::from).collect(),
        })
    }

    pub fn entries(&self) -> &[Entry<T>] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry<T>> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).map(Entry::record_mut)
    }

    /// Position of the persisted entry `id`, if it is part of this set.
    pub fn position(&self, id: Id) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == Some(id))
    }

    /// Add an unsaved record at the top of the set and return its index.
    pub fn add(&mut self, record: T) -> usize {
        self.entries.insert(0, Entry::New(record));
        0
    }

    /// Remove the entry at `index` from the set. A persisted entry is deleted from the store
    /// as well; an unsaved one is simply dropped.
    pub fn delete(&mut self, repo: &Repository, index: usize) -> Result<Option<Entry<T>>> {
        let Some(id) = self.entries.get(index).map(Entry::id) else {
            return Ok(None);
        };

        if let Some(id) = id {
            repo.delete::<T>(id)?;
            self.loaded.remove(&id);
        }

        Ok(Some(self.entries.remove(index)))
    }

    /// The writes a [`reconcile`](Self::reconcile) would issue: an insert per new entry and an
    /// update per persisted entry that differs from what was loaded.
    pub fn changes(&self) -> Vec<Op<T>> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::New(record) => Some(Op::Insert(record.clone())),
                Entry::Existing(id, record) if self.loaded.get(id) != Some(record) => {
                    Some(Op::Update(*id, record.clone()))
                }
                Entry::Existing(..) => None,
            })
            .collect()
    }

    /// Write the pending [`changes`](Self::changes) to the store and replace the set with a
    /// fresh snapshot so assigned identities are reflected. Untouched entries are not written.
    ///
    /// All writes happen in one transaction. If any of them fails nothing is written and the
    /// set is left untouched, so reconciling again never inserts an entry twice.
    pub fn reconcile(&mut self, repo: &Repository) -> Result<()> {
        let ops = self.changes();
        let total = ops.len();

        if total > 0 {
            let inserted = repo.commit(ops)?.len();
            debug!(
                "Reconciled {} working set: {inserted} inserted, {} updated",
                T::KIND,
                total - inserted
            );
        }

        *self = Self::load(repo)?;

        Ok(())
    }
}
