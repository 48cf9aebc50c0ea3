use std::{cmp::Reverse, path::Path};

use tracing::debug;

use crate::{fs::data_dir, repository::db::Db};

mod db;

pub mod entities;
pub mod working_set;

pub use entities::{
    Client, Error, Id, Kind, MeridianOrder, MklOrder, PriceItem, Record, Result, Row, Violation,
};
pub use working_set::{Entry, WorkingSet};

const FILE_NAME: &str = "data.db";

/// One persistence action against a single kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Op<T> {
    Insert(T),
    Update(Id, T),
    Delete(Id),
}

/// Central access point for all persistent records.
///
/// The [`Repository`] owns the handle to the embedded store. Cloning it is cheap and every
/// clone shares the same handle; the store file is released once the last clone is dropped,
/// so a screen that opens a [`Repository`] for its lifetime gets scoped acquisition for free.
#[derive(Clone, Debug)]
pub struct Repository {
    db: Db,
}

impl Repository {
    /// Open (or create) the store at `path`, making sure the schema is present.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            db: Db::open(path.as_ref())?,
        })
    }

    /// Open the store in the per-user data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(data_dir()?.join(FILE_NAME))
    }

    pub fn ensure_schema(&self) -> Result<()> {
        self.db.ensure_schema()
    }

    /// Every stored record of kind `T`, most recently created first.
    pub fn list_all<T: Record>(&self) -> Result<Vec<Row<T>>> {
        let mut rows = self
            .db
            .models::<T::Model>(T::KIND)?
            .into_iter()
            .map(T::from_model)
            .collect::<Result<Vec<_>>>()?;

        rows.sort_by_key(|row| Reverse(row.id));

        Ok(rows)
    }

    pub fn get<T: Record>(&self, id: Id) -> Result<Option<T>> {
        Ok(self
            .list_all::<T>()?
            .into_iter()
            .find(|row| row.id == id)
            .map(|row| row.record))
    }

    /// Store a new record and return the identity it was given.
    pub fn insert<T: Record>(&self, record: T) -> Result<Id> {
        self.commit(vec![Op::Insert(record)])?
            .pop()
            .ok_or(Error::Corrupt {
                kind: T::KIND,
                field: "id",
            })
    }

    /// Replace every field of the stored row `id`.
    pub fn update<T: Record>(&self, id: Id, record: T) -> Result<()> {
        self.commit(vec![Op::Update(id, record)])?;

        Ok(())
    }

    /// Remove the row `id`. Removing a row that is not stored is not an error.
    pub fn delete<T: Record>(&self, id: Id) -> Result<()> {
        self.commit::<T>(vec![Op::Delete(id)])?;

        Ok(())
    }

    /// Apply `ops` in order as a single transaction and return the identities assigned to the
    /// inserted records, in insertion order.
    ///
    /// The batch is all-or-nothing: the first failing operation rolls back every operation
    /// before it.
    pub fn commit<T: Record>(&self, ops: Vec<Op<T>>) -> Result<Vec<Id>> {
        let kind = T::KIND;

        self.db.write().transaction_mut(|t| -> Result<Vec<Id>> {
            let mut assigned = Vec::new();

            for op in ops {
                match op {
                    Op::Insert(record) => {
                        let id = db::allocate_id(t, kind)?;
                        db::insert_element(t, kind, record.to_model(id)?)?;
                        debug!("Inserted {kind} {id}");
                        assigned.push(id);
                    }
                    Op::Update(id, record) => {
                        let db_id = db::find(t, kind, id)?.ok_or(Error::NotFound { kind, id })?;
                        let model = record.to_model(id)?;
                        // Replacing the element drops keys of fields that became empty
                        db::remove_element(t, db_id)?;
                        db::insert_element(t, kind, model)?;
                        debug!("Updated {kind} {id}");
                    }
                    Op::Delete(id) => {
                        if let Some(db_id) = db::find(t, kind, id)? {
                            db::remove_element(t, db_id)?;
                            debug!("Deleted {kind} {id}");
                        }
                    }
                }
            }

            Ok(assigned)
        })
    }

    /// Clients whose name or phone matches `query`, ordered by name for picking.
    pub fn search_clients(&self, query: &str) -> Result<Vec<Row<Client>>> {
        let mut rows: Vec<_> = self
            .list_all::<Client>()?
            .into_iter()
            .filter(|row| row.record.matches(query))
            .collect();

        rows.sort_by(|a, b| a.record.name.cmp(&b.record.name));

        Ok(rows)
    }

    /// Price positions whose supplier/brand or name matches `query`, ordered by supplier/brand
    /// then name for picking.
    pub fn search_price_items(&self, query: &str) -> Result<Vec<Row<PriceItem>>> {
        let mut rows: Vec<_> = self
            .list_all::<PriceItem>()?
            .into_iter()
            .filter(|row| row.record.matches(query))
            .collect();

        rows.sort_by(|a, b| {
            a.record
                .supplier_or_brand
                .cmp(&b.record.supplier_or_brand)
                .then_with(|| a.record.name.cmp(&b.record.name))
        });

        Ok(rows)
    }

    #[cfg(test)]
    /// Return a mock version of a [`Repository`] with an in-memory database.
    pub(crate) fn mock() -> Self {
        Self {
            db: Db::in_memory(),
        }
    }
}
