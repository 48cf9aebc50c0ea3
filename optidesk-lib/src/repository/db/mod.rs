use std::{path::Path, sync::Arc};

use agdb::{Comparison, DbAny, DbId, DbType, QueryBuilder, StorageData, TransactionMut};
use derive_more::Deref;
use parking_lot::RwLock;
use strum::IntoEnumIterator;
use tracing::info;

use crate::repository::entities::{Error, Id, Kind, Result};

pub(crate) mod models;

/// Value stored on every kind's root node holding the identity the next insert receives.
const NEXT_ID: &str = "next_id";

#[derive(Debug, Clone, Deref)]
pub(crate) struct Db {
    #[deref]
    db: Arc<RwLock<DbAny>>,
}

impl Db {
    pub fn open(path: &Path) -> Result<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;

        let db = Self {
            db: Arc::new(RwLock::new(DbAny::new_file(path_str)?)),
        };

        db.ensure_schema()?;

        info!("Opened record store at {}", path.display());

        Ok(db)
    }

    /// Create the root node and identity counter of every kind. Does nothing when they
    /// already exist, and never touches stored rows.
    pub fn ensure_schema(&self) -> Result<()> {
        let alias_count = self
            .db
            .read()
            .exec(QueryBuilder::select().aliases().query())?
            .result;

        if alias_count > 0 {
            return Ok(());
        }

        self.db.write().transaction_mut(|t| -> Result<()> {
            for kind in Kind::iter() {
                t.exec_mut(
                    QueryBuilder::insert()
                        .nodes()
                        .aliases(kind.alias())
                        .query(),
                )?;

                t.exec_mut(
                    QueryBuilder::insert()
                        .values([[(NEXT_ID, 1_u64).into()]])
                        .ids(kind.alias())
                        .query(),
                )?;
            }

            Ok(())
        })
    }

    /// All stored models of one kind, in no particular order.
    pub fn models<M: DbType<ValueType = M>>(&self, kind: Kind) -> Result<Vec<M>> {
        let models: Vec<M> = self
            .db
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<M>()
                    .search()
                    .from(kind.alias())
                    .where_()
                    .neighbor()
                    .query(),
            )?
            .try_into()?;

        Ok(models)
    }

    /// Create a memory backed database for use in tests
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        let db = Self {
            db: Arc::new(RwLock::new(DbAny::new_memory("test").unwrap())),
        };

        db.ensure_schema().unwrap();

        db
    }
}

/// Hand out the next identity of `kind` and advance the counter.
pub(crate) fn allocate_id<S: StorageData>(t: &mut TransactionMut<'_, S>, kind: Kind) -> Result<Id> {
    let next = t
        .exec(
            QueryBuilder::select()
                .values(NEXT_ID)
                .ids(kind.alias())
                .query(),
        )?
        .elements
        .pop()
        .and_then(|mut e| e.values.pop())
        .ok_or(Error::Corrupt {
            kind,
            field: NEXT_ID,
        })?
        .value
        .to_u64()?;

    t.exec_mut(
        QueryBuilder::insert()
            .values([[(NEXT_ID, next + 1).into()]])
            .ids(kind.alias())
            .query(),
    )?;

    Ok(Id::from(next))
}

/// Locate the element holding the row `id` of `kind`, if it is still stored.
pub(crate) fn find<S: StorageData>(
    t: &TransactionMut<'_, S>,
    kind: Kind,
    id: Id,
) -> Result<Option<DbId>> {
    Ok(t.exec(
        QueryBuilder::search()
            .from(kind.alias())
            .where_()
            .neighbor()
            .and()
            .key("id")
            .value(Comparison::Equal(id.get().into()))
            .query(),
    )?
    .elements
    .first()
    .map(|e| e.id))
}

/// Insert `model` as a new element and link it to its kind's root node.
pub(crate) fn insert_element<S: StorageData, M: DbType>(
    t: &mut TransactionMut<'_, S>,
    kind: Kind,
    model: M,
) -> Result<DbId> {
    let db_id = t
        .exec_mut(QueryBuilder::insert().element(model).query())?
        .elements
        .first()
        .ok_or(Error::Corrupt { kind, field: "id" })?
        .id;

    t.exec_mut(
        QueryBuilder::insert()
            .edges()
            .from(kind.alias())
            .to(db_id)
            .query(),
    )?;

    Ok(db_id)
}

pub(crate) fn remove_element<S: StorageData>(
    t: &mut TransactionMut<'_, S>,
    db_id: DbId,
) -> Result<()> {
    t.exec_mut(QueryBuilder::remove().ids(db_id).query())?;

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let db = Db::in_memory();

        db.ensure_schema().unwrap();
        db.ensure_schema().unwrap();

        let alias_count = db
            .read()
            .exec(QueryBuilder::select().aliases().query())
            .unwrap()
            .result;

        assert_eq!(alias_count, 4);
    }

    #[test]
    fn test_allocate_id_is_monotonic_per_kind() {
        let db = Db::in_memory();

        let ids = db
            .write()
            .transaction_mut(|t| -> Result<Vec<Id>> {
                Ok(vec![
                    allocate_id(t, Kind::Client)?,
                    allocate_id(t, Kind::Client)?,
                    allocate_id(t, Kind::PriceItem)?,
                ])
            })
            .unwrap();

        assert_eq!(ids, vec![Id::from(1), Id::from(2), Id::from(1)]);
    }
}
