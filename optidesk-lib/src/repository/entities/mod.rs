//! Core domain records for OptiDesk.
//!
//! These types represent clients, the two order lines and the price list. They are plain
//! values: reading and writing them goes through the [`Repository`](crate::Repository), which
//! converts them to and from their storage models.

use std::{fmt::Debug, path::PathBuf, str::FromStr};

use agdb::DbType;
use chrono::{Local, NaiveDateTime, SubsecRound};
use derive_more::{Display, From};
use rust_decimal::{Decimal, RoundingStrategy};
use strum::{Display as StrumDisplay, EnumIter};
use thiserror::Error;

mod client;
mod meridian_order;
mod mkl_order;
mod price_item;

pub use client::Client;
pub use meridian_order::MeridianOrder;
pub use mkl_order::MklOrder;
pub use price_item::PriceItem;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Internal database error {0}")]
    Internal(#[from] agdb::DbError),
    #[error("Could not prepare the database location: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database path {0} is not valid UTF-8")]
    InvalidPath(PathBuf),
    #[error("{kind}.{field}: {violation}")]
    Integrity {
        kind: Kind,
        field: &'static str,
        violation: Violation,
    },
    #[error("{kind} with id {id} does not exist")]
    NotFound { kind: Kind, id: Id },
    #[error("Stored {kind} has a malformed `{field}` value")]
    Corrupt { kind: Kind, field: &'static str },
}

/// The reason a record was rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("a value is required")]
    Missing,
    #[error("{0} does not fit the column precision")]
    OutOfRange(String),
}

/// Store-assigned identity of a persisted record. Identities start at 1 and are never reused
/// within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From)]
pub struct Id(u64);

impl Id {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// One of the four record types kept by OptiDesk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter)]
pub enum Kind {
    Client,
    MklOrder,
    MeridianOrder,
    PriceItem,
}

impl Kind {
    /// Name of the root node every row of this kind hangs off.
    pub(crate) fn alias(self) -> &'static str {
        match self {
            Kind::Client => "clients",
            Kind::MklOrder => "mkl_orders",
            Kind::MeridianOrder => "meridian_orders",
            Kind::PriceItem => "price_items",
        }
    }

    /// File name prefix used when a working set of this kind is exported.
    pub fn export_prefix(self) -> &'static str {
        match self {
            Kind::Client => "Clients",
            Kind::MklOrder => "OrdersMKL",
            Kind::MeridianOrder => "OrdersMeridian",
            Kind::PriceItem => "PriceItems",
        }
    }
}

/// A persisted record together with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<T> {
    pub id: Id,
    pub record: T,
}

/// A record type that can be persisted by the [`Repository`](crate::Repository).
pub trait Record: Clone + Debug + PartialEq + Sized {
    const KIND: Kind;

    /// The shape this record takes inside the database.
    type Model: DbType<ValueType = Self::Model>;

    /// Validate and normalize the record into its storage model under the given identity.
    fn to_model(&self, id: Id) -> Result<Self::Model>;

    fn from_model(model: Self::Model) -> Result<Row<Self>>;
}

/// Column precision for fixed-point fields, in the `(digits, scale)` sense of SQL `DECIMAL`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Precision {
    digits: u32,
    scale: u32,
}

impl Precision {
    /// Sphere and cylinder powers.
    pub(crate) const DIOPTERS: Self = Self {
        digits: 6,
        scale: 2,
    };
    pub(crate) const MONEY: Self = Self {
        digits: 10,
        scale: 2,
    };

    /// Round `value` to the column scale, rejecting it if the integer part overflows.
    pub(crate) fn fit(self, kind: Kind, field: &'static str, value: Decimal) -> Result<Decimal> {
        let rounded = value.round_dp_with_strategy(self.scale, RoundingStrategy::MidpointAwayFromZero);
        let limit = Decimal::from(10_u64.pow(self.digits - self.scale));

        if rounded.abs() >= limit {
            return Err(Error::Integrity {
                kind,
                field,
                violation: Violation::OutOfRange(value.to_string()),
            });
        }

        Ok(rounded)
    }
}

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Local wall-clock time at the precision timestamps are stored with.
pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

pub(crate) fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(
    kind: Kind,
    field: &'static str,
    value: &str,
) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|_| Error::Corrupt { kind, field })
}

pub(crate) fn parse_decimal(kind: Kind, field: &'static str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|_| Error::Corrupt { kind, field })
}

/// Trim a required text field, rejecting it when nothing is left.
pub(crate) fn required(kind: Kind, field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Integrity {
            kind,
            field,
            violation: Violation::Missing,
        });
    }

    Ok(value.to_string())
}

/// Trim an optional text field; blank values are stored as absent.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Case-insensitive substring match used by the pickers.
pub(crate) fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}
