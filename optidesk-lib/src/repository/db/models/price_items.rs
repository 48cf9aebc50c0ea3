use agdb::{DbElement, DbId};

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub struct PriceItemModel {
    pub(crate) db_id: Option<DbId>,
    pub(crate) id: u64,
    pub(crate) supplier_or_brand: String,
    pub(crate) name: String,
    pub(crate) price: String,
    pub(crate) note: Option<String>,
}
