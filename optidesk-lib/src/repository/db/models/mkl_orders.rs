use agdb::{DbElement, DbId};

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub struct MklOrderModel {
    pub(crate) db_id: Option<DbId>,
    pub(crate) id: u64,
    /// Denormalized client name, not a reference to a client row
    pub(crate) client_name: String,
    pub(crate) brand: String,
    pub(crate) sphere: Option<String>,
    pub(crate) cylinder: Option<String>,
    pub(crate) axis: Option<i64>,
    pub(crate) status: String,
    pub(crate) created_at: String,
    pub(crate) comment: Option<String>,
}
