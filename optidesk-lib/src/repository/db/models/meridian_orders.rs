use agdb::{DbElement, DbId};

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub struct MeridianOrderModel {
    pub(crate) db_id: Option<DbId>,
    pub(crate) id: u64,
    pub(crate) client_name: String,
    pub(crate) supplier: String,
    pub(crate) lens_type: String,
    /// Line-specific data that has no column of its own
    pub(crate) special_fields: Option<String>,
    pub(crate) status: String,
    pub(crate) created_at: String,
    pub(crate) comment: Option<String>,
}
