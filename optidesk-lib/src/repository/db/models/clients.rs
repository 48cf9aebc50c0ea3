use agdb::{DbElement, DbId};

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub struct ClientModel {
    pub(crate) db_id: Option<DbId>,
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) phone: Option<String>,
    pub(crate) note: Option<String>,
}
