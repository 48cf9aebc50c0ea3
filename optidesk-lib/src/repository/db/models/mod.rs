//! Storage shapes of the four record kinds.
//!
//! Fixed-point values are kept as their invariant text and timestamps as sortable
//! `YYYY-MM-DDTHH:MM:SS` text, so nothing here depends on the host locale.

mod clients;
mod meridian_orders;
mod mkl_orders;
mod price_items;

pub use clients::ClientModel;
pub use meridian_orders::MeridianOrderModel;
pub use mkl_orders::MklOrderModel;
pub use price_items::PriceItemModel;
