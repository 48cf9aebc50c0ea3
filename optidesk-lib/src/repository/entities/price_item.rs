use rust_decimal::Decimal;

use crate::repository::{
    db::models::PriceItemModel,
    entities::{
        Id, Kind, Precision, Record, Result, Row, contains_ignore_case, optional, parse_decimal,
        required,
    },
};

/// A position in the price list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceItem {
    pub supplier_or_brand: String,
    pub name: String,
    pub price: Decimal,
    pub note: Option<String>,
}

impl PriceItem {
    pub fn new(supplier_or_brand: &str, name: &str, price: Decimal) -> Self {
        Self {
            supplier_or_brand: supplier_or_brand.to_string(),
            name: name.to_string(),
            price,
            note: None,
        }
    }

    /// Whether the supplier/brand or the name contains `query`, ignoring case. A blank query
    /// matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();

        query.is_empty()
            || contains_ignore_case(Some(&self.supplier_or_brand), &query)
            || contains_ignore_case(Some(&self.name), &query)
    }
}

impl Record for PriceItem {
    const KIND: Kind = Kind::PriceItem;

    type Model = PriceItemModel;

    fn to_model(&self, id: Id) -> Result<PriceItemModel> {
        Ok(PriceItemModel {
            db_id: None,
            id: id.get(),
            supplier_or_brand: self.supplier_or_brand.trim().to_string(),
            name: required(Self::KIND, "name", &self.name)?,
            price: Precision::MONEY
                .fit(Self::KIND, "price", self.price)?
                .to_string(),
            note: optional(self.note.as_deref()),
        })
    }

    fn from_model(model: PriceItemModel) -> Result<Row<Self>> {
        Ok(Row {
            id: Id::from(model.id),
            record: Self {
                supplier_or_brand: model.supplier_or_brand,
                name: model.name,
                price: parse_decimal(Self::KIND, "price", &model.price)?,
                note: model.note,
            },
        })
    }
}
