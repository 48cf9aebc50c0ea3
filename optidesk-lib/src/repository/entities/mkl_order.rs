use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::repository::{
    db::models::MklOrderModel,
    entities::{
        Client, Error, Id, Kind, Precision, PriceItem, Record, Result, Row, Violation,
        format_timestamp, now, optional, parse_decimal, parse_timestamp,
    },
};

pub const DEFAULT_STATUS: &str = "New";

const MAX_AXIS: i32 = 180;

/// An order for soft contact lenses, including toric ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MklOrder {
    /// Free text; kept even if the client is later renamed or removed.
    pub client_name: String,
    pub brand: String,
    pub sphere: Option<Decimal>,
    pub cylinder: Option<Decimal>,
    pub axis: Option<i32>,
    pub status: String,
    /// Captured when the order is created and never touched by later updates.
    pub created_at: NaiveDateTime,
    pub comment: Option<String>,
}

impl MklOrder {
    pub fn new(client_name: &str, brand: &str) -> Self {
        Self {
            client_name: client_name.to_string(),
            brand: brand.to_string(),
            ..Self::default()
        }
    }

    pub fn pick_client(&mut self, client: &Client) {
        self.client_name = client.name.clone();
    }

    /// Take a position from the price list: the brand is filled in when still empty, and the
    /// position is noted in the comment.
    pub fn pick_product(&mut self, item: &PriceItem) {
        if self.brand.trim().is_empty() {
            self.brand = item.supplier_or_brand.clone();
        }

        self.append_comment(&format!("{} ({})", item.name, item.price));
    }

    pub fn append_comment(&mut self, text: &str) {
        self.comment = Some(match self.comment.take().filter(|c| !c.trim().is_empty()) {
            Some(existing) => format!("{existing}, {text}"),
            None => text.to_string(),
        });
    }
}

impl Default for MklOrder {
    fn default() -> Self {
        Self {
            client_name: String::new(),
            brand: String::new(),
            sphere: None,
            cylinder: None,
            axis: None,
            status: DEFAULT_STATUS.to_string(),
            created_at: now(),
            comment: None,
        }
    }
}

impl Record for MklOrder {
    const KIND: Kind = Kind::MklOrder;

    type Model = MklOrderModel;

    fn to_model(&self, id: Id) -> Result<MklOrderModel> {
        let diopters = |field, value: Option<Decimal>| {
            value
                .map(|v| Precision::DIOPTERS.fit(Self::KIND, field, v))
                .transpose()
                .map(|v| v.map(|v| v.to_string()))
        };

        if let Some(axis) = self.axis.filter(|a| !(0..=MAX_AXIS).contains(a)) {
            return Err(Error::Integrity {
                kind: Self::KIND,
                field: "axis",
                violation: Violation::OutOfRange(axis.to_string()),
            });
        }

        Ok(MklOrderModel {
            db_id: None,
            id: id.get(),
            client_name: self.client_name.trim().to_string(),
            brand: self.brand.trim().to_string(),
            sphere: diopters("sphere", self.sphere)?,
            cylinder: diopters("cylinder", self.cylinder)?,
            axis: self.axis.map(i64::from),
            status: self.status.trim().to_string(),
            created_at: format_timestamp(&self.created_at),
            comment: optional(self.comment.as_deref()),
        })
    }

    fn from_model(model: MklOrderModel) -> Result<Row<Self>> {
        let decimal = |field, value: Option<String>| {
            value
                .map(|v| parse_decimal(Self::KIND, field, &v))
                .transpose()
        };

        let axis = model
            .axis
            .map(i32::try_from)
            .transpose()
            .map_err(|_| Error::Corrupt {
                kind: Self::KIND,
                field: "axis",
            })?;

        Ok(Row {
            id: Id::from(model.id),
            record: Self {
                client_name: model.client_name,
                brand: model.brand,
                sphere: decimal("sphere", model.sphere)?,
                cylinder: decimal("cylinder", model.cylinder)?,
                axis,
                status: model.status,
                created_at: parse_timestamp(Self::KIND, "created_at", &model.created_at)?,
                comment: model.comment,
            },
        })
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use crate::repository::Repository;

    use super::*;

    fn toric() -> MklOrder {
        MklOrder {
            sphere: Some(Decimal::from_str("-2.25").unwrap()),
            cylinder: Some(Decimal::from_str("-0.75").unwrap()),
            axis: Some(180),
            ..MklOrder::new("Иванов Иван Иванович", "Air Optix for Astigmatism")
        }
    }

    #[test]
    fn test_defaults() {
        let order = MklOrder::default();

        assert_eq!(order.status, "New");
        assert_eq!(order.sphere, None);
        assert_eq!(order.comment, None);
    }

    #[test]
    fn test_round_trip_through_store() {
        let repo = Repository::mock();
        let order = toric();

        let id = repo.insert(order.clone()).unwrap();
        let stored = repo.get::<MklOrder>(id).unwrap().unwrap();

        assert_eq!(stored, order);
    }

    #[test]
    fn test_update_keeps_created_at() {
        let repo = Repository::mock();
        let order = toric();
        let id = repo.insert(order.clone()).unwrap();

        let mut edited = repo.get::<MklOrder>(id).unwrap().unwrap();
        edited.status = "Ordered".into();
        repo.update(id, edited).unwrap();

        let stored = repo.get::<MklOrder>(id).unwrap().unwrap();
        assert_eq!(stored.status, "Ordered");
        assert_eq!(stored.created_at, order.created_at);
        assert_eq!(repo.list_all::<MklOrder>().unwrap().len(), 1);
    }

    #[test]
    fn test_update_clears_optional_fields() {
        let repo = Repository::mock();
        let id = repo.insert(toric()).unwrap();

        let mut edited = repo.get::<MklOrder>(id).unwrap().unwrap();
        edited.cylinder = None;
        edited.axis = None;
        repo.update(id, edited).unwrap();

        let stored = repo.get::<MklOrder>(id).unwrap().unwrap();
        assert_eq!(stored.cylinder, None);
        assert_eq!(stored.axis, None);
        assert_eq!(stored.sphere, Some(Decimal::from_str("-2.25").unwrap()));
    }

    #[test]
    fn test_axis_out_of_range() {
        let repo = Repository::mock();
        let order = MklOrder {
            axis: Some(181),
            ..toric()
        };

        assert!(matches!(
            repo.insert(order),
            Err(Error::Integrity { field: "axis", .. })
        ));
    }

    #[test]
    fn test_pick_product() {
        let mut order = MklOrder::new("Петров", "");
        let item = PriceItem::new(
            "Alcon",
            "Air Optix Aqua",
            Decimal::from_str("1450.00").unwrap(),
        );

        order.pick_product(&item);
        order.pick_product(&item);

        assert_eq!(order.brand, "Alcon");
        assert_eq!(
            order.comment.as_deref(),
            Some("Air Optix Aqua (1450.00), Air Optix Aqua (1450.00)")
        );
    }

    #[test]
    fn test_pick_client() {
        let mut order = MklOrder::default();
        order.pick_client(&Client::new("Сидоров"));

        assert_eq!(order.client_name, "Сидоров");
    }
}
