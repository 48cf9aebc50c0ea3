use chrono::NaiveDateTime;

use crate::repository::{
    db::models::MeridianOrderModel,
    entities::{
        Client, Id, Kind, Record, Result, Row, format_timestamp, mkl_order::DEFAULT_STATUS, now,
        optional, parse_timestamp,
    },
};

pub const DEFAULT_SUPPLIER: &str = "Meridian";

/// An order placed with the Meridian supplier line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeridianOrder {
    pub client_name: String,
    pub supplier: String,
    pub lens_type: String,
    /// Line-specific parameters that have no dedicated field.
    pub special_fields: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub comment: Option<String>,
}

impl MeridianOrder {
    pub fn new(client_name: &str, lens_type: &str) -> Self {
        Self {
            client_name: client_name.to_string(),
            lens_type: lens_type.to_string(),
            ..Self::default()
        }
    }

    pub fn pick_client(&mut self, client: &Client) {
        self.client_name = client.name.clone();
    }
}

impl Default for MeridianOrder {
    fn default() -> Self {
        Self {
            client_name: String::new(),
            supplier: DEFAULT_SUPPLIER.to_string(),
            lens_type: String::new(),
            special_fields: None,
            status: DEFAULT_STATUS.to_string(),
            created_at: now(),
            comment: None,
        }
    }
}

impl Record for MeridianOrder {
    const KIND: Kind = Kind::MeridianOrder;

    type Model = MeridianOrderModel;

    fn to_model(&self, id: Id) -> Result<MeridianOrderModel> {
        Ok(MeridianOrderModel {
            db_id: None,
            id: id.get(),
            client_name: self.client_name.trim().to_string(),
            supplier: self.supplier.trim().to_string(),
            lens_type: self.lens_type.trim().to_string(),
            special_fields: optional(self.special_fields.as_deref()),
            status: self.status.trim().to_string(),
            created_at: format_timestamp(&self.created_at),
            comment: optional(self.comment.as_deref()),
        })
    }

    fn from_model(model: MeridianOrderModel) -> Result<Row<Self>> {
        Ok(Row {
            id: Id::from(model.id),
            record: Self {
                client_name: model.client_name,
                supplier: model.supplier,
                lens_type: model.lens_type,
                special_fields: model.special_fields,
                status: model.status,
                created_at: parse_timestamp(Self::KIND, "created_at", &model.created_at)?,
                comment: model.comment,
            },
        })
    }
}

#[cfg(test)]
mod test {
    use crate::repository::Repository;

    use super::*;

    #[test]
    fn test_defaults() {
        let order = MeridianOrder::new("Иванов", "Progressive 1.6");

        assert_eq!(order.supplier, "Meridian");
        assert_eq!(order.status, "New");
    }

    #[test]
    fn test_round_trip_through_store() {
        let repo = Repository::mock();
        let order = MeridianOrder {
            special_fields: Some("PD 62, coating: blue cut".into()),
            comment: Some("call before noon".into()),
            ..MeridianOrder::new("Иванов", "Progressive 1.6")
        };

        let id = repo.insert(order.clone()).unwrap();

        assert_eq!(repo.get::<MeridianOrder>(id).unwrap().unwrap(), order);
    }

    #[test]
    fn test_list_newest_first() {
        let repo = Repository::mock();

        repo.insert(MeridianOrder::new("A", "Single vision")).unwrap();
        repo.insert(MeridianOrder::new("B", "Single vision")).unwrap();
        repo.insert(MeridianOrder::new("C", "Single vision")).unwrap();

        let names: Vec<String> = repo
            .list_all::<MeridianOrder>()
            .unwrap()
            .into_iter()
            .map(|row| row.record.client_name)
            .collect();

        assert_eq!(names, vec!["C", "B", "A"]);
    }
}
