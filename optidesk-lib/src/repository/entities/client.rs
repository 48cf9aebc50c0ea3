use crate::repository::{
    db::models::ClientModel,
    entities::{Id, Kind, Record, Result, Row, contains_ignore_case, optional, required},
};

/// An entry in the client directory.
///
/// Names are not unique; two clients may share one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Client {
    pub name: String,
    pub phone: Option<String>,
    pub note: Option<String>,
}

impl Client {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    /// Whether the client's name or phone contains `query`, ignoring case. A blank query
    /// matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();

        query.is_empty()
            || contains_ignore_case(Some(&self.name), &query)
            || contains_ignore_case(self.phone.as_deref(), &query)
    }
}

impl Record for Client {
    const KIND: Kind = Kind::Client;

    type Model = ClientModel;

    fn to_model(&self, id: Id) -> Result<ClientModel> {
        Ok(ClientModel {
            db_id: None,
            id: id.get(),
            name: required(Self::KIND, "name", &self.name)?,
            phone: optional(self.phone.as_deref()),
            note: optional(self.note.as_deref()),
        })
    }

    fn from_model(model: ClientModel) -> Result<Row<Self>> {
        Ok(Row {
            id: Id::from(model.id),
            record: Self {
                name: model.name,
                phone: model.phone,
                note: model.note,
            },
        })
    }
}

#[cfg(test)]
mod test {
    use crate::repository::{Error, Repository, Violation};

    use super::*;

    #[test]
    fn test_insert_list_delete() {
        let repo = Repository::mock();

        let id = repo
            .insert(Client::new("Иванов").with_phone("+7-900-000-00-00"))
            .unwrap();

        assert_eq!(id, Id::from(1));

        let clients = repo.list_all::<Client>().unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients.first().unwrap().id, id);
        assert_eq!(clients.first().unwrap().record.name, "Иванов");
        assert_eq!(
            clients.first().unwrap().record.phone.as_deref(),
            Some("+7-900-000-00-00")
        );

        repo.delete::<Client>(id).unwrap();

        assert!(repo.list_all::<Client>().unwrap().is_empty());
    }

    #[test]
    fn test_name_required() {
        let repo = Repository::mock();

        assert!(matches!(
            repo.insert(Client::new("  ")),
            Err(Error::Integrity {
                kind: Kind::Client,
                field: "name",
                violation: Violation::Missing,
            })
        ));
        assert!(repo.list_all::<Client>().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_names_allowed() {
        let repo = Repository::mock();

        repo.insert(Client::new("Петров")).unwrap();
        repo.insert(Client::new("Петров")).unwrap();

        assert_eq!(repo.list_all::<Client>().unwrap().len(), 2);
    }

    #[test]
    fn test_blank_optional_fields_are_absent() {
        let repo = Repository::mock();

        let id = repo
            .insert(Client::new("Сидоров").with_phone("   ").with_note(" VIP "))
            .unwrap();

        let client = repo.get::<Client>(id).unwrap().unwrap();
        assert_eq!(client.phone, None);
        assert_eq!(client.note.as_deref(), Some("VIP"));
    }

    #[test]
    fn test_matches() {
        let client = Client::new("Иванов Иван").with_phone("89123456789");

        assert!(client.matches("иван"));
        assert!(client.matches("456"));
        assert!(client.matches(""));
        assert!(!client.matches("петров"));
    }
}
