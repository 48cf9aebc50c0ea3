//! Plain text snapshots of working sets.
//!
//! Every export writes one UTF-8 file named `<Prefix>_<YYYYMMDD_HHMMSS>.txt`: a header line
//! naming the columns, then one `;`-separated line per record. Numbers and timestamps are
//! formatted the same way regardless of the host locale.

use std::{
    borrow::Cow,
    fs,
    io::{self, BufWriter, ErrorKind, Write},
    path::PathBuf,
};

use chrono::{Local, NaiveDateTime};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::repository::{
    Client, Entry, MeridianOrder, MklOrder, PriceItem, Record, Row,
    entities::format_timestamp,
};

pub const DELIMITER: char = ';';

const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not write export file: {0}")]
    Io(#[from] io::Error),
}

/// How free-text fields containing the delimiter are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldEscaping {
    /// Fields containing `;`, `"` or a line break are wrapped in double quotes, with inner
    /// quotes doubled. Everything else is written as-is.
    #[default]
    Quoted,
    /// Fields are written verbatim. Lines with an embedded delimiter cannot be split back
    /// reliably.
    Raw,
}

impl FieldEscaping {
    fn apply(self, field: &str) -> Cow<'_, str> {
        match self {
            FieldEscaping::Quoted if field.contains([DELIMITER, '"', '\r', '\n']) => {
                Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
            }
            FieldEscaping::Quoted | FieldEscaping::Raw => Cow::Borrowed(field),
        }
    }
}

/// A record kind with a fixed text export layout.
pub trait Export: Record {
    /// Column names in declaration order, starting with `Id`.
    const HEADER: &'static [&'static str];

    /// Every column after `Id`, formatted. Absent values are empty strings.
    fn fields(&self) -> Vec<String>;
}

#[derive(Debug, Clone)]
pub struct Exporter {
    folder: PathBuf,
    escaping: FieldEscaping,
}

impl Exporter {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            escaping: FieldEscaping::default(),
        }
    }

    pub fn with_escaping(mut self, escaping: FieldEscaping) -> Self {
        self.escaping = escaping;
        self
    }

    /// Export a working set as it is in memory. Entries that were never saved get the id `0`.
    pub fn export<T: Export>(&self, entries: &[Entry<T>]) -> Result<PathBuf> {
        self.export_at(entries, Local::now().naive_local())
    }

    /// Export rows read straight from the store.
    pub fn export_rows<T: Export>(&self, rows: &[Row<T>]) -> Result<PathBuf> {
        let entries: Vec<Entry<T>> = rows.iter().cloned().map(Entry::from).collect();
        self.export(&entries)
    }

    pub(crate) fn export_at<T: Export>(
        &self,
        entries: &[Entry<T>],
        now: NaiveDateTime,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.folder)?;

        // Written next to the destination and renamed into place once complete
        let mut file = NamedTempFile::new_in(&self.folder)?;
        {
            let mut writer = BufWriter::new(&mut file);
            writeln!(writer, "{}", T::HEADER.join(DELIMITER.to_string().as_str()))?;

            for entry in entries {
                let id = entry.id().map_or(0, |id| id.get());
                let mut line = id.to_string();
                for field in entry.record().fields() {
                    line.push(DELIMITER);
                    line.push_str(&self.escaping.apply(&field));
                }
                writeln!(writer, "{line}")?;
            }

            writer.flush()?;
        }

        let stem = format!(
            "{}_{}",
            T::KIND.export_prefix(),
            now.format(FILE_TIMESTAMP_FORMAT)
        );

        // Taken names are skipped, including ones claimed by a concurrent export
        let mut n = 0_u32;
        let path = loop {
            let path = self.candidate_path(&stem, n);
            match file.persist_noclobber(&path) {
                Ok(_) => break std::path::absolute(path)?,
                Err(err) if err.error.kind() == ErrorKind::AlreadyExists => {
                    file = err.file;
                    n += 1;
                }
                Err(err) => return Err(err.error.into()),
            }
        };

        debug!("Exported {} {} records to {}", entries.len(), T::KIND, path.display());

        Ok(path)
    }

    /// `<stem>.txt` for the first candidate, `<stem>_<n>.txt` after that.
    fn candidate_path(&self, stem: &str, n: u32) -> PathBuf {
        match n {
            0 => self.folder.join(format!("{stem}.txt")),
            n => self.folder.join(format!("{stem}_{n}.txt")),
        }
    }
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn number(value: Option<impl ToString>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl Export for Client {
    const HEADER: &'static [&'static str] = &["Id", "Name", "Phone", "Note"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            text(self.phone.as_deref()),
            text(self.note.as_deref()),
        ]
    }
}

impl Export for MklOrder {
    const HEADER: &'static [&'static str] = &[
        "Id",
        "ClientName",
        "Brand",
        "Sphere",
        "Cylinder",
        "Axis",
        "Status",
        "CreatedAt",
        "Comment",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.client_name.clone(),
            self.brand.clone(),
            number(self.sphere),
            number(self.cylinder),
            number(self.axis),
            self.status.clone(),
            format_timestamp(&self.created_at),
            text(self.comment.as_deref()),
        ]
    }
}

impl Export for MeridianOrder {
    const HEADER: &'static [&'static str] = &[
        "Id",
        "ClientName",
        "Supplier",
        "LensType",
        "SpecialFields",
        "Status",
        "CreatedAt",
        "Comment",
    ];

    fn fields(&self) -> Vec<String> {
        vec![
            self.client_name.clone(),
            self.supplier.clone(),
            self.lens_type.clone(),
            text(self.special_fields.as_deref()),
            self.status.clone(),
            format_timestamp(&self.created_at),
            text(self.comment.as_deref()),
        ]
    }
}

impl Export for PriceItem {
    const HEADER: &'static [&'static str] = &["Id", "SupplierOrBrand", "Name", "Price", "Note"];

    fn fields(&self) -> Vec<String> {
        vec![
            self.supplier_or_brand.clone(),
            self.name.clone(),
            self.price.to_string(),
            text(self.note.as_deref()),
        ]
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use crate::repository::{Id, Repository, WorkingSet};

    use super::*;

    fn at(ts: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn toric() -> MklOrder {
        MklOrder {
            sphere: Some(Decimal::from_str("-2.25").unwrap()),
            cylinder: Some(Decimal::from_str("-0.75").unwrap()),
            axis: Some(180),
            created_at: at("2024-03-05T09:07:01"),
            ..MklOrder::new("Иванов", "Air Optix")
        }
    }

    #[test]
    fn test_header_and_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![
            Entry::Existing(Id::from(2), Client::new("Петров")),
            Entry::Existing(Id::from(1), Client::new("Иванов").with_phone("112")),
        ];

        let path = Exporter::new(dir.path())
            .export_at(&entries, at("2024-03-05T09:07:01"))
            .unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Clients_20240305_090701.txt"
        );

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines, vec!["Id;Name;Phone;Note", "2;Петров;;", "1;Иванов;112;"]);
    }

    #[test]
    fn test_mkl_line_is_invariant() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![Entry::Existing(Id::from(1), toric())];

        let path = Exporter::new(dir.path())
            .export_at(&entries, at("2024-03-05T10:00:00"))
            .unwrap();

        let contents = fs::read_to_string(path).unwrap();
        assert_eq!(
            contents,
            "Id;ClientName;Brand;Sphere;Cylinder;Axis;Status;CreatedAt;Comment\n\
             1;Иванов;Air Optix;-2.25;-0.75;180;New;2024-03-05T09:07:01;\n"
        );
    }

    #[test]
    fn test_unsaved_entries_export_zero_id() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![Entry::New(MeridianOrder {
            created_at: at("2024-03-05T09:07:01"),
            ..MeridianOrder::new("Иванов", "Progressive")
        })];

        let path = Exporter::new(dir.path()).export(&entries).unwrap();

        let contents = fs::read_to_string(path).unwrap();
        assert_eq!(
            contents.lines().nth(1).unwrap(),
            "0;Иванов;Meridian;Progressive;;New;2024-03-05T09:07:01;"
        );
    }

    #[test]
    fn test_repeated_export_gets_distinct_files() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let entries = vec![Entry::Existing(Id::from(1), Client::new("Иванов"))];
        let now = at("2024-03-05T09:07:01");

        let first = exporter.export_at(&entries, now).unwrap();
        let second = exporter.export_at(&entries, now).unwrap();

        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "Clients_20240305_090701_1.txt"
        );
        assert_eq!(
            fs::read_to_string(first).unwrap(),
            fs::read_to_string(second).unwrap()
        );
    }

    #[test]
    fn test_taken_names_are_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let taken = dir.path().join("Clients_20240305_090701.txt");
        let taken_1 = dir.path().join("Clients_20240305_090701_1.txt");
        fs::write(&taken, "someone else").unwrap();
        fs::write(&taken_1, "someone else").unwrap();

        let entries = vec![Entry::Existing(Id::from(1), Client::new("Иванов"))];
        let path = Exporter::new(dir.path())
            .export_at(&entries, at("2024-03-05T09:07:01"))
            .unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Clients_20240305_090701_2.txt"
        );
        assert_eq!(fs::read_to_string(taken).unwrap(), "someone else");
        assert_eq!(fs::read_to_string(taken_1).unwrap(), "someone else");
    }

    #[test]
    fn test_price_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::mock();
        repo.insert(PriceItem::new(
            "Alcon",
            "Dailies",
            Decimal::from_str("123.45").unwrap(),
        ))
        .unwrap();

        let path = Exporter::new(dir.path())
            .export_rows(&repo.list_all::<PriceItem>().unwrap())
            .unwrap();

        let contents = fs::read_to_string(path).unwrap();
        let price = contents
            .lines()
            .nth(1)
            .unwrap()
            .split(DELIMITER)
            .nth(3)
            .unwrap();

        assert_eq!(Decimal::from_str(price).unwrap(), Decimal::from_str("123.45").unwrap());
    }

    #[test]
    fn test_working_set_export_line_count() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::mock();
        for name in ["A", "B", "C"] {
            repo.insert(Client::new(name)).unwrap();
        }

        let mut set = WorkingSet::<Client>::load(&repo).unwrap();
        set.add(Client::new("D"));

        let path = Exporter::new(dir.path()).export(set.entries()).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap().lines().count(), 5);
    }

    #[test]
    fn test_quoted_escaping() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![Entry::Existing(
            Id::from(1),
            Client::new("Иванов").with_note("left; right \"pair\""),
        )];

        let path = Exporter::new(dir.path())
            .export_at(&entries, at("2024-03-05T09:07:01"))
            .unwrap();

        assert_eq!(
            fs::read_to_string(path).unwrap().lines().nth(1).unwrap(),
            "1;Иванов;;\"left; right \"\"pair\"\"\""
        );
    }

    #[test]
    fn test_raw_escaping() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![Entry::Existing(
            Id::from(1),
            Client::new("Иванов").with_note("left; right"),
        )];

        let path = Exporter::new(dir.path())
            .with_escaping(FieldEscaping::Raw)
            .export_at(&entries, at("2024-03-05T09:07:01"))
            .unwrap();

        assert_eq!(
            fs::read_to_string(path).unwrap().lines().nth(1).unwrap(),
            "1;Иванов;;left; right"
        );
    }

    #[test]
    fn test_creates_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("exports").join("today");

        let path = Exporter::new(&folder)
            .export::<Client>(&[])
            .unwrap();

        assert!(path.starts_with(&folder));
        assert_eq!(fs::read_to_string(path).unwrap(), "Id;Name;Phone;Note\n");
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_folder");
        fs::write(&blocker, "").unwrap();

        assert!(matches!(
            Exporter::new(&blocker).export::<Client>(&[]),
            Err(Error::Io(_))
        ));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
