use std::path::PathBuf;

use clap::Subcommand;
use optidesk_lib::{
    Repository, Result, SettingsStore,
    repository::{PriceItem, Row},
};
use rust_decimal::Decimal;

use crate::records::{self, optional};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the price list, newest first
    List,
    /// Add a position to the price list
    Add {
        supplier: String,
        name: String,
        price: Decimal,
        #[arg(long)]
        note: Option<String>,
    },
    /// Change a position; pass an empty note to clear it
    Edit {
        id: u64,
        #[arg(long)]
        supplier: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete a position
    Delete { id: u64 },
    /// Find positions by supplier or name
    Search { query: String },
    /// Export the price list to a text file
    Export {
        /// Destination folder instead of the configured export folder
        #[arg(long)]
        folder: Option<PathBuf>,
    },
}

pub fn handle(repo: &Repository, settings: &SettingsStore, cmd: &Command) -> Result<()> {
    match cmd {
        Command::List => records::list(repo, render),
        Command::Add {
            supplier,
            name,
            price,
            note,
        } => records::add(
            repo,
            PriceItem {
                note: note.clone(),
                ..PriceItem::new(supplier, name, *price)
            },
        ),
        Command::Edit {
            id,
            supplier,
            name,
            price,
            note,
        } => records::edit(repo, *id, |item: &mut PriceItem| {
            if let Some(supplier) = supplier {
                item.supplier_or_brand = supplier.clone();
            }
            if let Some(name) = name {
                item.name = name.clone();
            }
            if let Some(price) = price {
                item.price = *price;
            }
            if let Some(note) = note {
                item.note = optional(note.clone());
            }
        }),
        Command::Delete { id } => records::delete::<PriceItem>(repo, *id),
        Command::Search { query } => {
            for Row { id, record } in repo.search_price_items(query)? {
                println!("{id:>5} {}", render(&record));
            }
            Ok(())
        }
        Command::Export { folder } => records::export::<PriceItem>(repo, settings, folder.clone()),
    }
}

fn render(item: &PriceItem) -> String {
    format!(
        "{}  {}  {}  {}",
        item.supplier_or_brand,
        item.name,
        item.price,
        item.note.as_deref().unwrap_or("")
    )
}
