use std::path::PathBuf;

use clap::Subcommand;
use optidesk_lib::{
    Repository, Result, SettingsStore,
    repository::{Client, Row},
};

use crate::records::{self, optional};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List clients, newest first
    List,
    /// Add a new client
    Add {
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Change a client; pass an empty value to clear a field
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete a client
    Delete { id: u64 },
    /// Find clients by name or phone
    Search { query: String },
    /// Export the client directory to a text file
    Export {
        /// Destination folder instead of the configured export folder
        #[arg(long)]
        folder: Option<PathBuf>,
    },
}

pub fn handle(repo: &Repository, settings: &SettingsStore, cmd: &Command) -> Result<()> {
    match cmd {
        Command::List => records::list(repo, render),
        Command::Add { name, phone, note } => records::add(
            repo,
            Client {
                name: name.clone(),
                phone: phone.clone(),
                note: note.clone(),
            },
        ),
        Command::Edit {
            id,
            name,
            phone,
            note,
        } => records::edit(repo, *id, |client: &mut Client| {
            if let Some(name) = name {
                client.name = name.clone();
            }
            if let Some(phone) = phone {
                client.phone = optional(phone.clone());
            }
            if let Some(note) = note {
                client.note = optional(note.clone());
            }
        }),
        Command::Delete { id } => records::delete::<Client>(repo, *id),
        Command::Search { query } => {
            for Row { id, record } in repo.search_clients(query)? {
                println!("{id:>5} {}", render(&record));
            }
            Ok(())
        }
        Command::Export { folder } => records::export::<Client>(repo, settings, folder.clone()),
    }
}

fn render(client: &Client) -> String {
    format!(
        "{}  {}  {}",
        client.name,
        client.phone.as_deref().unwrap_or("-"),
        client.note.as_deref().unwrap_or("")
    )
}
