use std::path::PathBuf;

use clap::Subcommand;
use optidesk_lib::{
    Repository, Result, SettingsStore,
    repository::{Client, Error, Id, Kind, MeridianOrder},
};

use crate::records::{self, optional};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List orders, newest first
    List,
    /// Add a new order
    Add {
        client: String,
        lens_type: String,
        #[arg(long)]
        supplier: Option<String>,
        /// Line-specific parameters
        #[arg(long)]
        special: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Change an order; pass an empty value to clear an optional field
    Edit {
        id: u64,
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        lens_type: Option<String>,
        #[arg(long)]
        supplier: Option<String>,
        #[arg(long)]
        special: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Take a client from the directory for an order
    PickClient { id: u64, client_id: u64 },
    /// Delete an order
    Delete { id: u64 },
    /// Export all orders to a text file
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
            client,
            lens_type,
            supplier,
            special,
            comment,
        } => {
            let mut order = MeridianOrder::new(client, lens_type);
            if let Some(supplier) = supplier {
                order.supplier = supplier.clone();
            }
            order.special_fields = special.clone();
            order.comment = comment.clone();

            records::add(repo, order)
        }
        Command::Edit {
            id,
            client,
            lens_type,
            supplier,
            special,
            status,
            comment,
        } => records::edit(repo, *id, |order: &mut MeridianOrder| {
            if let Some(client) = client {
                order.client_name = client.clone();
            }
            if let Some(lens_type) = lens_type {
                order.lens_type = lens_type.clone();
            }
            if let Some(supplier) = supplier {
                order.supplier = supplier.clone();
            }
            if let Some(special) = special {
                order.special_fields = optional(special.clone());
            }
            if let Some(status) = status {
                order.status = status.clone();
            }
            if let Some(comment) = comment {
                order.comment = optional(comment.clone());
            }
        }),
        Command::PickClient { id, client_id } => {
            let client_id = Id::from(*client_id);
            let client: Client = repo.get(client_id)?.ok_or(Error::NotFound {
                kind: Kind::Client,
                id: client_id,
            })?;

            records::edit(repo, *id, |order: &mut MeridianOrder| {
                order.pick_client(&client);
            })
        }
        Command::Delete { id } => records::delete::<MeridianOrder>(repo, *id),
        Command::Export { folder } => {
            records::export::<MeridianOrder>(repo, settings, folder.clone())
        }
    }
}

fn render(order: &MeridianOrder) -> String {
    format!(
        "{}  {}  {}  {}  {} [{}] {}",
        order.created_at.format("%Y-%m-%d %H:%M"),
        order.client_name,
        order.supplier,
        order.lens_type,
        order.special_fields.as_deref().unwrap_or("-"),
        order.status,
        order.comment.as_deref().unwrap_or("")
    )
}
