use std::path::PathBuf;

use clap::Subcommand;
use optidesk_lib::{
    Repository, Result, SettingsStore,
    repository::{Client, Error, Id, Kind, MklOrder, PriceItem},
};
use rust_decimal::Decimal;

use crate::records::{self, optional};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List orders, newest first
    List,
    /// Add a new order
    Add {
        client: String,
        brand: String,
        #[arg(long, allow_hyphen_values = true)]
        sphere: Option<Decimal>,
        #[arg(long, allow_hyphen_values = true)]
        cylinder: Option<Decimal>,
        #[arg(long)]
        axis: Option<i32>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Change an order; pass an empty comment to clear it
    Edit {
        id: u64,
        #[arg(long)]
        client: Option<String>,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        sphere: Option<Decimal>,
        #[arg(long, allow_hyphen_values = true)]
        cylinder: Option<Decimal>,
        #[arg(long)]
        axis: Option<i32>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Take a client from the directory for an order
    PickClient { id: u64, client_id: u64 },
    /// Take a position from the price list for an order
    PickProduct { id: u64, price_id: u64 },
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
            brand,
            sphere,
            cylinder,
            axis,
            comment,
        } => records::add(
            repo,
            MklOrder {
                sphere: *sphere,
                cylinder: *cylinder,
                axis: *axis,
                comment: comment.clone(),
                ..MklOrder::new(client, brand)
            },
        ),
        Command::Edit {
            id,
            client,
            brand,
            sphere,
            cylinder,
            axis,
            status,
            comment,
        } => records::edit(repo, *id, |order: &mut MklOrder| {
            if let Some(client) = client {
                order.client_name = client.clone();
            }
            if let Some(brand) = brand {
                order.brand = brand.clone();
            }
            if sphere.is_some() {
                order.sphere = *sphere;
            }
            if cylinder.is_some() {
                order.cylinder = *cylinder;
            }
            if axis.is_some() {
                order.axis = *axis;
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

            records::edit(repo, *id, |order: &mut MklOrder| order.pick_client(&client))
        }
        Command::PickProduct { id, price_id } => {
            let price_id = Id::from(*price_id);
            let item: PriceItem = repo.get(price_id)?.ok_or(Error::NotFound {
                kind: Kind::PriceItem,
                id: price_id,
            })?;

            records::edit(repo, *id, |order: &mut MklOrder| order.pick_product(&item))
        }
        Command::Delete { id } => records::delete::<MklOrder>(repo, *id),
        Command::Export { folder } => records::export::<MklOrder>(repo, settings, folder.clone()),
    }
}

fn render(order: &MklOrder) -> String {
    let power = |value: Option<Decimal>| value.map_or("-".to_string(), |v| v.to_string());

    format!(
        "{}  {}  {}  {}  {}  {} [{}] {}",
        order.created_at.format("%Y-%m-%d %H:%M"),
        order.client_name,
        order.brand,
        power(order.sphere),
        power(order.cylinder),
        order.axis.map_or("-".to_string(), |a| a.to_string()),
        order.status,
        order.comment.as_deref().unwrap_or("")
    )
}
