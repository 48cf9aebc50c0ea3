use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;
use optidesk_lib::{
    Result, Settings, SettingsStore,
    settings::{self, XdgAutostart},
};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the current settings
    Show,
    /// Change one or more settings and save them
    Set {
        #[arg(long)]
        export_folder: Option<PathBuf>,
        #[arg(long)]
        ui_scale: Option<u32>,
        #[arg(long)]
        font_size: Option<u32>,
        #[arg(long)]
        tray: Option<bool>,
        #[arg(long)]
        minimize_to_tray: Option<bool>,
        #[arg(long)]
        notifications: Option<bool>,
        /// Start OptiDesk on login
        #[arg(long)]
        autostart: Option<bool>,
    },
}

pub fn handle(store: &SettingsStore, cmd: &Command) -> Result<()> {
    match cmd {
        Command::Show => {
            show(store, &store.load_or_default());
            Ok(())
        }
        Command::Set {
            export_folder,
            ui_scale,
            font_size,
            tray,
            minimize_to_tray,
            notifications,
            autostart,
        } => {
            let mut current = store.load_or_default();

            if let Some(folder) = export_folder {
                current.export_folder = folder.clone();
            }
            if let Some(scale) = ui_scale {
                current.ui_scale_percent = *scale;
            }
            if let Some(size) = font_size {
                current.font_size = *size;
            }
            if let Some(tray) = tray {
                current.enable_tray = *tray;
            }
            if let Some(minimize) = minimize_to_tray {
                current.minimize_to_tray = *minimize;
            }
            if let Some(notifications) = notifications {
                current.enable_notifications = *notifications;
            }
            if let Some(autostart) = autostart {
                current.enable_autostart = *autostart;
            }

            store.save(&current)?;
            current
                .apply_autostart(&XdgAutostart::new().map_err(settings::Error::from)?)
                .map_err(settings::Error::from)?;

            println!("{} {}", "Saved".green(), store.path().display());
            show(store, &current);

            Ok(())
        }
    }
}

fn show(store: &SettingsStore, settings: &Settings) {
    println!("{}", store.path().display().to_string().dimmed());
    println!("export folder      {}", settings.export_folder.display());
    println!("ui scale           {}%", settings.ui_scale_percent);
    println!("font size          {}", settings.font_size);
    println!("tray               {}", settings.enable_tray);
    println!("minimize to tray   {}", settings.minimize_to_tray);
    println!("notifications      {}", settings.enable_notifications);
    println!("autostart          {}", settings.enable_autostart);
}
