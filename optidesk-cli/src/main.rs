use clap::{Parser, Subcommand};
use colored::Colorize;
use optidesk_lib::{Repository, SettingsStore, export, repository, settings};
use sysexits::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod client;
mod meridian;
mod mkl;
mod price;
mod records;
mod settings_cmd;

#[derive(Parser, Debug)]
#[command(name = "optidesk")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Operate on the client directory
    #[command(subcommand)]
    Client(client::Command),
    /// Operate on soft contact lens orders
    #[command(subcommand)]
    Mkl(mkl::Command),
    /// Operate on Meridian orders
    #[command(subcommand)]
    Meridian(meridian::Command),
    /// Operate on the price list
    #[command(subcommand)]
    Price(price::Command),
    /// Show or change settings
    #[command(subcommand)]
    Settings(settings_cmd::Command),
}

fn main() -> ExitCode {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("setting default subscriber failed");
    }

    let cli = Cli::parse();

    match run(&cli.command) {
        Ok(()) => ExitCode::Ok,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            exit_code(&err)
        }
    }
}

fn run(command: &Command) -> optidesk_lib::Result<()> {
    let settings = SettingsStore::open_default()?;

    if let Command::Settings(cmd) = command {
        return settings_cmd::handle(&settings, cmd);
    }

    // Held for the whole command and released on every exit path
    let repo = Repository::open_default()?;

    match command {
        Command::Client(cmd) => client::handle(&repo, &settings, cmd),
        Command::Mkl(cmd) => mkl::handle(&repo, &settings, cmd),
        Command::Meridian(cmd) => meridian::handle(&repo, &settings, cmd),
        Command::Price(cmd) => price::handle(&repo, &settings, cmd),
        Command::Settings(_) => Ok(()),
    }
}

fn exit_code(err: &optidesk_lib::Error) -> ExitCode {
    use optidesk_lib::Error;

    match err {
        Error::Repository(repository::Error::Integrity { .. }) => ExitCode::DataErr,
        Error::Repository(repository::Error::NotFound { .. }) => ExitCode::NoInput,
        Error::Repository(repository::Error::Io(_) | repository::Error::InvalidPath(_)) => {
            ExitCode::CantCreat
        }
        Error::Repository(_) => ExitCode::Software,
        Error::Export(export::Error::Io(_)) => ExitCode::CantCreat,
        Error::Settings(settings::Error::Io(_)) => ExitCode::IoErr,
        Error::Settings(settings::Error::Missing(_) | settings::Error::Parse(_)) => {
            ExitCode::Config
        }
    }
}
