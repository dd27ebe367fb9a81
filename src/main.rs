use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use digo::api::Account;
use digo::config::{Config, ConfigUpdate};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command line client for the DigitalOcean API
#[derive(Parser, Debug)]
#[command(name = "digo", version, about, long_about = None)]
struct Args {
    /// API client id (overrides config and environment)
    #[arg(long, global = true)]
    client_id: Option<String>,

    /// API key (overrides config and environment)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage droplets
    #[command(subcommand)]
    Droplet(DropletCommand),
    /// Images
    #[command(subcommand)]
    Image(ListCommand),
    /// Droplet sizes
    #[command(subcommand)]
    Size(ListCommand),
    /// Regions
    #[command(subcommand)]
    Region(ListCommand),
    /// SSH keys
    #[command(subcommand)]
    Key(ListCommand),
    /// Store credentials and droplet defaults in the config file
    Configure {
        #[arg(long)]
        region_id: Option<u64>,
        #[arg(long)]
        size_id: Option<u64>,
        #[arg(long)]
        image_id: Option<u64>,
        #[arg(long)]
        ssh_key_id: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum DropletCommand {
    /// List droplets
    List,
    /// Rebuild a droplet from an image
    Rebuild { id: u64, image_id: u64 },
    /// Destroy a droplet
    Destroy { id: u64 },
}

#[derive(Subcommand, Debug)]
enum ListCommand {
    /// List all
    List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("digo started with log level: {:?}", level);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("digo").join("digo.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".digo").join("digo.log");
    }
    PathBuf::from("digo.log")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let _log_guard = setup_logging(args.log_level);

    if let Err(err) = run(args).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    if let Command::Configure {
        region_id,
        size_id,
        image_id,
        ssh_key_id,
    } = args.command
    {
        // Only the file contents and explicit flags are persisted, never the environment
        let update = ConfigUpdate {
            client_id: args.client_id,
            api_key: args.api_key,
            region_id,
            size_id,
            image_id,
            ssh_key_id,
        };
        Config::load_file().updated(update).save()?;
        if let Some(path) = Config::config_path() {
            println!("Saved {}", path.display());
        }
        return Ok(());
    }

    let mut config = Config::load();
    if args.client_id.is_some() {
        config.client_id = args.client_id;
    }
    if args.api_key.is_some() {
        config.api_key = args.api_key;
    }

    let account = Arc::new(config.account()?);

    match args.command {
        Command::Droplet(DropletCommand::List) => list_droplets(&account).await,
        Command::Droplet(DropletCommand::Rebuild { id, image_id }) => {
            let rsp = account.rebuild_droplet(id, image_id).await?;
            println!("rebuilding droplet {} (event {})", id, event_label(rsp.event_id));
            Ok(())
        }
        Command::Droplet(DropletCommand::Destroy { id }) => {
            let rsp = account.destroy_droplet(id).await?;
            println!("destroying droplet {} (event {})", id, event_label(rsp.event_id));
            Ok(())
        }
        Command::Image(ListCommand::List) => {
            let rows = account
                .images()
                .await?
                .into_iter()
                .map(|i| vec![i.id.to_string(), i.name])
                .collect();
            print_table(&["Id", "Name"], rows);
            Ok(())
        }
        Command::Size(ListCommand::List) => {
            let rows = account
                .sizes()
                .await?
                .into_iter()
                .map(|s| vec![s.id.to_string(), s.name])
                .collect();
            print_table(&["Id", "Name"], rows);
            Ok(())
        }
        Command::Region(ListCommand::List) => {
            let rows = account
                .regions()
                .await?
                .into_iter()
                .map(|r| vec![r.id.to_string(), r.name])
                .collect();
            print_table(&["Id", "Name"], rows);
            Ok(())
        }
        Command::Key(ListCommand::List) => {
            let rows = account
                .ssh_keys()
                .await?
                .into_iter()
                .map(|k| vec![k.id.to_string(), k.name])
                .collect();
            print_table(&["Id", "Name"], rows);
            Ok(())
        }
        Command::Configure { .. } => Ok(()),
    }
}

async fn list_droplets(account: &Arc<Account>) -> Result<()> {
    let droplets = account.droplets().await?;
    let mut rows = Vec::with_capacity(droplets.len());
    for droplet in droplets {
        rows.push(vec![
            droplet.id.to_string(),
            droplet.name.clone(),
            droplet.status.clone(),
            droplet.ip_address.clone().unwrap_or_default(),
            droplet.region_name().await,
            droplet.size_name().await,
            droplet.image_name().await,
        ]);
    }
    print_table(
        &["Id", "Name", "Status", "IP", "Region", "Size", "Image"],
        rows,
    );
    Ok(())
}

fn event_label(event_id: Option<u64>) -> String {
    event_id.map_or_else(|| "-".to_string(), |id| id.to_string())
}

fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    println!("{}", format_row(headers.to_vec()));
    for row in &rows {
        println!("{}", format_row(row.iter().map(String::as_str).collect()));
    }
}
