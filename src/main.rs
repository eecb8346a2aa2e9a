use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cortex_client::config::Config;
use cortex_client::error::format_error;
use cortex_client::{Collection, CortexClient, Error, Resource, ResourceFilter, Show};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command-line client for the Cortex API
#[derive(Parser, Debug)]
#[command(name = "cortex", version, about, long_about = None)]
struct Args {
    /// Server API root (overrides config and CORTEX_URL)
    #[arg(long)]
    url: Option<String>,

    /// Bearer token (overrides config and CORTEX_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Users
    Users {
        #[command(subcommand)]
        action: Action,
    },
    /// Groups
    Groups {
        #[command(subcommand)]
        action: Action,
    },
    /// Organizations
    Orgs {
        #[command(subcommand)]
        action: Action,
    },
    /// Environments
    Envs {
        #[command(subcommand)]
        action: Action,
    },
    /// Settings of a host
    Settings {
        /// Host UUID
        #[arg(long)]
        host: String,
        #[command(subcommand)]
        action: Action,
    },
    /// Audit log
    Audit {
        /// Filter as param=value, may be repeated
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    /// Store default URL and token
    Configure {
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum Action {
    /// List resources
    List {
        /// Filter as param=value, may be repeated
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    /// Show one resource
    Show { identifier: String },
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

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("cortex started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("cortex").join("cortex.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".cortex").join("cortex.log");
    }
    PathBuf::from("cortex.log")
}

/// Parse `param=value` pairs into filters
fn parse_filters(raw: &[String]) -> Result<Vec<ResourceFilter>> {
    raw.iter()
        .map(|pair| {
            let (param, value) = pair
                .split_once('=')
                .with_context(|| format!("Filter '{}' is not of the form param=value", pair))?;
            Ok(ResourceFilter::eq(param, value))
        })
        .collect()
}

/// User-facing error, details go to the log
fn present(error: Error) -> anyhow::Error {
    tracing::error!("Command failed: {}", error);
    anyhow::anyhow!(format_error(&error))
}

/// Print every entry of a collection, or one entry
async fn run_action<C>(collection: &C, action: &Action) -> Result<()>
where
    C: Collection,
    C::Item: Show,
{
    match action {
        Action::List { filters } => {
            let filters = parse_filters(filters)?;
            for item in collection.list(&filters).await.map_err(present)? {
                println!("{}", item.show(2).map_err(present)?);
            }
        }
        Action::Show { identifier } => {
            let item = collection.get(identifier).await.map_err(present)?;
            print!("{}", item.show(0).map_err(present)?);
        }
    }
    Ok(())
}

/// Environments are listed under their derived identifier
async fn run_environments(client: &CortexClient, action: &Action) -> Result<()> {
    let environments = client.environments();
    let Action::List { filters } = action else {
        return run_action(&environments, action).await;
    };

    let filters = parse_filters(filters)?;
    for env in environments.list(&filters).await.map_err(present)? {
        println!("{}", env.identifier().await.map_err(present)?);
        println!("{}", env.show(2).map_err(present)?);
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load();

    if let Command::Configure {
        url,
        token,
        timeout_secs,
    } = &args.command
    {
        if url.is_some() {
            config.base_url = url.clone();
        }
        if token.is_some() {
            config.token = token.clone();
        }
        if timeout_secs.is_some() {
            config.timeout_secs = *timeout_secs;
        }
        config.save().context("Failed to save configuration")?;
        println!("Configuration saved to {:?}", Config::config_path());
        return Ok(());
    }

    let settings = config.settings(args.url.as_deref(), args.token.as_deref());
    let client = CortexClient::connect(&settings).map_err(present)?;

    match &args.command {
        Command::Users { action } => run_action(&client.users(), action).await,
        Command::Groups { action } => run_action(&client.groups(), action).await,
        Command::Orgs { action } => run_action(&client.organizations(), action).await,
        Command::Envs { action } => run_environments(&client, action).await,
        Command::Settings { host, action } => run_action(&client.settings(host), action).await,
        Command::Audit { filters } => {
            let action = Action::List {
                filters: filters.clone(),
            };
            run_action(&client.audit(), &action).await
        }
        Command::Configure { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    run(args).await
}
