use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use colored::Colorize;
use polars::prelude::*;
use scoutviz::{Config, Dashboard, TableData};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scoutviz")]
#[command(
    author,
    version,
    about = "Scouting data dashboard: total a task category per match and explore it in the browser"
)]
struct Cli {
    /// Config file (default: nearest scoutviz.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Measures file, Feather / Arrow IPC (overrides data.path)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard (default when no command is given)
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the category totals for a phase
    Summary {
        /// All, Auto or Tele (case-insensitive; anything else means All)
        #[arg(long, default_value = "All")]
        phase: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    });

    match command {
        Command::Serve { host, port } => {
            let mut config = load_config(cli.config, cli.data)?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let addr = config.listen_addr();

            let dashboard = Dashboard::load(config).context("Failed to load dashboard data")?;
            scoutviz::serve::start_dashboard_server(&dashboard, &addr)
                .with_context(|| format!("Server error on {}", addr))?;
        }

        Command::Summary { phase, format } => {
            let config = load_config(cli.config, cli.data)?;
            let dashboard = Dashboard::load(config).context("Failed to load dashboard data")?;
            let mut view = dashboard.view(&phase)?;
            print_view(&mut view, format)?;
        }

        Command::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "scoutviz", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>, data: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(&path)?,
        None => Config::load(),
    };

    // A path given on the command line is relative to the working directory
    if let Some(data) = data {
        config.data.path = data;
        config.base_dir = None;
    }
    Ok(config)
}

fn print_view(view: &mut DataFrame, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            std::env::set_var("POLARS_FMT_MAX_ROWS", "-1");
            println!("{}", view);
        }
        OutputFormat::Json => {
            let records = TableData::from_dataframe(view, view.height().max(1))?.records();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        OutputFormat::Csv => {
            CsvWriter::new(std::io::stdout())
                .finish(view)
                .context("Failed to write CSV")?;
        }
    }
    Ok(())
}
