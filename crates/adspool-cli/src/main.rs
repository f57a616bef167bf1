use std::path::PathBuf;

use adspool_core::FileDefaultsLoader;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "adspool",
    about = "Inspect Advantage connection defaults and pool identities",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Defaults file (default: resources/config/adsConnection.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Table inside the defaults file
    #[arg(long, global = true, default_value = "ADS_CONNECTION")]
    section: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the loaded default configuration
    Defaults {
        /// Output format: toml or json
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
    /// Show the canonical key, address and pool name a connection would use
    Resolve {
        #[command(subcommand)]
        target: ResolveTarget,
        /// Output format: text or json
        #[arg(short, long, default_value = "text", global = true)]
        format: String,
    },
}

#[derive(Subcommand)]
enum ResolveTarget {
    /// The default configuration as loaded
    Default,
    /// Default dictionary with a directory suffix appended
    Dictionary { suffix: String },
    /// Default dictionary with a tenant suffix appended
    Mandant { mandant: String },
    /// An explicit address plus the default type properties
    Url { full_url: String },
    /// An explicit configuration; unset optional keys come from the defaults
    Config {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        database_dictionary: Option<String>,
        #[arg(long)]
        socket: Option<String>,
        #[arg(long)]
        lock_type: Option<String>,
        #[arg(long)]
        char_type: Option<String>,
        #[arg(long)]
        table_type: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("adspool=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let standard = FileDefaultsLoader::standard();
    let local = cli
        .config
        .unwrap_or_else(|| standard.local_path().to_path_buf());
    let loader = FileDefaultsLoader::new(local, standard.resource_path())
        .with_section(cli.section);
    tracing::debug!(
        local = %loader.local_path().display(),
        resource = %loader.resource_path().display(),
        "defaults lookup locations"
    );

    let output = match cli.command {
        Commands::Defaults { format } => commands::defaults::render(&loader, &format)?,
        Commands::Resolve { target, format } => {
            let target = match target {
                ResolveTarget::Default => adspool_pool::Target::Default,
                ResolveTarget::Dictionary { suffix } => adspool_pool::Target::Dictionary(suffix),
                ResolveTarget::Mandant { mandant } => adspool_pool::Target::Mandant(mandant),
                ResolveTarget::Url { full_url } => adspool_pool::Target::FullUrl(full_url),
                ResolveTarget::Config {
                    host,
                    database_dictionary,
                    socket,
                    lock_type,
                    char_type,
                    table_type,
                } => adspool_pool::Target::Config(adspool_core::ConnectionConfig {
                    host,
                    socket,
                    database_dictionary,
                    lock_type,
                    char_type,
                    table_type,
                }),
            };
            commands::resolve::render(&target, &loader, &format)?
        }
    };

    println!("{output}");
    Ok(())
}
