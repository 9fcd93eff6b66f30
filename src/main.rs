// src/main.rs

use anyhow::{Context, Result};
use ccmod_mirror::config::MirrorConfig;
use ccmod_mirror::db::PackageDb;
use ccmod_mirror::manifest::ModId;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ccmod-mirror")]
#[command(author, version, about = "Content-addressed mirror for CrossCode mod packages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command
#[derive(Args)]
struct StorageArgs {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory, overriding storage.root
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

impl StorageArgs {
    fn load(&self) -> Result<MirrorConfig> {
        let mut config = match &self.config {
            Some(path) => MirrorConfig::load(path)?,
            None => MirrorConfig::new(),
        };
        if let Some(data_dir) = &self.data_dir {
            config.storage.root = data_dir.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    #[cfg(feature = "server")]
    Serve {
        #[command(flatten)]
        storage: StorageArgs,

        /// Bind address, overriding server.bind
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Create the data directory and an empty manifest
    Init {
        #[command(flatten)]
        storage: StorageArgs,
    },

    /// Rebuild the index and report on the data directory
    Check {
        #[command(flatten)]
        storage: StorageArgs,

        /// Re-hash every blob named in the manifest
        #[arg(long)]
        verify: bool,
    },

    /// List families and their versions
    List {
        #[command(flatten)]
        storage: StorageArgs,
    },

    /// Fetch an archive and register it
    Register {
        #[command(flatten)]
        storage: StorageArgs,

        /// Archive URL
        #[arg(long)]
        url: String,

        /// Descriptor path inside the archive
        #[arg(long, default_value = "package.json")]
        path: String,

        /// Existing ModID to add the version to (default: new family)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        id: Option<ModId>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        #[cfg(feature = "server")]
        Commands::Serve { storage, bind } => {
            let mut config = storage.load()?;
            if let Some(bind) = bind {
                config.server.bind = bind;
                config.validate()?;
            }
            let server_config = ccmod_mirror::server::ServerConfig {
                bind_addr: config.bind_addr()?,
                data_dir: config.data_dir().to_path_buf(),
            };
            let fetcher = Arc::new(config.http_fetcher()?);
            ccmod_mirror::server::run_server(server_config, fetcher).await
        }
        Commands::Init { storage } => {
            let config = storage.load()?;
            PackageDb::init(config.data_dir()).with_context(|| {
                format!("Failed to initialize {}", config.data_dir().display())
            })?;
            println!("Initialized {}", config.data_dir().display());
            Ok(())
        }
        Commands::Check { storage, verify } => cmd_check(&storage.load()?, verify).await,
        Commands::List { storage } => cmd_list(&storage.load()?),
        Commands::Register {
            storage,
            url,
            path,
            id,
        } => cmd_register(&storage.load()?, &url, &path, id).await,
    }
}

fn open_db(config: &MirrorConfig) -> Result<PackageDb> {
    let fetcher = Arc::new(config.http_fetcher()?);
    PackageDb::open(config.data_dir(), fetcher)
        .with_context(|| format!("Failed to open {}", config.data_dir().display()))
}

async fn cmd_check(config: &MirrorConfig, verify: bool) -> Result<()> {
    let db = open_db(config)?;
    let index = db.snapshot();
    println!(
        "{} families, {} packages, next id {}",
        index.len(),
        index.package_count(),
        index.next_id()
    );

    // Overwritten versions still have manifest entries, so their blobs count
    let referenced: BTreeSet<String> = db
        .manifest_entries()
        .await
        .into_iter()
        .map(|entry| entry.hash)
        .collect();

    let on_disk = db.blob_store().digests()?;
    let orphaned = on_disk.iter().filter(|d| !referenced.contains(*d)).count();
    if orphaned > 0 {
        info!("{} stored blobs are not referenced by the manifest", orphaned);
    }

    if verify {
        let report = db.verify_blobs().await?;
        for digest in &report.corrupt {
            warn!("Blob {} does not match its digest", digest);
        }
        for digest in &report.missing {
            warn!("Blob {} is missing", digest);
        }
        if !report.is_ok() {
            anyhow::bail!(
                "{} of {} blobs failed verification ({} corrupt, {} missing)",
                report.corrupt.len() + report.missing.len(),
                report.checked,
                report.corrupt.len(),
                report.missing.len()
            );
        }
        println!("Verified {} blobs", report.checked);
    }

    Ok(())
}

fn cmd_list(config: &MirrorConfig) -> Result<()> {
    let db = open_db(config)?;
    let index = db.snapshot();

    if index.is_empty() {
        println!("No packages registered");
        return Ok(());
    }

    for (mod_id, family) in index.families() {
        let Some(newest) = family.newest() else {
            continue;
        };
        let versions: Vec<&str> = family.versions().collect();
        println!(
            "{:>5}  {}  (newest {}; {})",
            mod_id,
            newest.display_name(),
            newest.version(),
            versions.join(", ")
        );
    }
    Ok(())
}

async fn cmd_register(
    config: &MirrorConfig,
    url: &str,
    path: &str,
    id: Option<ModId>,
) -> Result<()> {
    let db = open_db(config)?;
    let package = db.register_package(id, url, path).await?;
    println!(
        "Registered {} {} as mod {}",
        package.descriptor.name,
        package.version(),
        package.entry.mod_id
    );
    Ok(())
}
