//! reel-ed - Entity Discovery host
//!
//! Runs the discovery tasks of a host file against a catalog and prints one
//! JSON line per result record on stdout.

use anyhow::{bail, Context, Result};
use clap::Parser;
use reel_common::config::ConfigPathResolver;
use reel_ed::{Catalog, DiscoveryPipeline, HostConfig, ResultRecord};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for reel-ed
#[derive(Parser, Debug)]
#[command(name = "reel-ed")]
#[command(about = "Entity-driven media discovery")]
#[command(version)]
struct Args {
    /// Host file with catalog location and tasks
    #[arg(short, long, env = "REEL_ED_CONFIG")]
    config: Option<PathBuf>,

    /// Catalog file (overrides the host file's `catalog`)
    #[arg(long, env = "REEL_CATALOG")]
    catalog: Option<PathBuf>,

    /// Run only this task
    #[arg(short, long)]
    task: Option<String>,

    /// Test mode: dump each emitted record
    #[arg(long)]
    test: bool,
}

#[derive(Serialize)]
struct TaskRecord<'a> {
    task: &'a str,
    #[serde(flatten)]
    record: &'a ResultRecord,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = ConfigPathResolver::new("reel-ed", "REEL_ED_CONFIG")
        .resolve(args.config.as_deref())
        .context("Failed to locate host file")?;
    let host = HostConfig::load(&config_path).context("Failed to load host file")?;

    // Initialize tracing (RUST_LOG wins over the host file)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&host.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting reel-ed {}", env!("CARGO_PKG_VERSION"));
    info!("Host file: {}", config_path.display());

    let Some(catalog_path) = args.catalog.or_else(|| host.catalog.clone()) else {
        bail!(
            "No catalog configured: pass --catalog or set `catalog` in {}",
            config_path.display()
        );
    };
    let catalog = Catalog::load(&catalog_path)
        .with_context(|| format!("Failed to load catalog {}", catalog_path.display()))?;
    info!(
        "Catalog: {} ({} entities, {} works)",
        catalog_path.display(),
        catalog.entity_count(),
        catalog.work_count()
    );

    let tasks: Vec<_> = match &args.task {
        Some(name) => match host.tasks.get_key_value(name) {
            Some(task) => vec![task],
            None => bail!("Task '{}' not found in {}", name, config_path.display()),
        },
        None => host.tasks.iter().collect(),
    };

    if tasks.is_empty() {
        bail!("No tasks defined in {}", config_path.display());
    }

    let pipeline = DiscoveryPipeline::new(&catalog).with_test_mode(args.test);

    for (name, task) in tasks {
        info!(task = %name, "Running task");
        let records = pipeline.run(task.discover.clone());

        for record in &records {
            let line = serde_json::to_string(&TaskRecord { task: name, record })?;
            println!("{}", line);
        }

        info!(task = %name, records = records.len(), "Task finished");
    }

    Ok(())
}
