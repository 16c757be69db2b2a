use clap::Parser;
use lineage_janitor::cli::{CliArgs, Command, DeleteArgs};
use lineage_janitor::{Config, OpenMetadataApi, Pipeline, SnapshotStore};
use mimalloc::MiMalloc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let mut cfg = Config::load(args.config.as_deref())?;
    if let Some(database) = args.database {
        cfg.job.database = database;
    }
    if let Some(dir) = args.output_dir {
        cfg.output.dir = dir;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        catalog = %cfg.catalog.base_url,
        database = %cfg.job.database,
        output = %cfg.output.dir.display(),
        loglevel = %cfg.basic.loglevel
    );

    if args.command.needs_catalog(cfg.job.dry_run) {
        cfg.require_catalog_access()?;
    }
    let catalog = OpenMetadataApi::new(&cfg.catalog)?;
    let store = SnapshotStore::new(cfg.output.dir.clone());
    let pipeline = Pipeline::new(&catalog, &store, &cfg.job);

    let delete_mode = |opts: DeleteArgs| {
        let mode = opts.mode(cfg.job.dry_run);
        if mode.is_dry_run() {
            warn!("dry run: no lineage will be deleted; pass --execute to apply");
        }
        mode
    };

    match args.command {
        Command::FetchSchemas => {
            cfg.require_database()?;
            pipeline.fetch_schemas().await?;
        }
        Command::CollectTables => {
            pipeline.collect_tables().await?;
        }
        Command::ExtractLineage => {
            pipeline.extract_lineage().await?;
        }
        Command::DeleteLineage(opts) => {
            let summary = pipeline.delete_lineage(delete_mode(opts)).await?;
            if summary.has_failures() {
                warn!(
                    failed = summary.counts.failed,
                    path = %store.deletion_path().display(),
                    "some lineage edges could not be deleted; see results file"
                );
            }
        }
        Command::Run(opts) => {
            cfg.require_database()?;
            let summary = pipeline.run_all(delete_mode(opts)).await?;
            if summary.has_failures() {
                warn!(
                    failed = summary.counts.failed,
                    path = %store.deletion_path().display(),
                    "some lineage edges could not be deleted; see results file"
                );
            }
        }
    }
    Ok(())
}
