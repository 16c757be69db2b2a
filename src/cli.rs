use crate::stages::DeleteMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Removes undocumented table lineage from a metadata catalog.
///
/// Stages run in order and hand over through JSON snapshots in the output
/// directory, so the lineage report can be reviewed before anything is deleted.
#[derive(Parser, Debug)]
#[command(name = "lineage-janitor", version)]
pub struct CliArgs {
    /// Path to config file (default: ./janitor.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database FQN to sweep (overrides job.database)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Snapshot directory (overrides output.dir)
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stage 1: list the database's schemas
    FetchSchemas,
    /// Stage 2: fetch table details for every listed schema
    CollectTables,
    /// Stage 3: query lineage and write the cleanup report
    ExtractLineage,
    /// Stage 4: delete the edges in the cleanup report
    DeleteLineage(DeleteArgs),
    /// All four stages in sequence
    Run(DeleteArgs),
}

#[derive(Args, Debug, Clone, Copy)]
pub struct DeleteArgs {
    /// Actually call the delete endpoint; without it the deletion is a dry run
    /// unless job.dry_run is false
    #[arg(long)]
    pub execute: bool,
}

impl DeleteArgs {
    pub fn mode(self, dry_run_default: bool) -> DeleteMode {
        DeleteMode::from_dry_run(dry_run_default && !self.execute)
    }
}

impl Command {
    /// Whether the command talks to the catalog. A dry-run deletion only reads
    /// the report and writes the results file.
    pub fn needs_catalog(&self, dry_run_default: bool) -> bool {
        match self {
            Self::DeleteLineage(opts) => !opts.mode(dry_run_default).is_dry_run(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn execute_flag_and_global_options_parse() {
        let args = CliArgs::parse_from([
            "lineage-janitor",
            "delete-lineage",
            "--execute",
            "--database",
            "Ecommerce.dev",
        ]);
        assert_eq!(args.database.as_deref(), Some("Ecommerce.dev"));
        assert!(matches!(
            args.command,
            Command::DeleteLineage(DeleteArgs { execute: true })
        ));

        let args = CliArgs::parse_from(["lineage-janitor", "run"]);
        assert!(matches!(args.command, Command::Run(DeleteArgs { execute: false })));
    }

    #[test]
    fn execute_overrides_the_dry_run_default() {
        let dry = DeleteArgs { execute: false };
        let live = DeleteArgs { execute: true };
        assert_eq!(dry.mode(true), DeleteMode::DryRun);
        assert_eq!(live.mode(true), DeleteMode::Execute);
        assert_eq!(dry.mode(false), DeleteMode::Execute);
    }

    #[test]
    fn dry_run_deletion_works_offline() {
        let dry = CliArgs::parse_from(["lineage-janitor", "delete-lineage"]);
        assert!(!dry.command.needs_catalog(true));
        assert!(dry.command.needs_catalog(false));

        let live = CliArgs::parse_from(["lineage-janitor", "delete-lineage", "--execute"]);
        assert!(live.command.needs_catalog(true));

        // run always fetches schemas, tables and lineage.
        let run = CliArgs::parse_from(["lineage-janitor", "run"]);
        assert!(run.command.needs_catalog(true));
        let extract = CliArgs::parse_from(["lineage-janitor", "extract-lineage"]);
        assert!(extract.command.needs_catalog(true));
    }
}
