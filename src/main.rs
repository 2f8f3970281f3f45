// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use commands::UpdateArgs;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.global.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "bioarch-sync", &mut std::io::stdout());
        return Ok(());
    }

    let config = commands::load_config(&cli.global)?;
    debug!("Using recipe tree {}", config.bioarch_path.display());

    match cli.command {
        Commands::SyncMeta => commands::cmd_sync_meta(&config),
        Commands::BuildDb => commands::cmd_build_db(&config),
        Commands::UpdateDepends {
            file,
            output,
            auto_archive,
            no_auto_unarchive,
            jobs,
            dry_run,
            live,
        } => commands::cmd_update_depends(
            &config,
            &UpdateArgs {
                file,
                output,
                auto_archive,
                auto_unarchive: !no_auto_unarchive,
                jobs,
                dry_run,
                live,
            },
        ),
        Commands::Archive {
            file,
            bioc_ver,
            dry_run,
        } => commands::cmd_archive(&config, &file, &bioc_ver, dry_run),
        Commands::BumpPkgrel { file, dry_run } => {
            commands::cmd_bump_pkgrel(&config, &file, dry_run)
        }
        Commands::Show { package, live } => commands::cmd_show(&config, &package, live),
        Commands::Completions { .. } => Ok(()),
    }
}
