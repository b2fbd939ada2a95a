//! Command dispatch

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{AuditService, ComparisonService, TreeKind};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{self, Settings, LOCAL_CONFIG_FILE};
use crate::domain::{AvlTree, Key, Tally, TreeView};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Commands::Completion { shell } = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(strategy) = cli.strategy {
        settings.strategy = strategy;
    }
    debug!(?settings, "effective settings");

    match &cli.command {
        Commands::Build { keys, remove, tree } => cmd_build(&settings, keys, remove, *tree),
        Commands::Compare {
            count,
            min,
            max,
            seed,
        } => cmd_compare(&settings, *count, *min, *max, *seed),
        Commands::Check { keys } => cmd_check(&settings, keys),
        Commands::Config { command } => cmd_config(&settings, cli, command),
        Commands::Completion { .. } => Ok(()),
    }
}

#[instrument(skip(settings))]
fn cmd_build(settings: &Settings, keys: &[Key], remove: &[Key], show_tree: bool) -> CliResult<()> {
    let mut tree = AvlTree::with_options(settings.tree_options());
    let mut tally = Tally::default();
    tree.extend_keys(keys.iter().copied(), &mut tally)?;
    for &key in remove {
        tally.record_remove(tree.remove(key));
    }

    output::header(&format!("AVL tree ({})", tree.strategy()));
    output::detail(&format!(
        "inserted {}, duplicates {}, removed {}, absent {}",
        tally.inserted, tally.duplicates, tally.removed, tally.absent
    ));
    output::summary(&tree.summary());
    output::detail(&format!("inorder: {}", output::key_line(&tree.keys())));
    if show_tree {
        output::info(&tree.to_tree_string());
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_compare(
    settings: &Settings,
    count: Option<usize>,
    min: Option<Key>,
    max: Option<Key>,
    seed: Option<u64>,
) -> CliResult<()> {
    let mut request = settings.compare_request();
    request.count = count.unwrap_or(request.count);
    request.min_key = min.unwrap_or(request.min_key);
    request.max_key = max.unwrap_or(request.max_key);
    request.seed = seed.or(request.seed);
    if request.count == 0 {
        return Err(CliError::Usage("count must be at least 1".into()));
    }

    let report = ComparisonService::new(settings.tree_options()).run(&request)?;
    output::header(&format!(
        "{} keys in [{}, {}]",
        request.count, request.min_key, request.max_key
    ));
    output::info(&output::comparison_table(&report));

    if let (Some(perfect), Some(avl)) = (report.row(TreeKind::Perfect), report.row(TreeKind::Avl)) {
        let extra = avl.summary.height.saturating_sub(perfect.summary.height);
        output::detail(&format!("AVL height exceeds the minimum by {extra}"));
    }
    if !report.consistent {
        output::warning("trees disagree on their key sets");
    }
    report.ensure_consistent()?;
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_check(settings: &Settings, keys: &[Key]) -> CliResult<()> {
    let report = AuditService::new(settings.node_limit).run(keys)?;
    output::success(&format!(
        "{} steps checked under both strategies",
        report.steps
    ));
    output::detail(&format!(
        "inserted {}, duplicates {}",
        report.tally.inserted, report.tally.duplicates
    ));
    output::summary(&report.full);
    Ok(())
}

fn cmd_config(settings: &Settings, cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => {
            match config::global_config_path() {
                Some(path) => {
                    let state = if path.exists() { "" } else { " (not found)" };
                    output::info(&format!("global: {}{state}", path.display()));
                }
                None => output::info("global: (no config directory)"),
            }
            let local = cli
                .config
                .clone()
                .unwrap_or_else(|| LOCAL_CONFIG_FILE.into());
            let state = if local.exists() { "" } else { " (not found)" };
            output::info(&format!("local:  {}{state}", local.display()));
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
