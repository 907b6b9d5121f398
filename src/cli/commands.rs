//! Command dispatch and implementations

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::render::ForestDisplay;
use crate::application::services::{CommissionEngine, FileProcessor, ProcessingReport};
use crate::application::{ApplicationError, IoResultExt};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{config_template, global_config_path, local_config_path, Settings};
use crate::domain::{parse_reference_date, LevelDistribution, NetworkStats, PerformanceMetrics};
use crate::infrastructure::{FileSystem, RealFileSystem};

/// Execute the CLI command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Calculate {
            input,
            output,
            date,
            include_stats,
        }) => cmd_calculate(cli, input, output, date.as_deref(), *include_stats),
        Some(Commands::Validate { input }) => cmd_validate(cli, input),
        Some(Commands::Stats { input }) => cmd_stats(cli, input),
        Some(Commands::Tree { input }) => cmd_tree(cli, input),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()
                .map_err(|e| CliError::Usage(format!("print help: {}", e)))?;
            Ok(())
        }
    }
}

/// Directory searched for the local config file.
fn config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir().map_err(|e| {
            CliError::Application(ApplicationError::OperationFailed {
                context: "get current directory".into(),
                source: Box::new(e),
            })
        }),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = config_dir(cli)?;
    let settings = Settings::load(Some(&dir))?;
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn create_processor(settings: &Settings) -> FileProcessor {
    FileProcessor::new(Arc::new(RealFileSystem)).with_indent(settings.json_indent)
}

// ============================================================
// Processing commands
// ============================================================

#[instrument(skip(cli))]
fn cmd_calculate(
    cli: &Cli,
    input: &Path,
    output_path: &Path,
    date: Option<&str>,
    include_stats: bool,
) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let target_date = match date {
        Some(d) => Some(parse_reference_date(d)?),
        None => settings.reference_date()?,
    };
    let include_stats = include_stats || settings.include_stats;

    let report = create_processor(&settings).process_commission_file(
        input,
        output_path,
        target_date,
        include_stats,
    )?;

    output::success(&format!(
        "Processed {} partners, commissions written to {}",
        report.total_partners,
        output_path.display()
    ));
    if cli.verbose {
        print_summary(&report);
    }
    if let Some(stats) = &report.statistics {
        print_stats(stats);
    }
    if let Some(levels) = &report.level_distribution {
        print_levels(levels);
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_validate(cli: &Cli, input: &Path) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let report = create_processor(&settings).validate_input_file(input);

    if !report.valid {
        output::failure(&report.message);
        return Err(CliError::InvalidInput(
            report.error.unwrap_or_else(|| input.display().to_string()),
        ));
    }

    output::success(&report.message);
    if let Some(count) = report.partner_count {
        output::field("partners", &count);
    }
    if cli.verbose {
        if let Some(stats) = &report.statistics {
            print_stats(stats);
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_stats(cli: &Cli, input: &Path) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let (engine, _) = create_processor(&settings).load_engine(input)?;

    print_stats(&engine.get_stats()?);
    print_levels(&engine.get_level_distribution()?);
    print_metrics(&engine.get_performance_metrics()?);
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, input: &Path) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let (mut engine, _) = create_processor(&settings).load_engine(input)?;
    annotate_commissions(&mut engine, &settings)?;

    for line in engine.forest()?.display_lines() {
        output::info(&line);
    }
    Ok(())
}

/// Fill in commissions so the tree labels can show them.
fn annotate_commissions(engine: &mut CommissionEngine, settings: &Settings) -> CliResult<()> {
    engine.calculate_daily_profits(settings.reference_date()?)?;
    engine.calculate_commissions()?;
    Ok(())
}

fn print_summary(report: &ProcessingReport) {
    let total: f64 = report.commissions.values().sum();
    let earning = report.commissions.values().filter(|c| **c > 0.0).count();
    output::header("Summary");
    if let Some(date) = &report.processing_date {
        output::field("reference date", date);
    }
    output::field("partners", &report.total_partners);
    output::field("earning partners", &earning);
    output::field("total commission", &format!("{:.2}", total));
}

fn print_stats(stats: &NetworkStats) {
    output::header("Network statistics");
    output::field("total partners", &stats.total_partners);
    output::field("root partners", &stats.root_partners);
    output::field("leaf partners", &stats.leaf_partners);
    output::field("max depth", &stats.max_depth);
}

fn print_levels(levels: &LevelDistribution) {
    output::header("Level distribution");
    for (level, count) in levels {
        output::detail(&format!("level {}: {}", level, count));
    }
}

fn print_metrics(metrics: &PerformanceMetrics) {
    output::header("Performance metrics");
    output::field(
        "estimated memory",
        &format!("{:.1} KB", metrics.estimated_memory_kb),
    );
    output::field("performance score", &format!("{:.1}", metrics.performance_score));
    output::field("complexity factor", &metrics.complexity_factor);
}

// ============================================================
// Config commands
// ============================================================

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::field("global", &path.display()),
                None => output::field("global", "(no home directory)"),
            }
            let local = local_config_path(&config_dir(cli)?);
            output::field("local", &local.display());
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".into())
                })?
            } else {
                local_config_path(&config_dir(cli)?)
            };
            init_config(&RealFileSystem, &path)?;
            output::action("Created", &path.display());
            Ok(())
        }
    }
}

/// Write the config template to `path`, refusing to overwrite.
fn init_config(fs: &dyn FileSystem, path: &Path) -> CliResult<()> {
    if fs.exists(path) {
        return Err(CliError::Usage(format!(
            "config already exists: {}",
            path.display()
        )));
    }
    fs.ensure_parent(path)
        .with_path_context("create config directory", path)?;
    fs.write(path, &config_template())
        .with_path_context("write config", path)?;
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
