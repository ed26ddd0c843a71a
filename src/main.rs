mod cli;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use dotenv::dotenv;
use tracing::{error, info, warn};

use cli::commands::{Cli, Commands, JournalArgs};
use cli::progress::CliReporter;
use cli::prompt::prompt_confirm;
use music_tidy::classify::validate::project_paths;
use music_tidy::classify::{
    analyze_tree, Reason, StructureAnalysis, ValidateOptions, ValidationResult, Validator, Validity,
};
use music_tidy::config::{load_configuration, load_configuration_from, non_overlapping_directories};
use music_tidy::journal::{export_csv, read_entries, summarize};
use music_tidy::ops::{
    merge_folders, move_library, replay, tag_library, ReplayAction, ReplayKind, TagOptions,
};
use music_tidy::{AppConfig, Journal, LoftyTags, ProgressReporter, SilentReporter};

fn main() {
    dotenv().ok();

    let _guard = cli::logging::init_logger();

    let args = Cli::parse();

    let loaded = match &args.config {
        Some(path) => load_configuration_from(path),
        None => load_configuration(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let Some(command) = args.command else {
        if let Err(err) = Cli::command().print_long_help() {
            error!("Error printing help: {}", err);
            process::exit(1);
        }
        return;
    };

    if let Err(err) = run(command, &config) {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn run(command: Commands, config: &AppConfig) -> Result<()> {
    let reporter: Box<dyn ProgressReporter> = if config.quiet {
        Box::new(SilentReporter)
    } else {
        Box::new(CliReporter::new())
    };
    let tags = LoftyTags;

    match command {
        Commands::Validate {
            paths,
            skip,
            good_only,
            bad_only,
            journal,
        } => {
            let roots = if paths.is_empty() {
                config.library_root.iter().cloned().collect()
            } else {
                paths
            };
            if roots.is_empty() {
                bail!("no folder given and no library_root configured");
            }

            let mut config = config.clone();
            config.skip_paths.extend(skip);
            let options = ValidateOptions::from_config(&config)?;
            let validator = Validator::new(&tags, &options).with_reporter(reporter.as_ref());
            let mut journal = open_journal(&journal, &config)?;

            for root in non_overlapping_directories(roots) {
                let results = validator
                    .validate_detailed(Path::new(&root), Some(&mut journal))
                    .with_context(|| format!("validating {}", root))?;
                if good_only {
                    print_paths(&results, Validity::Good);
                } else if bad_only {
                    print_paths(&results, Validity::Bad);
                } else {
                    print_validation(&results, config.quiet);
                }
            }
            journal.flush()?;
        }
        Commands::Analyze { path, journal } => {
            let start = resolve_path(path, &config.library_root, "library_root")?;
            let options = ValidateOptions::from_config(config)?;
            let mut journal = open_journal(&journal, config)?;
            let analyses = analyze_tree(&start, &options, Some(&mut journal))?;
            for analysis in &analyses {
                print_analysis(analysis);
            }
            info!("{} folders analyzed", analyses.len());
        }
        Commands::Tag {
            path,
            dry_run,
            genre,
            comment,
            yes,
            journal,
        } => {
            let start = resolve_path(path, &config.library_root, "library_root")?;
            let prompt = format!("Rewrite tags of every good folder under {}?", start.display());
            if !confirmed(&prompt, yes, dry_run)? {
                println!("Aborted");
                return Ok(());
            }

            let options = ValidateOptions::from_config(config)?;
            let validator = Validator::new(&tags, &options).with_reporter(reporter.as_ref());
            let mut journal = open_journal(&journal, config)?;
            let tag_options = TagOptions {
                dry_run,
                genre,
                comment,
            };
            let report = tag_library(&validator, &start, &tag_options, Some(&mut journal))?;
            info!(
                "{} folders, {} files tagged, {} skipped, {} failed",
                report.folders,
                format!("{}", report.tagged).green(),
                format!("{}", report.skipped).yellow(),
                format!("{}", report.failed).red(),
            );
        }
        Commands::Move {
            path,
            destination,
            dry_run,
            yes,
            journal,
        } => {
            let start = resolve_path(path, &config.library_root, "library_root")?;
            let destination = resolve_path(destination, &config.destination_root, "destination_root")?;
            let prompt = format!(
                "Move every good artist folder under {} to {}?",
                start.display(),
                destination.display()
            );
            if !confirmed(&prompt, yes, dry_run)? {
                println!("Aborted");
                return Ok(());
            }

            let options = ValidateOptions::from_config(config)?;
            let validator = Validator::new(&tags, &options).with_reporter(reporter.as_ref());
            let mut journal = open_journal(&journal, config)?;
            let report = move_library(&validator, &start, &destination, dry_run, Some(&mut journal))?;
            info!(
                "{} moved, {} merged, {} already in place, {} failed",
                format!("{}", report.moved).green(),
                format!("{}", report.merged).cyan(),
                report.in_place,
                format!("{}", report.failed).red(),
            );
        }
        Commands::Merge {
            src,
            dst,
            dry_run,
            yes,
        } => {
            let prompt = format!("Merge {} into {}?", src.display(), dst.display());
            if !confirmed(&prompt, yes, dry_run)? {
                println!("Aborted");
                return Ok(());
            }
            let report = merge_folders(&src, &dst, dry_run)?;
            info!(
                "{} moved, {} renamed, {} failed, source removed: {}",
                format!("{}", report.moved).green(),
                format!("{}", report.renamed).yellow(),
                format!("{}", report.failed).red(),
                report.source_removed
            );
        }
        Commands::Replay {
            log,
            action,
            destination,
            genre,
            comment,
            dry_run,
            yes,
            journal,
        } => {
            let action = match action {
                ReplayKind::Tag => ReplayAction::Tag(TagOptions {
                    dry_run,
                    genre,
                    comment,
                }),
                ReplayKind::Move => ReplayAction::Move {
                    destination: resolve_path(
                        destination,
                        &config.destination_root,
                        "destination_root",
                    )?,
                    dry_run,
                },
            };
            let prompt = format!("Replay {:?} over the good folders in {}?", action, log.display());
            if !confirmed(&prompt, yes, dry_run)? {
                println!("Aborted");
                return Ok(());
            }

            let options = ValidateOptions::from_config(config)?;
            let validator = Validator::new(&tags, &options).with_reporter(reporter.as_ref());
            let mut journal = open_journal(&journal, config)?;
            let report = replay(&validator, &log, &action, Some(&mut journal))
                .with_context(|| format!("replaying {}", log.display()))?;
            info!(
                "{} candidates: {} replayed, {} refused, {} failed",
                report.candidates,
                format!("{}", report.replayed).green(),
                format!("{}", report.refused).yellow(),
                format!("{}", report.failed).red(),
            );
        }
        Commands::Summarize { log, csv, paths } => {
            let entries =
                read_entries(&log).with_context(|| format!("reading {}", log.display()))?;
            let summary = summarize(&entries);

            println!("{} entries in {}", summary.total, log.display());
            for (title, counts) in [
                ("Status", &summary.by_status),
                ("Reason", &summary.by_reason),
                ("Function", &summary.by_function),
                ("Structure", &summary.by_structure),
            ] {
                if counts.is_empty() {
                    continue;
                }
                println!("{}", title.bold());
                for (key, count) in counts {
                    println!("  {:<16} {}", key, count);
                }
            }
            if paths {
                for (status, status_paths) in &summary.paths_by_status {
                    println!("{}", status.bold());
                    for path in status_paths {
                        println!("  {}", path);
                    }
                }
            }

            if let Some(csv_path) = csv {
                let rows = export_csv(&entries, &csv_path)?;
                info!("{} rows written to {}", rows, csv_path.display());
            }
        }
        Commands::PrintConfig => {
            let rendered = toml::to_string_pretty(config).context("rendering configuration")?;
            println!("{}", rendered);
        }
    }

    Ok(())
}

fn resolve_path(arg: Option<PathBuf>, configured: &Option<String>, key: &str) -> Result<PathBuf> {
    match arg.or_else(|| configured.as_ref().map(PathBuf::from)) {
        Some(path) => Ok(path),
        None => bail!("no path given and no {} configured", key),
    }
}

fn open_journal(args: &JournalArgs, config: &AppConfig) -> Result<Journal> {
    let path = args
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.journal_path));
    let format = args.log_format.unwrap_or(config.journal_format);
    let journal = if args.append {
        Journal::open_append(&path, format)
    } else {
        Journal::create(&path, format)
    };
    journal.with_context(|| format!("opening event log {}", path.display()))
}

fn confirmed(prompt: &str, yes: bool, dry_run: bool) -> Result<bool> {
    if yes || dry_run {
        return Ok(true);
    }
    Ok(prompt_confirm(prompt, Some(false))?)
}

fn print_paths(results: &[ValidationResult], validity: Validity) {
    for path in project_paths(results, validity) {
        match validity {
            Validity::Good => println!("{}", path.display().to_string().green()),
            Validity::Bad => println!("{}", path.display().to_string().red()),
        }
    }
}

fn print_validation(results: &[ValidationResult], quiet: bool) {
    let (mut good, mut bad) = (0, 0);
    for result in results {
        let path = result.unit_path.display();
        match result.reason {
            Reason::Valid => {
                good += 1;
                if !quiet {
                    println!("{} {}", "GOOD".green(), path);
                }
            }
            Reason::Empty | Reason::NoMusicFiles => {
                bad += 1;
                if !quiet {
                    println!("{} {}: {}", result.reason.to_string().yellow(), path, result.details);
                }
            }
            Reason::CorruptedFile | Reason::NotFound => {
                bad += 1;
                warn!("{} {}: {}", result.reason, path, result.details);
            }
            Reason::BadStructure => {
                bad += 1;
                println!("{} {}: {}", "BAD".red(), path, result.details);
            }
            Reason::Skipped | Reason::Unknown => {}
        }
    }
    info!(
        "{} good, {} bad folders",
        format!("{}", good).green(),
        format!("{}", bad).red()
    );
}

fn print_analysis(analysis: &StructureAnalysis) {
    let label = analysis.structure_type.to_string();
    let label = if analysis.confidence.value() >= 0.7 {
        label.green()
    } else if analysis.confidence.value() >= 0.4 {
        label.yellow()
    } else {
        label.red()
    };
    println!(
        "{} {} ({:.2})",
        analysis.path.display(),
        label,
        analysis.confidence.value()
    );
    for detail in &analysis.details {
        println!("    {}", detail);
    }
    for recommendation in &analysis.recommendations {
        println!("    {} {}", "->".cyan(), recommendation);
    }
}
