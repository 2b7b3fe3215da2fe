//! cmdcov: command test coverage report CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cmdcov::config::{default_config_json, load_config, Config, CONFIG_FILENAME, DEFAULT_CLI_OWN_MODULES};
use cmdcov::coverage::{cli_own_summary, cli_own_table, index_table, load_coverage, summarize};
use cmdcov::output::{report_dir, write_report, HtmlReport};
use cmdcov::reporter::{ConsoleReporter, HtmlReporter, JsonReporter};
use cmdcov::table::{SortSpec, TableSorter};
use cmdcov::{CoverageLevel, CoverageSummary};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// cmdcov: sortable command test coverage reports
#[derive(Parser, Debug)]
#[command(name = "cmdcov")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Coverage JSON file, or a directory of them (omit when using a subcommand)
    #[arg(required = true)]
    input: Option<PathBuf>,

    /// Sort column, optionally with direction (e.g. percentage:desc)
    #[arg(long, short, value_name = "COLUMN[:asc|desc]")]
    sort: Option<String>,

    /// Output format as JSON
    #[arg(long, short)]
    json: bool,

    /// Write the HTML report directory
    #[arg(long)]
    html: bool,

    /// Root directory for --html (default: config outputDir, else current dir)
    #[arg(long, short, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Also render the CLI-owned modules view
    #[arg(long)]
    cli_own: bool,

    /// Override the input's coverage level: command or argument
    #[arg(long, short)]
    level: Option<CoverageLevel>,

    /// Minimum total coverage percentage (exit 1 if below)
    #[arg(long, short)]
    threshold: Option<f64>,

    /// Path to config file (default: search .cmdcovrc.json in input dir and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Quiet mode (total only)
    #[arg(long, short)]
    quiet: bool,

    /// Verbose output (debug logging, untested commands)
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create .cmdcovrc.json with sensible defaults
    Init {
        /// Minimum total coverage percentage (e.g. 60)
        #[arg(long)]
        threshold: Option<f64>,

        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .try_init();
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(Commands::Init { threshold, dir }) = args.command {
        return run_init(threshold, dir.as_deref());
    }

    let input = args
        .input
        .clone()
        .context("An input file or directory is required")?;

    // Resolve work directory for config search
    let work_dir = if input.is_file() {
        input.parent().unwrap_or(Path::new("."))
    } else {
        input.as_path()
    };

    // Load config (CLI flags override config file)
    let config = load_config(work_dir, args.config.as_deref())?.merge_with_cli(
        args.threshold,
        args.level,
        args.sort.as_deref(),
    );
    let sort = config.sort_spec()?;
    let thresholds = config.color_thresholds();

    let coverage = load_coverage(&input)?;
    let summary = summarize(coverage, config.level, &config.exclude)?;

    let mut sorter = TableSorter::new(index_table(&summary)?);
    sorter
        .apply(&sort)
        .with_context(|| format!("Cannot sort by `{}`", sort))?;

    let cli_own = if args.cli_own {
        let own = cli_own_summary(&summary, &cli_own_modules(&config));
        let own_sorter = sorted_cli_own(&own, &sort)?;
        Some((own, own_sorter))
    } else {
        None
    };

    // Output results
    if args.json {
        let reporter = JsonReporter::new().pretty().with_thresholds(thresholds);
        println!("{}", reporter.report(&summary, &sorter));
    } else if args.quiet {
        ConsoleReporter::new()
            .with_thresholds(thresholds)
            .report_quiet(&summary);
    } else {
        let mut reporter = ConsoleReporter::new()
            .with_title(config.title())
            .with_thresholds(thresholds);
        if args.verbose {
            reporter = reporter.verbose();
        }
        reporter.report(&summary, &sorter);
        if let Some((own, own_sorter)) = &cli_own {
            reporter
                .with_title(format!("{} (CLI-owned modules)", config.title()))
                .report(own, own_sorter);
        }
    }

    if args.html {
        let root = args
            .out
            .clone()
            .or_else(|| config.output_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        let reporter = HtmlReporter::new()
            .with_title(config.title())
            .with_thresholds(thresholds);
        let report = HtmlReport::render(
            &reporter,
            &summary,
            &sorter,
            cli_own.as_ref().map(|(own, own_sorter)| (own, own_sorter)),
        )?;
        let dir = report_dir(&root, summary.level, chrono::Local::now());
        let index = write_report(&dir, &report)?;
        if !args.quiet && !args.json {
            eprintln!("{}: Report written to {}", "Info".blue(), index.display());
        }
    }

    // Check threshold
    if let Some(threshold) = config.threshold {
        let total = summary.total.percentage().value().unwrap_or(0.0);
        if total < threshold {
            if !args.quiet {
                eprintln!(
                    "{}: Total coverage {} is below threshold {}%",
                    "Warning".yellow(),
                    summary.total.percentage(),
                    threshold
                );
            }
            return Ok(ExitCode::from(1));
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// CLI-owned modules from config, or the built-in list when the config names none
fn cli_own_modules(config: &Config) -> Vec<String> {
    if config.cli_own_modules.is_empty() {
        DEFAULT_CLI_OWN_MODULES.iter().map(|s| s.to_string()).collect()
    } else {
        config.cli_own_modules.clone()
    }
}

fn sorted_cli_own(own: &CoverageSummary, sort: &SortSpec) -> Result<TableSorter> {
    let mut sorter = TableSorter::new(cli_own_table(own)?);
    sorter
        .apply(sort)
        .with_context(|| format!("Cannot sort CLI-owned modules by `{}`", sort))?;
    Ok(sorter)
}

fn run_init(threshold: Option<f64>, dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let json = default_config_json(threshold)?;
    std::fs::write(&config_path, json)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    eprintln!("{}: Created {}", "Info".blue(), config_path.display());
    Ok(ExitCode::SUCCESS)
}
