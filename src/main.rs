//! Java Style Guard CLI - command-line interface for style convention checks
//!
//! CDD Principle: Application Layer - CLI coordinates user interactions with domain services
//! - Translates user commands to domain operations
//! - Handles external concerns like process exit codes and terminal output
//! - Keeps report output on stdout and logs on stderr

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use java_style_guard::{
    AnalysisOptions, OutputFormat, Registry, ReportFormatter, ReportOptions, Severity,
    StyleChecker, StyleConfig, StyleError,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

/// Exit status for runs that hit a fatal configuration or registry error
const EXIT_FATAL: i32 = 2;

/// Java Style Guard - pattern-level Java convention checks
#[derive(Parser)]
#[command(name = "java-style-guard")]
#[command(version)]
#[command(about = "Checks Java sources against a registry of coding-convention rules")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check files for convention violations
    Check(CheckArgs),

    /// List configured rules
    Rules {
        /// Show only enabled rules
        #[arg(long)]
        enabled_only: bool,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,
    },

    /// Explain what a specific rule checks
    Explain {
        /// Rule ID to explain
        rule_id: String,
    },

    /// Validate a configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },

    /// Write the built-in rules to a starter configuration file
    Init {
        /// Destination file
        #[arg(default_value = "java_style.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// Paths to check (files or directories)
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    format: OutputFormatArg,

    /// Minimum severity level to report
    #[arg(short, long, value_enum)]
    severity: Option<SeverityArg>,

    /// Maximum number of violations to report
    #[arg(long)]
    max_violations: Option<usize>,

    /// Maximum number of files to check
    #[arg(long)]
    max_files: Option<usize>,

    /// Additional exclude patterns
    #[arg(long, action = clap::ArgAction::Append)]
    exclude: Vec<String>,

    /// Disable parallel processing
    #[arg(long)]
    no_parallel: bool,
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
    Sarif,
    Github,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Sarif => OutputFormat::Sarif,
            OutputFormatArg::Github => OutputFormat::GitHub,
        }
    }
}

#[derive(Copy, Clone, ValueEnum)]
enum SeverityArg {
    Info,
    Warn,
    Error,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Info => Severity::Info,
            SeverityArg::Warn => Severity::Warn,
            SeverityArg::Error => Severity::Error,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run_command(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(EXIT_FATAL);
        }
    }
}

fn run_command(cli: Cli) -> Result<i32> {
    let use_colors = !cli.no_color;
    match cli.command {
        Commands::Check(args) => run_check(cli.config.as_deref(), args, use_colors),
        Commands::Rules { enabled_only, category } => {
            run_list_rules(cli.config.as_deref(), enabled_only, category.as_deref())
        }
        Commands::Explain { rule_id } => run_explain(cli.config.as_deref(), &rule_id),
        Commands::ValidateConfig { config_file } => {
            run_validate_config(config_file.or(cli.config).as_deref())
        }
        Commands::Init { output, force } => run_init(&output, force),
    }
}

/// Explicit config file, else the first default file in the working directory, else built-ins
fn load_config(config_path: Option<&Path>) -> Result<StyleConfig> {
    match config_path {
        Some(path) => StyleConfig::load_from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => StyleConfig::discover(".").context("loading default configuration"),
    }
}

fn run_check(config_path: Option<&Path>, args: CheckArgs, use_colors: bool) -> Result<i32> {
    let config = load_config(config_path)?;

    let formatter = ReportFormatter::new(ReportOptions {
        use_colors,
        max_violations: args.max_violations,
        min_severity: args.severity.map(Into::into),
        ..Default::default()
    });
    let checker = StyleChecker::new_with_config(config)?.with_report_formatter(formatter);

    let paths = if args.paths.is_empty() { vec![PathBuf::from(".")] } else { args.paths };
    let options = AnalysisOptions {
        parallel: !args.no_parallel,
        max_files: args.max_files,
        exclude_patterns: args.exclude,
    };

    let report = checker.check_paths(&paths, &options)?;
    let formatted = checker.format_report(&report, args.format.into())?;
    print!("{formatted}");

    tracing::debug!(
        "Checked {} files: {} errors, {} warnings, {} info, {} failed inputs",
        report.files_checked,
        report.counts.error,
        report.counts.warn,
        report.counts.info,
        report.failures.len()
    );

    if report.has_errors() || report.has_failures() {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn run_list_rules(
    config_path: Option<&Path>,
    enabled_only: bool,
    category_filter: Option<&str>,
) -> Result<i32> {
    let config = load_config(config_path)?;

    println!("Available Rules\n");

    for rule in &config.rules {
        if enabled_only && !rule.enabled {
            continue;
        }
        if let Some(filter) = category_filter {
            if rule.category.as_deref() != Some(filter) {
                continue;
            }
        }

        let status = if rule.enabled { "on " } else { "off" };
        println!(
            "  [{}] {} ({}) - {}",
            status,
            rule.id,
            rule.severity.as_str(),
            rule.description
        );
    }

    Ok(0)
}

fn run_explain(config_path: Option<&Path>, rule_id: &str) -> Result<i32> {
    let config = load_config(config_path)?;
    let registry = Registry::load(&config.rules)?;

    match registry.get(rule_id) {
        Ok(rule) => {
            let enabled = config.rules.iter().any(|r| r.id == rule_id && r.enabled);
            println!("Rule: {}", rule.id);
            if let Some(category) = &rule.category {
                println!("Category: {category}");
            }
            println!("Severity: {}", rule.severity);
            println!("Enabled: {enabled}");
            println!();
            println!("Description:");
            println!("   {}", rule.description);
            println!();
            println!("Pattern:");
            println!("   {}", rule.pattern.describe());
            Ok(0)
        }
        Err(StyleError::NotFound { id }) => {
            eprintln!("Rule '{id}' not found");
            println!();
            println!("Available rules:");
            for id in registry.ids() {
                println!("  - {id}");
            }
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

fn run_validate_config(config_path: Option<&Path>) -> Result<i32> {
    let config_path = config_path.unwrap_or_else(|| Path::new("java_style.yaml"));

    println!("Validating configuration: {}", config_path.display());

    let config = match StyleConfig::load_from_file(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration validation failed: {e}");
            return Ok(1);
        }
    };

    let enabled = config.enabled_rules().count();
    println!("Configuration is valid");
    println!("  Rules: {} total, {} enabled", config.rules.len(), enabled);
    println!("  Categories: {}", config.categories().join(", "));
    println!(
        "  Paths: {} include, {} exclude patterns",
        config.paths.include.len(),
        config.paths.exclude.len()
    );

    Ok(0)
}

fn run_init(output: &Path, force: bool) -> Result<i32> {
    if output.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", output.display());
    }

    let yaml = StyleConfig::with_defaults().to_yaml()?;
    fs::write(output, yaml).with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote starter configuration to {}", output.display());
    Ok(0)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
