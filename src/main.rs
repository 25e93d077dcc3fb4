// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::Write;

use json_translator::Controller;
use json_translator::app_config::{self, Config};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate JSON localization files (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for json-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
struct TranslateArgs {
    /// Directory containing the source JSON files
    #[arg(short, long, value_name = "DIR")]
    input_dir: Option<String>,

    /// Directory receiving translated files and reports
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Target languages, comma separated (names or ISO codes)
    #[arg(short = 'L', long, value_delimiter = ',')]
    languages: Vec<String>,

    /// Maximum strings per translation batch
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Candidate translations generated per string
    #[arg(long)]
    options_count: Option<usize>,

    /// Maximum batches in flight at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Model generating translation options
    #[arg(long)]
    options_model: Option<String>,

    /// Model selecting the best option
    #[arg(long)]
    selection_model: Option<String>,

    /// Model refining the selected translation
    #[arg(long)]
    refinement_model: Option<String>,

    /// Model judging translation quality
    #[arg(long)]
    validation_model: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Use deterministic mock translations instead of model calls
    #[arg(short, long)]
    mock: bool,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

/// json-translator - structure-preserving translation of JSON localization files
#[derive(Parser, Debug)]
#[command(name = "json-translator")]
#[command(version)]
#[command(about = "Structure-preserving LLM translation of JSON localization files")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "json-translator extracts the strings of JSON localization files, translates them \
through option generation, selection and refinement stages, rebuilds each file with its exact \
original structure and scores every translation.

EXAMPLES:
    json-translator --mock -i locales/en -o output -L Spanish,fr
    json-translator translate --mock -L de --batch-size 10 -f
    json-translator completions bash > json-translator.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. Command line flags override file values.

OUTPUT:
    <output>/<code>/<file>.json                   translated files
    <output>/validated/<dirs>/<file>_<code>_validation.json  per-file scores
    <output>/logs/translation_report_<ts>.json/.csv   run summary")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    // @param level: Most verbose level the logger prints; log::max_level filters further
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI colour for log level
    fn decoration_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, colour) = Self::decoration_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                colour,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // The level is updated after loading the config if needed
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "json-translator", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.translate).await,
    }
}

/// Apply command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(input_dir) = &options.input_dir {
        config.input_dir = input_dir.clone();
    }
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }
    if !options.languages.is_empty() {
        config.languages = options.languages.clone();
    }
    if let Some(batch_size) = options.batch_size {
        config.processing.batch_size = batch_size;
    }
    if let Some(options_count) = options.options_count {
        config.processing.options_count = options_count;
    }
    if let Some(concurrency) = options.concurrency {
        config.processing.concurrent_requests = concurrency;
    }
    if let Some(model) = &options.options_model {
        config.models.options_model = model.clone();
    }
    if let Some(model) = &options.selection_model {
        config.models.selection_model = model.clone();
    }
    if let Some(model) = &options.refinement_model {
        config.models.refinement_model = model.clone();
    }
    if let Some(model) = &options.validation_model {
        config.models.validation_model = model.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if options.mock {
        config.mock_mode = true;
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);
    log::set_max_level(level_filter(&config.log_level));

    let controller = Controller::with_config(config)?;
    let report = controller.run(options.force_overwrite).await?;

    if report.has_failures() {
        for failure in &report.failures {
            error!(
                "{} [{}]{}: {}",
                failure.file,
                failure.language,
                failure
                    .json_path
                    .as_ref()
                    .map(|p| format!(" at '{}'", p))
                    .unwrap_or_default(),
                failure.message
            );
        }
        return Err(anyhow!(
            "{} of {} documents failed",
            report.failures.len(),
            report.failures.len() + report.success_count()
        ));
    }

    info!(
        "Done: {} documents translated, mean quality {:.2}",
        report.success_count(),
        report.statistics.overall.mean
    );

    Ok(())
}
