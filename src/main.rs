// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anonymizer::app_config::{self, Config, TranslationProvider};
use anonymizer::app_controller::{Controller, OutputFormat};
use anonymizer::file_utils::FileManager;
use anonymizer::masking::SubstitutionOrder;
use anonymizer::models::ModelStore;
use anonymizer::truecase::StatisticalTrueCaser;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    OpenAI,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

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

/// CLI Wrapper for SubstitutionOrder to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSubstitutionOrder {
    LongestFirst,
    Insertion,
}

impl From<CliSubstitutionOrder> for SubstitutionOrder {
    fn from(order: CliSubstitutionOrder) -> Self {
        match order {
            CliSubstitutionOrder::LongestFirst => SubstitutionOrder::LongestFirst,
            CliSubstitutionOrder::Insertion => SubstitutionOrder::Insertion,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Anonymize text, a file or a directory of .txt files (default command)
    Anonymize(AnonymizeArgs),

    /// Download model files that are missing from the model directory
    FetchModels(ConfigArgs),

    /// Build a true-casing model from a plain-text corpus
    TrainTruecaser {
        /// Corpus file, one or more sentences per line
        #[arg(long, value_name = "PATH")]
        corpus: PathBuf,

        /// Where to write the JSON model
        #[arg(long, value_name = "PATH")]
        output: PathBuf,
    },

    /// Generate shell completions for anonymizer
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug, Clone)]
struct AnonymizeArgs {
    /// Sentence to anonymize; read from stdin when neither TEXT nor --input is given
    #[arg(value_name = "TEXT", conflicts_with = "input")]
    text: Option<String>,

    /// Company-name list, one name per line (defaults to gazetteer_path in the config)
    #[arg(short, long, value_name = "PATH")]
    gazetteer: Option<PathBuf>,

    /// Input file (one sentence per line) or directory of .txt files
    #[arg(short, long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output file (defaults to stdout, or <stem>.anon.txt for file input)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'et')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Order in which entity keys are substituted
    #[arg(long, value_enum)]
    order: Option<CliSubstitutionOrder>,

    /// Print a JSON report per sentence instead of the masked text
    #[arg(long)]
    report: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

/// Anonymizer - masks named entities, company names and digits in text
///
/// Each sentence is translated, true-cased and run through three entity
/// recognizers; every entity found is replaced by its category label.
#[derive(Parser, Debug)]
#[command(name = "anonymizer")]
#[command(version)]
#[command(about = "Named-entity anonymization of free text")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "Anonymizer translates each sentence, restores its casing, finds named entities \
with three recognizers and replaces them, together with known company names, by category labels. \
Every digit becomes X.

EXAMPLES:
    anonymizer \"Jaan Tamm töötab Acme Corp-is.\"          # Anonymize one sentence
    anonymizer -g companies.txt -i notes.txt               # Writes notes.anon.txt
    anonymizer -i ./letters/ -f                            # Every .txt file in a directory
    anonymizer --report \"Mari elab Tartus.\"                # JSON with intermediate results
    anonymizer fetch-models                                # Download missing model files
    anonymizer train-truecaser --corpus en.txt --output models/truecase.json
    anonymizer completions bash > anonymizer.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.1:8b)
    openai    - OpenAI API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    anonymize: AnonymizeArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for a level
    fn decoration(level: Level) -> (&'static str, &'static str) {
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
            let (emoji, color) = Self::decoration(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
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
    // Level is adjusted once the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "anonymizer", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::TrainTruecaser { corpus, output }) => run_train_truecaser(&corpus, &output),
        Some(Commands::FetchModels(args)) => run_fetch_models(args).await,
        Some(Commands::Anonymize(args)) => run_anonymize(args).await,
        None => run_anonymize(cli.anonymize).await,
    }
}

/// Load or create the configuration and apply the log level
fn load_config(args: &ConfigArgs) -> Result<Config> {
    if let Some(cmd_log_level) = &args.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let config_path = Path::new(&args.config_path);
    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", args.config_path);
        let config = Config::default();
        config.save(config_path)?;
        config
    };

    match &args.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(level_filter(&config.log_level)),
    }
    Ok(config)
}

async fn run_anonymize(options: AnonymizeArgs) -> Result<()> {
    let mut config = load_config(&options.config)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        let provider_str = config.translation.provider.to_lowercase_string();
        match config
            .translation
            .available_providers
            .iter_mut()
            .find(|p| p.provider_type == provider_str)
        {
            Some(provider_config) => provider_config.model = model.clone(),
            None => {
                let mut provider_config = app_config::ProviderConfig::new(config.translation.provider.clone());
                provider_config.model = model.clone();
                config.translation.available_providers.push(provider_config);
            }
        }
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(order) = &options.order {
        config.masking.order = order.clone().into();
    }

    config.validate().context("Configuration validation failed")?;

    let format = if options.report { OutputFormat::Report } else { OutputFormat::Text };
    let controller = Controller::with_config(config).await?.with_format(format);
    let gazetteer = controller.load_gazetteer(options.gazetteer.as_deref())?;

    if let Some(input) = &options.input {
        if input.is_file() {
            controller
                .run_file(input, options.output.clone(), &gazetteer, options.force_overwrite)
                .await?;
        } else if input.is_dir() {
            if options.output.is_some() {
                warn!("--output is ignored for directory input");
            }
            controller.run_folder(input, &gazetteer, options.force_overwrite).await?;
        } else {
            return Err(anyhow!("Input path does not exist: {:?}", input));
        }
        return Ok(());
    }

    let rendered = match &options.text {
        Some(text) => controller.run_text(text, &gazetteer).await?,
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read stdin")?;
            controller.run_lines(&content, &gazetteer, None).await?
        }
    };

    match &options.output {
        Some(path) => {
            if path.exists() && !options.force_overwrite {
                return Err(anyhow!("Output file already exists: {:?} (use -f to force overwrite)", path));
            }
            FileManager::write_to_file(path, &format!("{}\n", rendered))?;
            info!("Wrote {:?}", path);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

async fn run_fetch_models(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;
    config.validate().context("Configuration validation failed")?;

    let store = ModelStore::from_config(&config.models).with_progress(true);
    let downloaded = store.ensure_assets().await?;
    let still_missing = store.missing_assets();

    info!("Downloaded {} model file(s) into {:?}", downloaded.len(), store.dir());
    for asset in still_missing {
        warn!("{} is missing and has no download URL ({:?})", asset.name, store.asset_path(asset));
    }
    Ok(())
}

fn run_train_truecaser(corpus: &Path, output: &Path) -> Result<()> {
    info!("Training true-case model from {:?}", corpus);
    let model = StatisticalTrueCaser::train_on_file(corpus)?;
    if model.is_empty() {
        return Err(anyhow!("Corpus {:?} produced an empty model", corpus));
    }
    model.save(output)?;
    info!("Saved true-case model to {:?}", output);
    Ok(())
}
