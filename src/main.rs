// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use transbook::app_config::{self, Config, TranslationMode};
use transbook::app_controller::Controller;
use transbook::text::ChunkMode;
use transbook::translation::PhoneticSource;

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

/// CLI Wrapper for TranslationMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliMode {
    Standard,
    WordByWord,
}

impl From<CliMode> for TranslationMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Standard => TranslationMode::Standard,
            CliMode::WordByWord => TranslationMode::WordByWord,
        }
    }
}

/// CLI Wrapper for PhoneticSource to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliPhoneticSource {
    Source,
    Target,
    Auto,
}

impl From<CliPhoneticSource> for PhoneticSource {
    fn from(source: CliPhoneticSource) -> Self {
        match source {
            CliPhoneticSource::Source => PhoneticSource::Source,
            CliPhoneticSource::Target => PhoneticSource::Target,
            CliPhoneticSource::Auto => PhoneticSource::Auto,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a text file into an HTML book (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for transbook
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Default)]
struct TranslateArgs {
    /// Input text file, or '-' for stdin
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output HTML file (default: <input>.<target>.html next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force_overwrite: bool,

    /// Primary model name
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'zh', 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'vi', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Translation mode
    #[arg(long, value_enum)]
    mode: Option<CliMode>,

    /// Which text the pinyin line is generated from
    #[arg(long, value_enum)]
    phonetic_source: Option<CliPhoneticSource>,

    /// Skip the reference-language translation
    #[arg(long)]
    no_reference: bool,

    /// Chunk budget in characters
    #[arg(long)]
    max_chars: Option<usize>,

    /// Chunk by sentence instead of packing to the budget
    #[arg(long)]
    sentences: bool,

    /// Chunks translated at once (1-16)
    #[arg(long)]
    concurrency: Option<usize>,

    /// HTML template with a single {{content}} placeholder
    #[arg(long)]
    template: Option<PathBuf>,

    /// Check the connection to the model before translating
    #[arg(long)]
    check_connection: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// transbook - book translation with Gemini
///
/// Cleans up pasted or PDF-extracted text, translates it chunk by chunk and
/// writes a bilingual HTML book with pinyin and reference lines.
#[derive(Parser, Debug)]
#[command(name = "transbook")]
#[command(version)]
#[command(about = "AI-powered book translation into bilingual HTML")]
#[command(long_about = "transbook cleans up text, splits it into chunks, translates them with Gemini and renders an HTML book.

EXAMPLES:
    transbook novel.txt                          # Translate using default config
    transbook -f novel.txt                       # Overwrite an existing book
    transbook -s zh -t vi novel.txt              # Translate from Chinese to Vietnamese
    transbook --mode word-by-word poem.txt       # Interactive word-by-word view
    cat chapter.txt | transbook - -o ch1.html    # Read from stdin
    transbook completions bash > transbook.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically. The API key may also come from the
    GEMINI_API_KEY environment variable.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    args: TranslateArgs,
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
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install with the most verbose filter; the effective level is set via max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "transbook", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => run_translate(args).await,
        None => run_translate(cli.args).await,
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let input_path = options
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required (use '-' for stdin)"))?;

    let mut config = load_config(&options.config_path)?;
    apply_overrides(&mut config, &options);

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;

    if options.check_connection {
        controller.check_connection().await?;
        info!("Connection OK");
    }

    // Ctrl-C stops dispatching; chunks already in flight finish
    let token = controller.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling remaining chunks");
            token.cancel();
        }
    });

    controller
        .run(input_path, options.output.clone(), options.force_overwrite)
        .await?;

    Ok(())
}

// Load or create configuration
fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;
        return Ok(config);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();

    let config_json = serde_json::to_string_pretty(&config)
        .context("Failed to serialize default config to JSON")?;
    std::fs::write(config_path, config_json)
        .context(format!("Failed to write default config to file: {}", config_path))?;

    Ok(config)
}

// Override config with CLI options if provided
fn apply_overrides(config: &mut Config, options: &TranslateArgs) {
    if let Some(model) = &options.model {
        config.translation.primary_model = model.clone();
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(mode) = &options.mode {
        config.translation.mode = mode.clone().into();
    }
    if let Some(source) = &options.phonetic_source {
        config.translation.phonetic_source = source.clone().into();
    }
    if options.no_reference {
        config.translation.include_reference = false;
    }
    if let Some(max_chars) = options.max_chars {
        config.chunking.max_chars = max_chars;
    }
    if options.sentences {
        config.chunking.mode = ChunkMode::Sentence;
    }
    if let Some(concurrency) = options.concurrency {
        config.translation.concurrent_requests = concurrency;
    }
    if let Some(template) = &options.template {
        config.output.template_path = Some(template.to_string_lossy().to_string());
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}
