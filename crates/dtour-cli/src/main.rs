//! Dtour CLI - run, format and share D tour snippets from a terminal

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use dtour_core::config::Config;
use dtour_core::controller::{ActionOutcome, TourController};
use dtour_core::diagnostics::Severity;
use dtour_core::error::Result as CoreResult;
use dtour_core::host::Navigator;
use dtour_core::hotkeys::HotkeyDispatcher;
use dtour_core::render::RenderedOutput;
use dtour_core::session::{ImportParams, NavigationContext};
use dtour_core::storage::{JsonFileStorage, MemoryStorage, Storage};
use tracing::{debug, info};

/// Host name scoping sessions opened from local files
const FILE_HOST: &str = "cli";

#[derive(Parser)]
#[command(name = "dtour")]
#[command(author, version, about = "Run, format and share D tour snippets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Compiler to use (dmd, ldc, ...)
    #[arg(long, global = true)]
    compiler: Option<String>,

    /// Extra compiler arguments
    #[arg(long, global = true, allow_hyphen_values = true)]
    args: Option<String>,

    /// Output format (text, html or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Html,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and run a snippet
    Run { file: PathBuf },

    /// Show the disassembly of a snippet
    Asm { file: PathBuf },

    /// Show the LLVM IR of a snippet (ldc only)
    Ir { file: PathBuf },

    /// Show the lowered AST of a snippet
    Ast { file: PathBuf },

    /// Format a snippet
    Format {
        file: PathBuf,
        /// Write the formatted source back to the file
        #[arg(short, long)]
        write: bool,
    },

    /// Create a short link for a snippet
    Share { file: PathBuf },

    /// Publish a snippet as a gist
    Gist { file: PathBuf },

    /// Print a link opening a snippet in the standalone editor
    Url { file: PathBuf },

    /// Show the snippet of a tour page, including local edits
    Lesson {
        chapter: String,
        section: String,
        /// Tour language (defaults to session.language)
        #[arg(long)]
        language: Option<String>,
        /// Replace the page's snippet with the contents of a file
        #[arg(long)]
        set: Option<PathBuf>,
    },

    /// Restore the original snippet of a tour page
    Reset {
        chapter: String,
        section: String,
        /// Tour language (defaults to session.language)
        #[arg(long)]
        language: Option<String>,
    },

    /// Add a dub dependency to a snippet's package header
    AddLibrary {
        file: PathBuf,
        name: String,
        version: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// List keyboard shortcuts
    Keys,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration
    List,
    /// Reset to defaults
    Reset,
    /// Show config file path
    Path,
}

/// Navigator that reports where the browser would go
#[derive(Debug)]
struct TerminalNavigator {
    origin: String,
    quiet: bool,
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, url: &str) -> CoreResult<()> {
        if !self.quiet {
            eprintln!("Navigate: {}", url);
        }
        Ok(())
    }

    fn open_in_new_context(&self, url: &str) -> CoreResult<()> {
        if !self.quiet {
            eprintln!("Open: {}", url);
        }
        Ok(())
    }

    fn origin(&self) -> String {
        self.origin.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "dtour=debug" } else { "dtour=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = Options {
        compiler: cli.compiler,
        args: cli.args,
        format: cli.format,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Run { file } => cmd_execute(&file, Variant::Run, &opts).await,
        Commands::Asm { file } => cmd_execute(&file, Variant::Asm, &opts).await,
        Commands::Ir { file } => cmd_execute(&file, Variant::Ir, &opts).await,
        Commands::Ast { file } => cmd_execute(&file, Variant::Ast, &opts).await,
        Commands::Format { file, write } => cmd_format(&file, write, &opts).await,
        Commands::Share { file } => cmd_share(&file, &opts).await,
        Commands::Gist { file } => cmd_gist(&file, &opts).await,
        Commands::Url { file } => cmd_url(&file, &opts),
        Commands::Lesson {
            chapter,
            section,
            language,
            set,
        } => cmd_lesson(language.as_deref(), &chapter, &section, set.as_deref(), &opts).await,
        Commands::Reset {
            chapter,
            section,
            language,
        } => cmd_reset(language.as_deref(), &chapter, &section, &opts).await,
        Commands::AddLibrary {
            file,
            name,
            version,
        } => cmd_add_library(&file, &name, &version, &opts),
        Commands::Config { action } => cmd_config(action, opts.quiet),
        Commands::Keys => cmd_keys(),
    }
}

struct Options {
    compiler: Option<String>,
    args: Option<String>,
    format: OutputFormat,
    quiet: bool,
}

#[derive(Clone, Copy, Debug)]
enum Variant {
    Run,
    Asm,
    Ir,
    Ast,
}

// ========== Controller setup ==========

fn build_controller(storage: Arc<dyn Storage>, quiet: bool) -> anyhow::Result<TourController> {
    let config = Config::load()?;
    let navigator = TerminalNavigator {
        origin: config.service.app_origin.clone(),
        quiet,
    };
    let controller = TourController::builder()
        .config(config)
        .storage(storage)
        .navigator(Arc::new(navigator))
        .build()
        .context("Failed to create controller")?;
    Ok(controller)
}

/// Controller holding a local file's contents as an imported snippet
///
/// File sessions are not persisted; the file itself is the saved state.
fn open_file(file: &Path, opts: &Options) -> anyhow::Result<TourController> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read snippet: {}", file.display()))?;
    let controller = build_controller(Arc::new(MemoryStorage::new()), opts.quiet)?;

    let mut params = ImportParams::for_host(FILE_HOST).with_source(source);
    if let Some(compiler) = &opts.compiler {
        params = params.with_compiler(compiler.clone());
    }
    if let Some(args) = &opts.args {
        params = params.with_args(args.clone());
    }
    controller.init_from_import(None, &params)?;
    debug!(file = %file.display(), "Opened snippet file");
    Ok(controller)
}

/// Controller for a tour page with edits persisted in the data directory
/// Load a tour page; `language` falls back to the configured one
async fn open_lesson(
    language: Option<&str>,
    chapter: &str,
    section: &str,
    opts: &Options,
) -> anyhow::Result<TourController> {
    let storage = JsonFileStorage::new(Config::storage_path()?);
    let controller = build_controller(Arc::new(storage), opts.quiet)?;
    let language = language
        .unwrap_or(controller.config().session.language.as_str())
        .to_string();
    let context = NavigationContext::new(language.as_str(), chapter, section)
        .with_repo(controller.config().session.github_repo.clone());

    match controller.init_from_context(context).await? {
        ActionOutcome::Applied => {}
        _ => bail!(
            "Could not load {}/{}/{}: {}",
            language,
            chapter,
            section,
            controller.output().as_str()
        ),
    }
    if let Some(compiler) = &opts.compiler {
        controller.set_compiler(compiler.clone());
    }
    if let Some(args) = &opts.args {
        controller.set_args(args.clone());
    }
    Ok(controller)
}

// ========== Output ==========

fn print_view(controller: &TourController, file: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let view = controller.view();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&view)?);
            return Ok(());
        }
        OutputFormat::Html => println!("{}", view.output.as_str()),
        OutputFormat::Text => match &view.output {
            RenderedOutput::Text(text) => println!("{}", text),
            _ => {
                print!("{}", view.raw_output);
                if !view.raw_output.ends_with('\n') {
                    println!();
                }
            }
        },
    }

    for diagnostic in view.diagnostics.errors.iter().chain(&view.diagnostics.warnings) {
        let label = match diagnostic.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        eprintln!(
            "{}:{}: {}: {}",
            file.display(),
            diagnostic.line,
            label,
            diagnostic.message
        );
    }
    Ok(())
}

fn check_outcome(outcome: ActionOutcome, controller: &TourController) -> anyhow::Result<()> {
    match outcome {
        ActionOutcome::Applied => Ok(()),
        ActionOutcome::Skipped => bail!("Nothing to do"),
        _ => bail!("{}", controller.output().as_str()),
    }
}

// ========== Commands ==========

async fn cmd_execute(file: &Path, variant: Variant, opts: &Options) -> anyhow::Result<()> {
    let controller = open_file(file, opts)?;
    let outcome = match variant {
        Variant::Run => controller.run(None).await,
        Variant::Asm => controller.asm().await,
        Variant::Ir => controller.ir().await,
        Variant::Ast => controller.ast().await,
    };
    info!(?variant, ?outcome, "Execution finished");

    match outcome {
        ActionOutcome::Applied => print_view(&controller, file, opts.format),
        other => check_outcome(other, &controller),
    }
}

async fn cmd_format(file: &Path, write: bool, opts: &Options) -> anyhow::Result<()> {
    let controller = open_file(file, opts)?;
    check_outcome(controller.format().await, &controller)?;

    let formatted = controller.source();
    if write {
        fs::write(file, &formatted)
            .with_context(|| format!("Failed to write snippet: {}", file.display()))?;
        if !opts.quiet {
            println!("Formatted {}", file.display());
        }
    } else {
        print!("{}", formatted);
    }
    Ok(())
}

async fn cmd_share(file: &Path, opts: &Options) -> anyhow::Result<()> {
    let controller = open_file(file, opts)?;
    check_outcome(controller.shorten().await, &controller)?;
    let url = controller.copy_share_link()?;
    println!("{}", url);
    Ok(())
}

async fn cmd_gist(file: &Path, opts: &Options) -> anyhow::Result<()> {
    let controller = open_file(file, opts)?;
    check_outcome(controller.create_gist().await, &controller)?;
    if let Some(link) = controller.share_link() {
        println!("{}", link.url);
    }
    Ok(())
}

fn cmd_url(file: &Path, opts: &Options) -> anyhow::Result<()> {
    let controller = open_file(file, opts)?;
    println!("{}", controller.build_standalone_url()?);
    Ok(())
}

async fn cmd_lesson(
    language: Option<&str>,
    chapter: &str,
    section: &str,
    set: Option<&Path>,
    opts: &Options,
) -> anyhow::Result<()> {
    let controller = open_lesson(language, chapter, section, opts).await?;
    let language = controller.context().map(|c| c.language).unwrap_or_default();
    if let Some(path) = set {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snippet: {}", path.display()))?;
        controller.edit(source);
        if !opts.quiet {
            eprintln!("Saved local edit for {}/{}/{}", language, chapter, section);
        }
    }
    let session = controller.session();
    if !opts.quiet && session.is_modified() {
        eprintln!(
            "(locally modified; `dtour reset {} {} --language {}` restores it)",
            chapter, section, language
        );
    }
    print!("{}", session.source());
    Ok(())
}

async fn cmd_reset(language: Option<&str>, chapter: &str, section: &str, opts: &Options) -> anyhow::Result<()> {
    let controller = open_lesson(language, chapter, section, opts).await?;
    controller.reset();
    if opts.quiet {
        return Ok(());
    }
    print!("{}", controller.source());
    Ok(())
}

fn cmd_add_library(file: &Path, name: &str, version: &str, opts: &Options) -> anyhow::Result<()> {
    let controller = open_file(file, opts)?;
    check_outcome(controller.add_library(name, version), &controller)?;
    fs::write(file, controller.source())
        .with_context(|| format!("Failed to write snippet: {}", file.display()))?;
    if !opts.quiet {
        println!("Added {} ~>{} to {}", name, version, file.display());
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn cmd_keys() -> anyhow::Result<()> {
    let hotkeys = HotkeyDispatcher::default();
    for (combo, action) in hotkeys.bindings() {
        let suppress = if action.prevents_default() { " (suppresses default)" } else { "" };
        println!("{:<14} {}{}", combo.to_string(), action.description(), suppress);
    }
    Ok(())
}
