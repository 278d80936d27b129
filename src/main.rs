use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pmc_reader::config::{
    default_config_path, find_config_file, get_config, load_config, write_default_config, Config,
};
use pmc_reader::models::{extract_pmc_id, ContentResult, FigureIndex, PmcId};
use pmc_reader::parser::parse_article;
use pmc_reader::utils::{render_article, render_content, terminal_width, RenderOptions};
use pmc_reader::ContentAssembler;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// PMC Reader - Fetch PubMed Central articles as structured content
#[derive(Parser, Debug)]
#[command(name = "pmc-reader")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch PubMed Central articles and normalize their full text", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pipeline timeout in seconds (0 disables it)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Text on a terminal, JSON otherwise
    Auto,
    /// JSON (machine-readable)
    Json,
    /// Wrapped text (human-readable)
    Text,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if std::io::stdout().is_terminal() => OutputFormat::Text,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch an article by URL and print its content
    #[command(alias = "f")]
    Fetch {
        /// Article URL containing a PMC identifier, e.g. https://pmc.ncbi.nlm.nih.gov/articles/PMC4136787/
        url: String,

        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Auto)]
        output: OutputFormat,
    },

    /// Parse a saved full-text XML document offline
    #[command(alias = "p")]
    Parse {
        /// efetch XML file
        file: PathBuf,

        /// PMC identifier to use when the document has none
        #[arg(long)]
        id: Option<String>,

        /// Saved article page to resolve figure image URLs from
        #[arg(long)]
        figure_page: Option<PathBuf>,

        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Auto)]
        output: OutputFormat,
    },

    /// Print the PMC identifier in a URL
    Id {
        url: String,
    },

    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,

    /// Write a default configuration file
    Init {
        /// Destination (defaults to the per-user config directory)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = match &config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => get_config().context("Failed to read configuration from environment")?,
    };
    if let Some(timeout) = cli.timeout {
        config.pipeline.request_timeout_secs = timeout;
    }

    init_logging(&cli, &config);
    if let Some(path) = &config_path {
        tracing::debug!("Using config file: {}", path.display());
    }

    match cli.command {
        Commands::Fetch { url, output } => {
            let assembler = ContentAssembler::pmc(&config)?;
            let result = tokio::select! {
                result = assembler.get_article_content(&url) => result,
                _ = tokio::signal::ctrl_c() => anyhow::bail!("Interrupted"),
            };
            print_result(&result, output)?;
        }

        Commands::Parse {
            file,
            id,
            figure_page,
            output,
        } => {
            let xml = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let fallback_id = match id {
                Some(raw) => Some(
                    PmcId::parse(&raw).with_context(|| format!("Invalid PMC identifier: {}", raw))?,
                ),
                None => None,
            };

            let index = match figure_page {
                Some(path) => {
                    let html = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    FigureIndex::from_html(&html)
                }
                None => FigureIndex::new(),
            };
            tracing::debug!(figures = index.len(), "Figure URLs available");

            let content = parse_article(
                &xml,
                fallback_id.as_ref(),
                &index,
                &config.endpoints.article_base,
            )
            .with_context(|| format!("Malformed document {}", file.display()))?;

            match output.resolve() {
                OutputFormat::Text => print!("{}", render_article(&content, render_options())),
                _ => println!("{}", serde_json::to_string_pretty(&content)?),
            }
        }

        Commands::Id { url } => match extract_pmc_id(&url) {
            Some(id) => println!("{}", id),
            None => anyhow::bail!("No PMC identifier in {}", url),
        },

        Commands::Config { action } => match action {
            ConfigAction::Show => print!("{}", toml::to_string_pretty(&config)?),
            ConfigAction::Init { path } => {
                let path = path
                    .or_else(default_config_path)
                    .context("Could not determine the configuration directory")?;
                write_default_config(&path)?;
                eprintln!("Wrote {}", path.display());
            }
        },
    }

    Ok(())
}

fn init_logging(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("pmc_reader={}", level)),
    );
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if config.logging.is_json() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn render_options() -> RenderOptions {
    RenderOptions {
        width: terminal_width().min(100),
        color: std::io::stdout().is_terminal(),
    }
}

fn print_result(result: &ContentResult, output: OutputFormat) -> Result<()> {
    match output.resolve() {
        OutputFormat::Text => print!("{}", render_content(result, render_options())),
        _ => println!("{}", serde_json::to_string_pretty(result)?),
    }
    Ok(())
}
