use clap::{Parser, Subcommand};
use secrecy::SecretString;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use documate::DocumateError;
use documate::app::AppContext;
use documate::cli::commands::{self, ask::AskScope, ingest::IngestSource};
use documate::config::{Config, ConfigLoader};
use documate::repo::RepoManager;
use documate::storage::CollectionLayout;

#[derive(Parser)]
#[command(name = "documate")]
#[command(
    version,
    about = "Chat with your repositories and generate wikis and READMEs from them"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, help = "Use this config file instead of the layered lookup")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clone a git repository or extract a ZIP archive, then index it
    Ingest {
        #[arg(help = "Git URL to clone", required_unless_present = "zip")]
        url: Option<String>,
        #[arg(long, env = "DOCUMATE_PAT", hide_env_values = true, help = "Personal access token for private repositories")]
        pat: Option<String>,
        #[arg(long, conflicts_with = "url", help = "ZIP archive to extract instead of cloning")]
        zip: Option<PathBuf>,
        #[arg(long, help = "Skip indexing the code collection")]
        no_index: bool,
    },

    /// Rebuild the code collection of a local repository
    Index { repo: String },

    /// List local repositories and their collections
    Repos,

    /// Ask a question about a repository, or across all of them
    Ask {
        #[arg(help = "Repository name (omit with --global)", required_unless_present = "global")]
        repo: Option<String>,
        question: Option<String>,
        #[arg(long, short, help = "Search every indexed repository")]
        global: bool,
    },

    /// Research a repository and write its README
    Readme {
        repo: String,
        #[arg(long, short, help = "Write the README here instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Generate or browse a repository wiki
    Wiki {
        #[command(subcommand)]
        action: WikiAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum WikiAction {
    /// Plan, write and index the wiki
    Generate { repo: String },
    /// Print the navigation tree and a page
    Show {
        repo: String,
        #[arg(long, short, help = "Page file to show (defaults to the first page)")]
        page: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json, yaml"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mDocumate encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            if let Some(err) = e.downcast_ref::<DocumateError>()
                && err.is_configuration()
            {
                eprintln!(
                    "\x1b[90mHint: check provider settings with `documate config show` \
                     (files listed by `documate config path`)\x1b[0m"
                );
            }
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    Ok(match path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    })
}

fn run_cli() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("\x1b[33mWarning:\x1b[0m could not read .env: {}", e);
    }

    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Config commands never touch providers
    if let Commands::Config { action } = &cli.command {
        match action {
            ConfigAction::Show { global, format } => commands::config::show(*global, format)?,
            ConfigAction::Path => commands::config::path()?,
            ConfigAction::Init { global, force } => commands::config::init(*global, *force)?,
        }
        return Ok(());
    }

    let config = load_config(cli.config.as_ref())?;
    // Only commands that call a model build the providers
    let app = || AppContext::from_config(&config);
    let rt = Runtime::new()?;

    match cli.command {
        Commands::Ingest {
            url,
            pat,
            zip,
            no_index,
        } => {
            let source = match (zip, url) {
                (Some(file), _) => IngestSource::Zip(file),
                (None, Some(url)) => IngestSource::Git {
                    url,
                    pat: pat.map(SecretString::from),
                },
                (None, None) => anyhow::bail!("either a repository URL or --zip is required"),
            };
            rt.block_on(commands::ingest::run(&app()?, source, !no_index))?;
        }
        Commands::Index { repo } => {
            rt.block_on(commands::index::run(&app()?, &repo))?;
        }
        Commands::Repos => {
            let repos = RepoManager::new(&config.paths.clone_root)?;
            commands::repos::run(&repos, &CollectionLayout::new(&config.paths.vector_root))?;
        }
        Commands::Ask {
            repo,
            question,
            global,
        } => {
            // With --global the lone positional is the question
            let (scope, question) = match (global, repo, question) {
                (true, Some(q), None) | (true, None, Some(q)) => (None, q),
                (false, Some(repo), Some(q)) => (Some(repo), q),
                (true, Some(_), Some(_)) => {
                    anyhow::bail!("--global takes a question only, not a repository")
                }
                _ => anyhow::bail!("a question is required"),
            };
            let scope = match &scope {
                Some(repo) => AskScope::Repository(repo),
                None => AskScope::Global,
            };
            rt.block_on(commands::ask::run(&app()?, scope, &question))?;
        }
        Commands::Readme { repo, output } => {
            rt.block_on(commands::readme::run(&app()?, &repo, output.as_deref()))?;
        }
        Commands::Wiki { action } => match action {
            WikiAction::Generate { repo } => {
                rt.block_on(commands::wiki::generate(&app()?, &repo))?;
            }
            WikiAction::Show { repo, page } => {
                commands::wiki::show(&config.paths.wiki_root, &repo, page.as_deref())?;
            }
        },
        Commands::Config { .. } => {}
    }

    Ok(())
}
