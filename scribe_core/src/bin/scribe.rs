//! `scribe` command-line entry point.
//!
//! Wires configuration, logging, the plugin registry and the annotator
//! together; all behavior lives in `scribe_core`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scribe_core::config::ScribeConfig;
use scribe_core::logging::init_logging;
use scribe_core::plugins::{default_registry, PluginService};
use scribe_core::{
    Annotator, CommentCache, CommentGenerator, CommentHistory, CommentStyle, Repository,
};

/// Command line interface for scribe
#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(about = "Generate declaration comments and trace comment history")]
#[command(version)]
struct Cli {
    /// Path to configuration file (defaults to `.scribe/config.toml` in the project root)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Insert comments above every declaration in a file or directory
    Annotate {
        /// File or directory to annotate
        path: PathBuf,
        /// Rewrite files instead of printing a diff
        #[arg(long)]
        write: bool,
        /// Commit each rewritten file (implies --write)
        #[arg(long)]
        commit: bool,
        /// Comment style: google, numpy, doxygen, javadoc, jsdoc or line
        #[arg(long)]
        style: Option<String>,
        /// Force a language instead of resolving by extension
        #[arg(long)]
        language: Option<String>,
    },
    /// Print how a file's comments changed across commits, as JSON
    History {
        /// File to inspect
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let target = match &cli.command {
        Commands::Annotate { path, .. } | Commands::History { path } => path.clone(),
    };
    let search_dir = if target.is_dir() {
        target.clone()
    } else {
        target
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    };
    let repository = Repository::open(&search_dir).ok();
    let root = repository
        .as_ref()
        .map_or_else(|| search_dir.clone(), |repo| repo.root().to_path_buf());

    let mut config = match &cli.config {
        Some(path) => ScribeConfig::load_from_path(path),
        None => ScribeConfig::load(&root),
    }
    .context("failed to load configuration")?;
    if cli.verbose {
        config.logging.level = "debug".to_owned();
    }
    init_logging(&config.logging).context("failed to initialise logging")?;

    let plugins = PluginService::new(default_registry());

    match cli.command {
        Commands::Annotate {
            path,
            write,
            commit,
            style,
            language,
        } => {
            let mut options = config.annotate_options();
            options.write |= write || commit;
            if commit {
                options.commit_message = Some(config.commit_message.clone());
            }
            if let Some(style) = style {
                options.style = Some(CommentStyle::from_name(&style));
                options.styles.clear();
            }
            if language.is_some() {
                options.language = language;
            }

            let cache = CommentCache::load(config.cache_path(&root));
            let generator = CommentGenerator::new(config.build_oracle(), cache);
            let mut annotator = Annotator::new(plugins, generator);
            if options.commit_message.is_some() {
                let repository = repository
                    .context("--commit requires the path to be inside a git repository")?;
                annotator = annotator.with_repository(repository);
            }

            if path.is_dir() {
                let report = annotator.annotate_tree(&path, &options);
                for outcome in report.succeeded() {
                    print_outcome(outcome);
                }
                let mut failed = false;
                for (file, err) in report.failures() {
                    eprintln!("{}: {err}", file.display());
                    failed = true;
                }
                Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
            } else {
                let outcome = annotator
                    .annotate_file(&path, &options)
                    .with_context(|| format!("failed to annotate {}", path.display()))?;
                print_outcome(&outcome);
                Ok(ExitCode::SUCCESS)
            }
        }
        Commands::History { path } => {
            let repository = repository.context("history requires a git repository")?;
            let history = CommentHistory::new(&repository, &plugins);
            let absolute = std::fs::canonicalize(&path)
                .unwrap_or_else(|_| std::env::current_dir().unwrap_or_default().join(&path));
            let deltas = history
                .comment_history(&absolute)
                .with_context(|| format!("failed to read comment history of {}", path.display()))?;
            println!("{}", serde_json::to_string_pretty(&deltas)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_outcome(outcome: &scribe_core::FileOutcome) {
    if let Some(patch) = &outcome.patch {
        print!("{patch}");
    } else if outcome.written {
        let commit = outcome
            .commit
            .as_deref()
            .map(|id| format!(" (commit {id})"))
            .unwrap_or_default();
        println!(
            "{}: {} comment(s) inserted{commit}",
            outcome.path.display(),
            outcome.inserted
        );
    }
}
