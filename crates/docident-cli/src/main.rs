use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docident_core::{Config, IdentifierFinder};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "docident",
    about = "Find the DOI or arXiv ID of PDF documents",
    version,
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// PDF files or directories to process.
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Output the full result as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Skip the web-search strategies.
    #[arg(long)]
    no_websearch: bool,

    /// Accept candidates on syntax alone, without registry confirmation.
    #[arg(long)]
    no_webvalidation: bool,

    /// Do not write found identifiers back into the documents.
    #[arg(long)]
    no_store: bool,

    /// Comma-separated ordered list of strategies to run.
    #[arg(long, value_name = "LIST")]
    finders: Option<String>,

    /// Log at debug level (same as DOCIDENT_LOG=debug).
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all config values.
    List,
    /// Get a specific config key.
    Get { key: String },
    /// Set a config key and persist it.
    Set { key: String, value: String },
}

// ─── Main ───────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Config { action }) = cli.command {
        init_logging(cli.verbose, false);
        return run_config(action, cli.json);
    }

    if cli.paths.is_empty() {
        bail!("no input files; run with one or more PDF paths, or `docident config`");
    }

    let mut config = Config::load()?;
    init_logging(cli.verbose, config.verbose);
    if cli.no_websearch {
        config.websearch = false;
    }
    if cli.no_webvalidation {
        config.webvalidation = false;
    }
    if cli.no_store {
        config.save_identifier_metadata = false;
    }
    if let Some(finders) = &cli.finders {
        config.set("finders_methods", finders)?;
    }
    config.validate()?;

    let files = collect_pdfs(&cli.paths)?;
    if files.is_empty() {
        bail!("no PDF files found under the given paths");
    }
    let prefix_paths = files.len() > 1;

    let finder = IdentifierFinder::new(config);
    let failures = run_batch(&finder, &files, cli.json, prefix_paths).await?;
    if failures > 0 {
        bail!("{failures} of {} files could not be processed", files.len());
    }
    Ok(())
}

/// Process every file, reporting per-file errors on stderr instead of
/// aborting the batch. Returns the number of files that failed.
async fn run_batch(
    finder: &IdentifierFinder,
    files: &[PathBuf],
    json: bool,
    prefix_paths: bool,
) -> Result<usize> {
    let mut failures = 0usize;
    for file in files {
        let result = match finder.find(file).await {
            Ok(result) => result,
            Err(err) => {
                eprintln!("{}: {err}", file.display());
                failures += 1;
                continue;
            }
        };

        if json {
            let mut value = serde_json::to_value(&result)?;
            value["path"] = serde_json::Value::String(file.display().to_string());
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            let line = result
                .summary()
                .unwrap_or_else(|| "no identifier found".to_string());
            if prefix_paths {
                println!("{}: {line}", file.display());
            } else {
                println!("{line}");
            }
        }
    }
    Ok(failures)
}

/// Stderr logging: `-v` means debug, the `verbose` setting means info,
/// otherwise warnings only. `DOCIDENT_LOG` overrides everything.
fn init_logging(cli_verbose: bool, config_verbose: bool) {
    let default_level = if cli_verbose {
        "debug"
    } else if config_verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("DOCIDENT_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ─── Input collection ───────────────────────────────────────────────────────

/// Expand the given paths: files are taken as-is, directories contribute
/// their PDF files (non-recursive), sorted by name.
fn collect_pdfs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
                .with_context(|| format!("cannot read directory {}", path.display()))?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|p| p.is_file() && is_pdf(p))
                .collect();
            entries.sort();
            files.extend(entries);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            bail!("no such file: {}", path.display());
        }
    }
    Ok(files)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn batch_continues_past_unreadable_files() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("broken1.pdf");
        let second = dir.path().join("broken2.pdf");
        std::fs::write(&first, b"not a pdf").unwrap();
        std::fs::write(&second, b"also not a pdf").unwrap();

        let finder = IdentifierFinder::new(Config::default());
        let failures = run_batch(&finder, &[first, second], false, true)
            .await
            .unwrap();
        assert_eq!(failures, 2);
    }
}

// ─── Config command ─────────────────────────────────────────────────────────

fn run_config(action: ConfigAction, json: bool) -> Result<()> {
    match action {
        ConfigAction::List => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        }
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {}", config.get(&key)?);
        }
    }
    Ok(())
}
