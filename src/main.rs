use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use docgrep::cli::Cli;
use docgrep::config::{self, Config};
use docgrep::db::Database;
use docgrep::error::Error;
use docgrep::indexer::{self, embedder::OnnxEmbedder};
use docgrep::search::{self, Match, store::MemoryStore};
use docgrep::{loader, model, select};

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<Error>() {
            Some(Error::NoMatch(_)) => {
                eprintln!("{} {}", "Info:".blue(), e);
                ExitCode::from(1)
            }
            Some(err) => {
                eprintln!("{} {:#}", "Error:".red(), e);
                ExitCode::from(err.exit_code())
            }
            None => {
                eprintln!("{} {:#}", "Error:".red(), e);
                ExitCode::from(2)
            }
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    if cli.print_config {
        return print_config(&config);
    }

    let k = cli.k.unwrap_or(config.default_k);
    let model_id = cli.model.as_deref().unwrap_or(&config.model);
    let spec = model::lookup(model_id)?;

    let query = read_query(cli.query.as_deref())?;

    // Selection and loading run before the model loads, so bad paths
    // never pay the model startup cost
    let files = select::collect_files(&cli.paths, &cli.ext)?;
    let docs = loader::load_documents(&files, config.max_file_bytes);
    if docs.is_empty() {
        return Err(Error::NoMatch("no readable files in selection".into()).into());
    }

    let db = Database::open(&config::cache_db_path())?;

    let base_dir = config::docgrep_dir();
    let model_dir = model::ensure_model(&base_dir, spec)?;
    let mut embedder = OnnxEmbedder::load(&model_dir, spec)?;

    let mut store = MemoryStore::new();
    indexer::embed_corpus(&db, &mut embedder, &docs, &mut store)?;

    let matches = search::rank(&mut embedder, &store, &query, k)?;
    if matches.is_empty() {
        return Err(Error::NoMatch(format!("no matches for \"{}\"", query)).into());
    }

    print_matches(&matches, cli.scores, cli.json)
}

/// Takes the query from the flag, falling back to standard input
fn read_query(flag: Option<&str>) -> Result<String> {
    let raw = match flag {
        Some(q) => q.to_string(),
        None => std::io::read_to_string(std::io::stdin())?,
    };

    let query = raw.trim().to_string();
    if query.is_empty() {
        anyhow::bail!("query is empty; pass -q/--query or pipe text on stdin");
    }
    Ok(query)
}

fn print_matches(matches: &[Match], scores: bool, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(matches)?);
        return Ok(());
    }

    for m in matches {
        if scores {
            println!("{}\t{:.4}", m.path, m.score);
        } else {
            println!("{}", m.path);
        }
    }
    Ok(())
}

fn print_config(config: &Config) -> Result<()> {
    let path = config::config_path();

    println!("{} {}\n", "Config file:".bold(), path.display());
    println!("{}", toml::to_string_pretty(config)?);

    if !path.exists() {
        println!(
            "{} No config file found. Creating default at {}",
            "Note:".yellow(),
            path.display()
        );
        config.save()?;
    }

    Ok(())
}
