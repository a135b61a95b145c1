use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uuidcache::{CacheConfig, IdentityRecord, UuidCache, parse_token};

#[derive(Parser)]
#[command(name = "uuidcache")]
#[command(about = "Inspect and repair a player UUID cache file")]
struct Cli {
    /// Cache file to operate on
    #[arg(long, global = true, default_value = CacheConfig::DEFAULT_FILE_NAME)]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a full or unique partial name to a UUID
    Lookup {
        name: String,
        /// Do not complete partial names
        #[arg(long)]
        exact: bool,
    },
    /// Show the name currently held by a UUID
    Name { uuid: String },
    /// Print counts and consistency problems
    Stats,
    /// Release the name held by a UUID and save
    Untrack { uuid: String },
    /// Record a login by hand and save
    Login { uuid: String, name: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cache = UuidCache::open_file(&cli.file)
        .with_context(|| format!("failed to open {}", cli.file.display()))?;

    match cli.command {
        Command::Lookup { name, exact } => lookup(&cache, &name, exact),
        Command::Name { uuid } => show_name(&cache, &uuid),
        Command::Stats => stats(&cache),
        Command::Untrack { uuid } => {
            let token = parse_token(&uuid)?;
            if cache.untrack(token)? {
                println!("Untracked {}", token);
            } else {
                println!("{} holds no name", token);
            }
            cache.close().context("failed to save cache")
        }
        Command::Login { uuid, name } => {
            let token = parse_token(&uuid)?;
            if cache.on_login(token, &name)? {
                println!("{} is now \"{}\"", token, name);
            } else {
                println!("{} already holds \"{}\"", token, name);
            }
            cache.close().context("failed to save cache")
        }
    }
}

fn lookup(cache: &UuidCache, name: &str, exact: bool) -> Result<()> {
    let found = if exact {
        cache.uuid_exact(name)?
    } else {
        cache.uuid(name)?
    };

    let token = found.ok_or_else(|| anyhow!("no unique player matches '{}'", name))?;
    let canonical = cache.name(&token)?.unwrap_or_default();
    println!("{} {}", token, canonical);
    Ok(())
}

fn show_name(cache: &UuidCache, raw: &str) -> Result<()> {
    let token = parse_token(raw)?;
    match cache.record(&token)? {
        Some(IdentityRecord::Live(name)) => println!("{}", name),
        Some(IdentityRecord::Tombstoned) => println!("{} is known but holds no name", token),
        None => return Err(anyhow!("{} has never been seen", token)),
    }
    Ok(())
}

fn stats(cache: &UuidCache) -> Result<()> {
    println!("{}", cache.stats()?);
    println!("load: {}", cache.load_report());

    let problems = cache.verify()?;
    if problems.is_empty() {
        println!("consistent");
    }
    for problem in problems {
        let kind = if problem.is_transient() { "pending" } else { "error" };
        println!("{}: {}", kind, problem);
    }
    Ok(())
}
