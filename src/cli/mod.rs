//! CLI module for ipservice
//!
//! This module handles command line argument parsing and query logic.

pub mod annotate;

use crate::config::{AppConfig, OutputConfig};
use crate::database::LoadMode;
use crate::download::{Downloader, ensure_database_file};
use crate::error::{IpdbError, Result};
use crate::service::{LookupResult, LookupService};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ipservice")]
#[command(version, about = "Offline IPv4 geolocation lookup backed by a QQwry database")]
#[command(long_about = "Looks up IPv4 addresses in a local qqwry.dat file.\n\n\
    Addresses are read from the command line, from an interactive prompt, or\n\
    from piped text in which every IPv4 address is annotated inline.\n\n\
    Examples:\n  \
    $ ipservice 1.2.3.4\n  \
    $ echo \"Server IP: 8.8.8.8\" | ipservice\n  \
    $ ipservice --json 1.2.3.4\n  \
    $ ipservice --update")]
pub struct Cli {
    /// IPv4 addresses to look up (read from stdin when omitted)
    #[arg(value_name = "IP")]
    pub queries: Vec<String>,

    /// Output JSON
    #[arg(short, long)]
    pub json: bool,

    /// Path to qqwry.dat
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// YAML config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Memory-map the database instead of reading it into memory
    #[arg(long)]
    pub mmap: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Download the latest database and exit
    #[arg(long)]
    pub update: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Fold command line overrides into the loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(ref db) = self.db {
            config.database.path = crate::utils::path::resolve(db);
        }
        if self.mmap {
            config.database.load_mode = LoadMode::Mmap;
        }
        if self.json {
            config.output.json = true;
        }
        if self.no_color || !atty::is(atty::Stream::Stdout) {
            config.output.enable_colors = false;
        }
    }

    pub async fn run(&self, mut config: AppConfig) -> Result<()> {
        self.apply(&mut config);

        if self.print_config {
            print!("{}", config.to_yaml()?);
            return Ok(());
        }

        if self.update {
            Downloader::new()?
                .with_progress(atty::is(atty::Stream::Stderr))
                .update(&config)
                .await?;
            println!("✓ Database updated: {}", config.database.path.display());
            return Ok(());
        }

        ensure_database_file(&config).await?;
        config.validate()?;

        let service = LookupService::open(&config.database.path, config.database.load_mode)?;

        if !self.queries.is_empty() {
            for query in &self.queries {
                println!("{}", render(&query_one(&service, query), &config.output)?);
            }
        } else if atty::is(atty::Stream::Stdin) {
            self.interactive(&service, &config.output)?;
        } else {
            self.pipe(&service, &config.output)?;
        }

        Ok(())
    }

    /// One address per line; `reload` re-reads the database file
    fn interactive(&self, service: &LookupService, output: &OutputConfig) -> Result<()> {
        println!("ipservice interactive mode (type reload to refresh the database, quit or Ctrl+D to exit)");
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;
            let trimmed = line.trim();

            match trimmed {
                "" => continue,
                "quit" | "exit" => break,
                "reload" => match service.reload() {
                    Ok(()) => println!("✓ Database reloaded from {}", service.path().display()),
                    Err(e) => eprintln!("✗ Reload failed: {}", e),
                },
                query => println!("{}", render(&query_one(service, query), output)?),
            }
            stdout.flush()?;
        }

        Ok(())
    }

    /// Annotate every IPv4 address found in piped text
    fn pipe(&self, service: &LookupService, output: &OutputConfig) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut out = stdout.lock();

        for line in stdin.lock().lines() {
            let line = line?;
            let annotated = annotate::annotate_line(&line, output.enable_colors, |ip| {
                service
                    .lookup(ip)
                    .ok()
                    .map(|result| describe(&result))
                    .filter(|info| !info.is_empty())
            });
            writeln!(out, "{}", annotated)?;
        }

        Ok(())
    }
}

/// Outcome of one query, kept together with the text that was asked
pub struct QueryOutcome<'a> {
    pub query: &'a str,
    pub result: Result<LookupResult>,
}

pub fn query_one<'a>(service: &LookupService, query: &'a str) -> QueryOutcome<'a> {
    QueryOutcome {
        query,
        result: service.lookup(query),
    }
}

/// `country area`, skipping empty parts
pub fn describe(result: &LookupResult) -> String {
    [result.country.as_str(), result.area.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a query outcome as text or JSON
pub fn render(outcome: &QueryOutcome<'_>, output: &OutputConfig) -> Result<String> {
    if output.json {
        let value = match &outcome.result {
            Ok(result) => serde_json::to_value(result)?,
            Err(e) => serde_json::json!({ "ip": outcome.query, "error": e.user_message() }),
        };
        return Ok(serde_json::to_string(&value)?);
    }

    let text = match &outcome.result {
        Ok(result) => {
            let info = describe(result);
            let info = if info.is_empty() { "-".to_string() } else { info };
            format!("{} -> {}", outcome.query, annotate::bracket(&info, output.enable_colors))
        }
        Err(IpdbError::NotFound) => format!("{} -> [Not found]", outcome.query),
        Err(e) => format!("{} -> error: {}", outcome.query, e.user_message()),
    };
    Ok(text)
}
