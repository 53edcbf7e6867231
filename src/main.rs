//! Binary entrypoint for the idlebox CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml`
//! - `inspect <file>` - load a JSON item array and report size, unique size and validation errors
//! - `roll <value=chance>... [--draws N]` - show a normalized chance table and a sample histogram
//! - `restock <catalog>` - roll a shop stock from a JSON catalog
//!
//! See the library crate docs for module-level details: `idlebox::`.
use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use idlebox::chance::{pick_random_with_prob, random_with_prob, Weighted};
use idlebox::collectibles::Inventory;
use idlebox::config::Config;
use idlebox::shop::{CatalogEntry, ShopState};

#[derive(Parser)]
#[command(name = "idlebox")]
#[command(about = "Inspect item snapshots, test chance tables and roll shop stock")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Load a JSON array of item records and report on it
    Inspect {
        /// Path to the JSON snapshot
        file: String,
    },
    /// Normalize a chance table and sample it
    Roll {
        /// Entries as value=chance, e.g. common=3 rare=1
        #[arg(required = true)]
        entries: Vec<String>,
        /// Number of sample draws
        #[arg(short, long, default_value_t = 10_000)]
        draws: usize,
    },
    /// Roll shop stock from a JSON catalog
    Restock {
        /// Path to a JSON array of catalog entries ({item, price, chance})
        catalog: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init writes the config, so it cannot read one first
    let config = match cli.command {
        Commands::Init => Config::default(),
        _ => match Config::load(&cli.config).await {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{} (using defaults)", e);
                Config::default()
            }
        },
    };
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Inspect { file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file))?;
            let snapshot: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", file))?;
            let raw_len = snapshot.as_array().map(|a| a.len()).unwrap_or(0);
            let inv = Inventory::from_json(&snapshot, config.inventory.default_limit)?;

            println!("records:  {}", inv.size());
            println!("unique:   {}", inv.unique_size());
            println!("dropped:  {}", raw_len.saturating_sub(inv.size()));
            if let Some(limit) = inv.limit() {
                println!("limit:    {}", limit);
                if inv.size() > limit {
                    warn!("{} holds {} records, over the limit of {}", file, inv.size(), limit);
                }
            }
            for item in inv.to_unique() {
                println!("  {} {} x{}", item.icon, item.name, inv.get_amount(&item.key));
            }
            let report = inv.validate();
            if !report.valid {
                for err in &report.errors {
                    println!("invalid: {}", err);
                }
            }
        }
        Commands::Roll { entries, draws } => {
            let table = entries
                .iter()
                .map(|e| parse_weighted(e))
                .collect::<Result<Vec<_>>>()?;
            let normalized = random_with_prob(&table);
            if normalized.is_empty() {
                println!("nothing can be picked: every chance is zero");
                return Ok(());
            }
            let mut hits: BTreeMap<String, usize> = BTreeMap::new();
            for _ in 0..draws {
                if let Some(value) = pick_random_with_prob(&table) {
                    *hits.entry(value).or_default() += 1;
                }
            }
            for w in normalized {
                let seen = hits.get(&w.value).copied().unwrap_or(0);
                println!(
                    "{:<16} {:>7.3}%  sampled {:>7.3}%",
                    w.value,
                    w.chance * 100.0,
                    seen as f64 * 100.0 / draws.max(1) as f64
                );
            }
        }
        Commands::Restock { catalog } => {
            let content = tokio::fs::read_to_string(&catalog)
                .await
                .with_context(|| format!("Failed to read {}", catalog))?;
            let entries: Vec<CatalogEntry> = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse catalog {}", catalog))?;
            let mut rng = rand::thread_rng();
            let shop = ShopState::init(&entries, &config.shop, &mut rng, chrono::Utc::now());
            for listing in &shop.stock {
                println!(
                    "{} {:<24} {:>6}c  x{}",
                    listing.item.icon, listing.item.name, listing.price, listing.remaining
                );
            }
        }
    }

    Ok(())
}

fn parse_weighted(entry: &str) -> Result<Weighted<String>> {
    let (value, chance) = entry
        .rsplit_once('=')
        .ok_or_else(|| anyhow!("expected value=chance, got '{}'", entry))?;
    let chance: f64 = chance
        .trim()
        .parse()
        .with_context(|| format!("invalid chance in '{}'", entry))?;
    Ok(Weighted::new(value.trim().to_string(), chance))
}

fn init_logging(config: &Config, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let level = match verbosity {
        0 => config.logging.level_filter(),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(level);

    let log_file = config.logging.file.as_ref().and_then(|file| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .ok()
    });

    if let Some(f) = log_file {
        let file = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when someone is watching
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = file.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
